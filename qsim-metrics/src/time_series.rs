//! Windowed, EMA-smoothed time series of queue occupancy
//!
//! Raw event samples are averaged per aggregation window, and each window
//! average is passed through an exponential moving average so warm-up and
//! congestion episodes show up as a readable curve.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use qsim_core::{EventRecord, SimTime, SimulationObserver};

use crate::error::MetricsError;

/// Raw points kept per collector
const MAX_RAW_POINTS: usize = 10_000;

/// Time-series data point with timestamp and value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: SimTime,
    pub value: f64,
}

/// Exponential moving average calculator
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    alpha: f64,
    current_value: Option<f64>,
}

impl ExponentialMovingAverage {
    /// Create a new EMA with smoothing factor `0 < alpha <= 1`.
    /// Lower alpha = more smoothing.
    pub fn new(alpha: f64) -> Result<Self, MetricsError> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(MetricsError::InvalidMetric(format!(
                "EMA alpha must be in (0, 1], got {alpha}"
            )));
        }
        Ok(Self {
            alpha,
            current_value: None,
        })
    }

    pub fn update(&mut self, value: f64) -> f64 {
        let next = match self.current_value {
            None => value,
            Some(current) => self.alpha * value + (1.0 - self.alpha) * current,
        };
        self.current_value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.current_value
    }
}

/// Time-series collector with a fixed aggregation window
#[derive(Debug, Clone)]
pub struct TimeSeriesCollector {
    raw_data: VecDeque<TimeSeriesPoint>,
    aggregated_data: Vec<TimeSeriesPoint>,
    /// Window length in minutes
    window: f64,
    ema: ExponentialMovingAverage,
    window_start: Option<SimTime>,
    window_sum: f64,
    window_count: usize,
}

impl TimeSeriesCollector {
    /// # Arguments
    /// * `window_minutes` - Length of each aggregation window
    /// * `ema_alpha` - Smoothing factor for the moving average (0 < alpha <= 1)
    pub fn new(window_minutes: f64, ema_alpha: f64) -> Result<Self, MetricsError> {
        if !(window_minutes.is_finite() && window_minutes > 0.0) {
            return Err(MetricsError::InvalidMetric(format!(
                "aggregation window must be positive, got {window_minutes}"
            )));
        }
        Ok(Self {
            raw_data: VecDeque::new(),
            aggregated_data: Vec::new(),
            window: window_minutes,
            ema: ExponentialMovingAverage::new(ema_alpha)?,
            window_start: None,
            window_sum: 0.0,
            window_count: 0,
        })
    }

    pub fn add_point(&mut self, timestamp: SimTime, value: f64) {
        self.raw_data.push_back(TimeSeriesPoint { timestamp, value });
        while self.raw_data.len() > MAX_RAW_POINTS {
            self.raw_data.pop_front();
        }

        let start = *self.window_start.get_or_insert(timestamp);
        if timestamp.minutes_since(start) >= self.window {
            self.close_window(timestamp);
        }
        self.window_sum += value;
        self.window_count += 1;
    }

    fn close_window(&mut self, timestamp: SimTime) {
        if self.window_count > 0 {
            let average = self.window_sum / self.window_count as f64;
            let smoothed = self.ema.update(average);
            self.aggregated_data.push(TimeSeriesPoint {
                timestamp,
                value: smoothed,
            });
            self.window_sum = 0.0;
            self.window_count = 0;
        }
        self.window_start = Some(timestamp);
    }

    /// Close the window in progress.
    pub fn flush(&mut self, timestamp: SimTime) {
        self.close_window(timestamp);
    }

    pub fn aggregated(&self) -> &[TimeSeriesPoint] {
        &self.aggregated_data
    }

    /// Most recent raw samples (bounded)
    pub fn raw(&self) -> &VecDeque<TimeSeriesPoint> {
        &self.raw_data
    }

    pub fn current_ema(&self) -> Option<f64> {
        self.ema.value()
    }
}

/// Observer sampling number in system and number in queue after each event
#[derive(Debug, Clone)]
pub struct QueueTimeSeries {
    pub in_system: TimeSeriesCollector,
    pub in_queue: TimeSeriesCollector,
    last_event: Option<SimTime>,
}

impl QueueTimeSeries {
    /// # Arguments
    /// * `window_minutes` - Aggregation window, e.g. 500 minutes
    /// * `ema_alpha` - Smoothing factor, e.g. 0.2
    pub fn new(window_minutes: f64, ema_alpha: f64) -> Result<Self, MetricsError> {
        Ok(Self {
            in_system: TimeSeriesCollector::new(window_minutes, ema_alpha)?,
            in_queue: TimeSeriesCollector::new(window_minutes, ema_alpha)?,
            last_event: None,
        })
    }

    /// Close the final window at `horizon` (or at the last event if earlier).
    pub fn finish(&mut self, horizon: SimTime) {
        let end = self.last_event.map_or(horizon, |t| t.max(horizon));
        self.in_system.flush(end);
        self.in_queue.flush(end);
    }
}

impl SimulationObserver for QueueTimeSeries {
    fn on_event(&mut self, event: &EventRecord) {
        self.in_system
            .add_point(event.time, event.queue.n_system as f64);
        self.in_queue.add_point(event.time, event.queue.n_queue as f64);
        self.last_event = Some(event.time);
    }
}
