//! Per-customer sojourn and wait distributions
//!
//! [`CustomerStats`] is a [`SimulationObserver`] that records every completed
//! customer into high-resolution histograms, so tail behaviour (p95, p99) can
//! be read off alongside the averages the engine reports.

use hdrhistogram::Histogram as HdrHistogram;
use serde::{Deserialize, Serialize};
use std::fmt;

use qsim_core::{CompletedCustomer, SimulationObserver};

use crate::error::MetricsError;

/// Histogram resolution: values are stored in thousandths of a minute.
const TICKS_PER_MINUTE: f64 = 1_000.0;
const SIGNIFICANT_FIGURES: u8 = 3;

/// Summary of one per-customer time distribution, in minutes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SojournStats {
    pub count: u64,
    /// Exact mean over recorded values
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub std_dev: f64,
}

impl fmt::Display for SojournStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count={}, mean={:.3}min, min={:.3}min, max={:.3}min, p50={:.3}min, p95={:.3}min, p99={:.3}min",
            self.count, self.mean, self.min, self.max, self.p50, self.p95, self.p99
        )
    }
}

/// One time distribution: an HDR histogram plus an exact running sum
#[derive(Debug, Clone)]
struct TimeDistribution {
    histogram: HdrHistogram<u64>,
    sum: f64,
}

impl TimeDistribution {
    fn new() -> Result<Self, MetricsError> {
        let histogram = HdrHistogram::new(SIGNIFICANT_FIGURES)
            .map_err(|e| MetricsError::Histogram(e.to_string()))?;
        Ok(Self {
            histogram,
            sum: 0.0,
        })
    }

    fn record(&mut self, minutes: f64) {
        let ticks = (minutes.max(0.0) * TICKS_PER_MINUTE).round() as u64;
        if let Err(e) = self.histogram.record(ticks) {
            tracing::warn!("Failed to record {} min in HDR histogram: {}", minutes, e);
            return;
        }
        self.sum += minutes;
    }

    fn stats(&self) -> Option<SojournStats> {
        let h = &self.histogram;
        if h.is_empty() {
            return None;
        }
        let minutes = |ticks: u64| ticks as f64 / TICKS_PER_MINUTE;
        Some(SojournStats {
            count: h.len(),
            mean: self.sum / h.len() as f64,
            min: minutes(h.min()),
            max: minutes(h.max()),
            p50: minutes(h.value_at_quantile(0.5)),
            p95: minutes(h.value_at_quantile(0.95)),
            p99: minutes(h.value_at_quantile(0.99)),
            std_dev: h.stdev() / TICKS_PER_MINUTE,
        })
    }

    fn quantile(&self, q: f64) -> Option<f64> {
        (!self.histogram.is_empty())
            .then(|| self.histogram.value_at_quantile(q) as f64 / TICKS_PER_MINUTE)
    }
}

/// Observer collecting sojourn (Ws) and queue wait (Wq) distributions
#[derive(Debug, Clone)]
pub struct CustomerStats {
    sojourn: TimeDistribution,
    wait: TimeDistribution,
    waited: u64,
}

impl CustomerStats {
    pub fn new() -> Result<Self, MetricsError> {
        Ok(Self {
            sojourn: TimeDistribution::new()?,
            wait: TimeDistribution::new()?,
            waited: 0,
        })
    }

    pub fn customers(&self) -> u64 {
        self.sojourn.histogram.len()
    }

    pub fn sojourn_stats(&self) -> Option<SojournStats> {
        self.sojourn.stats()
    }

    pub fn wait_stats(&self) -> Option<SojournStats> {
        self.wait.stats()
    }

    /// Sojourn time at quantile `q` in minutes
    pub fn sojourn_quantile(&self, q: f64) -> Option<f64> {
        self.sojourn.quantile(q)
    }

    pub fn wait_quantile(&self, q: f64) -> Option<f64> {
        self.wait.quantile(q)
    }

    /// Fraction of completed customers that had to queue at all.
    ///
    /// In M/M/1 steady state this tends to ρ.
    pub fn fraction_delayed(&self) -> Option<f64> {
        let n = self.customers();
        (n > 0).then(|| self.waited as f64 / n as f64)
    }
}

impl SimulationObserver for CustomerStats {
    fn on_customer_completed(&mut self, customer: &CompletedCustomer) {
        let wait = customer.queue_time();
        self.sojourn.record(customer.system_time());
        self.wait.record(wait);
        if wait > 0.0 {
            self.waited += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsim_core::{Mm1Simulation, SimTime, SimulationConfig};

    fn customer(arrived: f64, started: f64, departed: f64) -> CompletedCustomer {
        CompletedCustomer {
            arrived_at: SimTime::from_minutes(arrived),
            service_started: SimTime::from_minutes(started),
            departed_at: SimTime::from_minutes(departed),
        }
    }

    #[test]
    fn test_records_completed_customers() {
        let mut stats = CustomerStats::new().unwrap();
        assert!(stats.sojourn_stats().is_none());
        assert_eq!(stats.fraction_delayed(), None);

        stats.on_customer_completed(&customer(1.0, 1.0, 4.0));
        stats.on_customer_completed(&customer(2.0, 4.0, 6.0));

        let sojourn = stats.sojourn_stats().unwrap();
        assert_eq!(sojourn.count, 2);
        assert_eq!(sojourn.mean, 3.5);
        assert!((sojourn.min - 3.0).abs() < 0.01);
        assert!((sojourn.max - 4.0).abs() < 0.01);

        let wait = stats.wait_stats().unwrap();
        assert_eq!(wait.mean, 1.0);
        assert_eq!(wait.min, 0.0);
        assert_eq!(stats.fraction_delayed(), Some(0.5));
    }

    #[test]
    fn test_quantiles_are_ordered() {
        let mut stats = CustomerStats::new().unwrap();
        for i in 1..=1000 {
            let t = i as f64 / 10.0;
            stats.on_customer_completed(&customer(0.0, t / 2.0, t));
        }

        let s = stats.sojourn_stats().unwrap();
        assert_eq!(s.count, 1000);
        assert!(s.min <= s.p50 && s.p50 <= s.p95 && s.p95 <= s.p99 && s.p99 <= s.max);
        assert!((s.p50 - 50.0).abs() < 0.1);
        let p99 = stats.sojourn_quantile(0.99).unwrap();
        assert_eq!(p99, s.p99);
    }

    #[test]
    fn test_matches_engine_averages() {
        let config = SimulationConfig::new(6.0, 12.0)
            .with_seed(42)
            .with_horizon(50_000.0);
        let mut stats = CustomerStats::new().unwrap();
        let results = Mm1Simulation::new(config)
            .unwrap()
            .run_with_observer(&mut stats)
            .unwrap();

        assert_eq!(stats.customers(), results.customers_served);
        let sojourn = stats.sojourn_stats().unwrap();
        let wait = stats.wait_stats().unwrap();
        assert!((sojourn.mean - results.avg_system_time).abs() < 1e-6);
        assert!((wait.mean - results.avg_queue_time).abs() < 1e-6);
        let delayed = stats.fraction_delayed().unwrap();
        assert!((delayed - 0.5).abs() < 0.05);
    }
}
