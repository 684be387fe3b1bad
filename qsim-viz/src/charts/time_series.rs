//! Time-series line charts of queue occupancy

use plotters::prelude::*;
use std::path::Path;

use qsim_metrics::{QueueTimeSeries, TimeSeriesPoint};

use crate::charts::util::{check_dimensions, rendering};
use crate::charts::ChartConfig;
use crate::error::VizError;

/// A named series with its line color
#[derive(Debug, Clone)]
pub struct TimeSeries {
    pub name: String,
    pub data: Vec<TimeSeriesPoint>,
    pub color: RGBColor,
}

impl TimeSeries {
    pub fn new(name: impl Into<String>, data: Vec<TimeSeriesPoint>, color: RGBColor) -> Self {
        Self {
            name: name.into(),
            data,
            color,
        }
    }
}

/// Smoothed number-in-system and number-in-queue series from an observer.
pub fn queue_series(collected: &QueueTimeSeries) -> Vec<TimeSeries> {
    vec![
        TimeSeries::new("In system (L)", collected.in_system.aggregated().to_vec(), BLUE),
        TimeSeries::new("In queue (Lq)", collected.in_queue.aggregated().to_vec(), RED),
    ]
}

/// Create a time-series chart with one line per series
///
/// The x axis is simulated time in minutes.
///
/// # Example
/// ```no_run
/// use qsim_core::SimTime;
/// use qsim_metrics::TimeSeriesPoint;
/// use qsim_viz::charts::time_series::{create_time_series_chart, TimeSeries};
/// use qsim_viz::charts::ChartConfig;
/// use plotters::prelude::RED;
///
/// let data = vec![
///     TimeSeriesPoint { timestamp: SimTime::zero(), value: 0.0 },
///     TimeSeriesPoint { timestamp: SimTime::from_minutes(500.0), value: 1.5 },
/// ];
/// let series = vec![TimeSeries::new("In system", data, RED)];
/// let config = ChartConfig::new("Occupancy").x_label("Time (min)").y_label("Customers");
/// create_time_series_chart(&series, &config, "occupancy.svg").unwrap();
/// ```
pub fn create_time_series_chart(
    series: &[TimeSeries],
    config: &ChartConfig,
    output_path: impl AsRef<Path>,
) -> Result<(), VizError> {
    if series.iter().all(|ts| ts.data.is_empty()) {
        return Err(VizError::InvalidData(
            "No time series data provided".to_string(),
        ));
    }
    check_dimensions(config.width, config.height)?;

    let points = || series.iter().flat_map(|ts| ts.data.iter());
    let max_time = points()
        .map(|p| p.timestamp.as_minutes())
        .fold(0.0f64, f64::max);
    let mut min_value = points().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let mut max_value = points().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);

    if (max_value - min_value).abs() < f64::EPSILON {
        let padding = if min_value.abs() < f64::EPSILON {
            1.0
        } else {
            min_value.abs() * 0.1
        };
        min_value -= padding;
        max_value += padding;
    }
    let max_time = if max_time < f64::EPSILON { 1.0 } else { max_time };

    let root = SVGBackend::new(output_path.as_ref(), (config.width, config.height))
        .into_drawing_area();
    root.fill(&WHITE)
        .map_err(rendering("Failed to fill background"))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&config.title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..max_time, min_value..max_value)
        .map_err(rendering("Failed to build chart"))?;

    chart
        .configure_mesh()
        .x_desc(&config.x_label)
        .y_desc(&config.y_label)
        .draw()
        .map_err(rendering("Failed to configure mesh"))?;

    for ts in series.iter().filter(|ts| !ts.data.is_empty()) {
        let color = ts.color;
        chart
            .draw_series(LineSeries::new(
                ts.data.iter().map(|p| (p.timestamp.as_minutes(), p.value)),
                color.stroke_width(2),
            ))
            .map_err(rendering("Failed to draw series"))?
            .label(ts.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(rendering("Failed to draw legend"))?;

    root.present()
        .map_err(|e| VizError::ExportFailed(format!("Failed to save chart: {e}")))?;
    Ok(())
}
