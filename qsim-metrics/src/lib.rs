//! Consumers of M/M/1 simulation runs
//!
//! This crate turns [`qsim_core`] results into things people read or ship
//! elsewhere: theoretical-vs-simulated comparison tables, per-customer
//! sojourn histograms, smoothed occupancy time series, `metrics`-facade
//! publication and JSON reports.

pub mod comparison;
pub mod customer_stats;
pub mod error;
pub mod export;
pub mod recorder;
pub mod time_series;

pub use comparison::{MetricComparison, ScenarioComparison, COMPARED_STATES};
pub use customer_stats::{CustomerStats, SojournStats};
pub use error::MetricsError;
pub use export::{export_json, ComparisonReport, JsonExporter, MetricEntry, ScenarioEntry};
pub use recorder::{
    publish_results, publish_theory, with_run_metrics_recorder, HistogramSummary, RunMetrics,
    RunMetricsRecorder,
};
pub use time_series::{
    ExponentialMovingAverage, QueueTimeSeries, TimeSeriesCollector, TimeSeriesPoint,
};
