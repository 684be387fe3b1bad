//! Error types for comparison, statistics and export

use qsim_core::SimError;
use thiserror::Error;

/// Errors related to collecting or exporting run metrics
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Invalid metric: {0}")]
    InvalidMetric(String),

    #[error("Histogram error: {0}")]
    Histogram(String),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
