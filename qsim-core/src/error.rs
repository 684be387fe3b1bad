//! Error types for the queueing simulation

use crate::SimTime;
use thiserror::Error;

/// Top-level error type for simulation and reference operations
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid {parameter} rate: {rate} (must be positive and finite)")]
    InvalidRate { parameter: &'static str, rate: f64 },

    #[error("Invalid horizon: {0} minutes (must be positive and finite)")]
    InvalidHorizon(f64),

    #[error("Unstable system: rho = {rho:.4} (steady state requires rho < 1)")]
    UnstableSystem { rho: f64 },

    #[error("Event scheduling failed: cannot advance clock from {now} back to {requested}")]
    ScheduleInPast { now: SimTime, requested: SimTime },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Build an [`SimError::InvalidRate`] for the named parameter.
    pub fn invalid_rate(parameter: &'static str, rate: f64) -> Self {
        SimError::InvalidRate { parameter, rate }
    }
}

/// Check that a rate parameter is usable for exponential sampling.
pub(crate) fn check_rate(parameter: &'static str, rate: f64) -> Result<f64, SimError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(SimError::invalid_rate(parameter, rate))
    }
}
