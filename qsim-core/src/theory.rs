//! Closed-form steady-state M/M/1 results
//!
//! Only meaningful for ρ = λ/μ < 1; every formula diverges at ρ = 1, so
//! construction fails with [`SimError::UnstableSystem`] instead of returning
//! infinities. Nothing here feeds back into the engine.

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::{check_rate, SimError};

/// Steady-state quantities for an M/M/1 queue
///
/// Rates are per hour; times are in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TheoreticalMm1 {
    pub lambda: f64,
    pub mu: f64,
    /// Utilization factor λ/μ
    pub rho: f64,
    /// Expected number in system ρ/(1-ρ)
    pub ls: f64,
    /// Expected number in queue ρ²/(1-ρ)
    pub lq: f64,
    /// Expected sojourn 1/(μ-λ), in minutes
    pub ws: f64,
    /// Expected queue wait λ/(μ(μ-λ)), in minutes
    pub wq: f64,
}

impl TheoreticalMm1 {
    pub fn new(lambda: f64, mu: f64) -> Result<Self, SimError> {
        check_rate("arrival", lambda)?;
        check_rate("service", mu)?;

        let rho = lambda / mu;
        if rho >= 1.0 {
            return Err(SimError::UnstableSystem { rho });
        }

        Ok(Self {
            lambda,
            mu,
            rho,
            ls: rho / (1.0 - rho),
            lq: rho * rho / (1.0 - rho),
            ws: 60.0 / (mu - lambda),
            wq: 60.0 * lambda / (mu * (mu - lambda)),
        })
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self, SimError> {
        Self::new(config.arrival_rate, config.service_rate)
    }

    /// P(n) = (1-ρ)ρⁿ
    pub fn p(&self, n: usize) -> f64 {
        (1.0 - self.rho) * self.rho.powf(n as f64)
    }

    /// P(N ≥ n) = ρⁿ
    pub fn p_at_least(&self, n: usize) -> f64 {
        self.rho.powf(n as f64)
    }

    /// Lazy P(0), P(1), ... sequence. Each call starts again from n = 0.
    pub fn probabilities(&self) -> StateProbabilities {
        StateProbabilities {
            rho: self.rho,
            next: 1.0 - self.rho,
        }
    }
}

/// Infinite iterator over the geometric steady-state distribution
#[derive(Debug, Clone)]
pub struct StateProbabilities {
    rho: f64,
    next: f64,
}

impl Iterator for StateProbabilities {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let p = self.next;
        self.next *= self.rho;
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
