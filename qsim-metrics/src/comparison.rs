//! Side-by-side theoretical and simulated values for one scenario
//!
//! The `Display` implementation prints the console table used by the demo:
//!
//! ```text
//! Scenario: lam=4, mu=12
//! Metric      Theoretical    Simulation
//! rho         0.3333         0.3318
//! Ls          0.5000         0.4962
//! ...
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use qsim_core::logging::diagnostics;
use qsim_core::{simulate, SimError, SimulationConfig, SimulationResults, TheoreticalMm1};

use crate::error::MetricsError;

/// Number of leading state probabilities (P0..P3) shown in comparisons
pub const COMPARED_STATES: usize = 4;

/// One named metric with both sides of the comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub name: String,
    /// `None` when the scenario has no steady state
    pub theoretical: Option<f64>,
    pub simulated: f64,
}

impl MetricComparison {
    fn new(name: impl Into<String>, theoretical: Option<f64>, simulated: f64) -> Self {
        Self {
            name: name.into(),
            theoretical,
            simulated,
        }
    }

    /// |simulated - theoretical| / theoretical, when both exist and theory is nonzero.
    pub fn relative_error(&self) -> Option<f64> {
        self.theoretical
            .filter(|t| *t != 0.0)
            .map(|t| (self.simulated - t).abs() / t.abs())
    }
}

/// A finished run paired with the closed-form reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub config: SimulationConfig,
    /// `None` for ρ ≥ 1
    pub theory: Option<TheoreticalMm1>,
    pub results: SimulationResults,
}

impl ScenarioComparison {
    pub fn new(config: SimulationConfig, results: SimulationResults) -> Result<Self, MetricsError> {
        let theory = match TheoreticalMm1::from_config(&config) {
            Ok(theory) => Some(theory),
            Err(SimError::UnstableSystem { .. }) => None,
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            config,
            theory,
            results,
        })
    }

    /// Simulate `config` and compare.
    pub fn run(config: SimulationConfig) -> Result<Self, MetricsError> {
        let results = simulate(config.clone())?;
        Self::new(config, results)
    }

    pub fn is_stable(&self) -> bool {
        self.theory.is_some()
    }

    /// ρ against utilization, then Ls, Lq, Ws and Wq.
    pub fn metrics(&self) -> Vec<MetricComparison> {
        let t = self.theory.as_ref();
        let r = &self.results;
        vec![
            MetricComparison::new("rho", t.map(|t| t.rho), r.server_utilization),
            MetricComparison::new("Ls", t.map(|t| t.ls), r.avg_customers_system),
            MetricComparison::new("Lq", t.map(|t| t.lq), r.avg_customers_queue),
            MetricComparison::new("Ws (min)", t.map(|t| t.ws), r.avg_system_time),
            MetricComparison::new("Wq (min)", t.map(|t| t.wq), r.avg_queue_time),
        ]
    }

    /// P0..P(n-1), simulated as time fractions.
    pub fn state_probabilities(&self, n: usize) -> Vec<MetricComparison> {
        (0..n)
            .map(|k| {
                MetricComparison::new(
                    format!("P{k}"),
                    self.theory.as_ref().map(|t| t.p(k)),
                    self.results.probability(k),
                )
            })
            .collect()
    }

    /// Largest relative error among the headline metrics.
    pub fn max_relative_error(&self) -> Option<f64> {
        self.metrics()
            .iter()
            .filter_map(MetricComparison::relative_error)
            .reduce(f64::max)
    }

    /// Metrics whose relative error exceeds `tolerance`, each logged at WARN.
    pub fn deviations(&self, tolerance: f64) -> Vec<MetricComparison> {
        let flagged: Vec<MetricComparison> = self
            .metrics()
            .into_iter()
            .chain(self.state_probabilities(COMPARED_STATES))
            .filter(|m| m.relative_error().is_some_and(|e| e > tolerance))
            .collect();

        for m in &flagged {
            if let Some(theoretical) = m.theoretical {
                diagnostics::large_deviation(&m.name, theoretical, m.simulated);
            }
        }
        flagged
    }
}

fn theory_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "undefined".to_string(),
    }
}

impl fmt::Display for ScenarioComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Scenario: lam={}, mu={}",
            self.config.arrival_rate, self.config.service_rate
        )?;
        if !self.is_stable() {
            writeln!(
                f,
                "(rho = {:.4} >= 1: no steady state, theoretical values undefined)",
                self.config.rho()
            )?;
        }

        writeln!(f, "{:<12}{:<15}{}", "Metric", "Theoretical", "Simulation")?;
        for m in self.metrics() {
            writeln!(
                f,
                "{:<12}{:<15}{:.4}",
                m.name,
                theory_cell(m.theoretical),
                m.simulated
            )?;
        }
        for p in self.state_probabilities(COMPARED_STATES) {
            writeln!(
                f,
                "{:<12}Theor: {}, Sim: {:.4}",
                p.name,
                theory_cell(p.theoretical),
                p.simulated
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Proportion of time with n customers:")?;
        for (n, p) in &self.results.state_probabilities {
            writeln!(f, "n = {n}: {p:.4}")?;
        }
        Ok(())
    }
}
