//! Run configuration for M/M/1 scenarios
//!
//! Rates are customers per hour, the horizon is in simulated minutes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{check_rate, SimError};

/// Default simulated horizon in minutes
pub const DEFAULT_HORIZON_MINUTES: f64 = 20_000.0;

/// Configuration for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Arrival rate λ (customers per hour)
    pub arrival_rate: f64,
    /// Service rate μ (customers per hour)
    pub service_rate: f64,
    /// Simulated horizon T (minutes)
    #[serde(default = "default_horizon")]
    pub horizon: f64,
    /// PRNG seed; `None` gives a non-reproducible run
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_horizon() -> f64 {
    DEFAULT_HORIZON_MINUTES
}

impl SimulationConfig {
    /// Create a config with the default horizon and no seed
    pub fn new(arrival_rate: f64, service_rate: f64) -> Self {
        Self {
            arrival_rate,
            service_rate,
            horizon: DEFAULT_HORIZON_MINUTES,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_horizon(mut self, minutes: f64) -> Self {
        self.horizon = minutes;
        self
    }

    /// Check every input before any event is processed.
    pub fn validate(&self) -> Result<(), SimError> {
        check_rate("arrival", self.arrival_rate)?;
        check_rate("service", self.service_rate)?;
        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return Err(SimError::InvalidHorizon(self.horizon));
        }
        Ok(())
    }

    /// Utilization factor ρ = λ/μ
    pub fn rho(&self) -> f64 {
        self.arrival_rate / self.service_rate
    }

    /// Check if the system reaches a steady state (ρ < 1)
    pub fn is_stable(&self) -> bool {
        self.rho() < 1.0
    }

    pub fn arrival_rate_per_minute(&self) -> f64 {
        self.arrival_rate / 60.0
    }

    pub fn service_rate_per_minute(&self) -> f64 {
        self.service_rate / 60.0
    }
}

/// A named batch of scenarios, usually loaded from JSON.
///
/// ```json
/// {
///   "seed": 42,
///   "scenarios": [
///     { "arrival_rate": 4.0, "service_rate": 12.0 },
///     { "arrival_rate": 10.8, "service_rate": 12.0, "horizon": 100000.0 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    /// Seed applied to scenarios that do not carry their own
    #[serde(default)]
    pub seed: Option<u64>,
    pub scenarios: Vec<SimulationConfig>,
}

impl ScenarioSet {
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let set: ScenarioSet = serde_json::from_str(json)?;
        set.validate()?;
        Ok(set)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.scenarios.is_empty() {
            return Err(SimError::Configuration(
                "scenario set must contain at least one scenario".to_string(),
            ));
        }
        self.scenarios.iter().try_for_each(SimulationConfig::validate)
    }

    /// Scenario configs with the set-level seed filled in where missing.
    pub fn resolved(&self) -> Vec<SimulationConfig> {
        self.scenarios
            .iter()
            .cloned()
            .map(|mut config| {
                if config.seed.is_none() {
                    config.seed = self.seed;
                }
                config
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_and_builders() {
        let config = SimulationConfig::new(4.0, 12.0).with_seed(42).with_horizon(500.0);

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.horizon, 500.0);
        assert!((config.rho() - 1.0 / 3.0).abs() < 1e-12);
        assert!(config.is_stable());
        assert!((config.service_rate_per_minute() - 0.2).abs() < 1e-12);
        assert_eq!(SimulationConfig::new(1.0, 2.0).horizon, DEFAULT_HORIZON_MINUTES);
    }

    #[test]
    fn test_validate_fails_fast_on_bad_inputs() {
        assert!(matches!(
            SimulationConfig::new(0.0, 12.0).validate(),
            Err(SimError::InvalidRate { parameter: "arrival", .. })
        ));
        assert!(matches!(
            SimulationConfig::new(4.0, -1.0).validate(),
            Err(SimError::InvalidRate { parameter: "service", .. })
        ));
        assert!(matches!(
            SimulationConfig::new(4.0, 12.0).with_horizon(0.0).validate(),
            Err(SimError::InvalidHorizon(_))
        ));
    }

    #[test]
    fn test_unstable_config_is_valid_input() {
        let config = SimulationConfig::new(13.0, 12.0);
        assert!(config.validate().is_ok());
        assert!(!config.is_stable());
    }

    #[test]
    fn test_scenario_set_from_json() {
        let json = r#"{
            "seed": 42,
            "scenarios": [
                { "arrival_rate": 4.0, "service_rate": 12.0 },
                { "arrival_rate": 10.8, "service_rate": 12.0, "horizon": 1000.0, "seed": 7 }
            ]
        }"#;
        let set = ScenarioSet::from_json_str(json).unwrap();
        let resolved = set.resolved();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].seed, Some(42));
        assert_eq!(resolved[0].horizon, DEFAULT_HORIZON_MINUTES);
        assert_eq!(resolved[1].seed, Some(7));
        assert_eq!(resolved[1].horizon, 1000.0);
    }

    #[test]
    fn test_scenario_set_rejects_invalid_entries() {
        let bad_rate = r#"{ "scenarios": [ { "arrival_rate": -4.0, "service_rate": 12.0 } ] }"#;
        assert!(matches!(
            ScenarioSet::from_json_str(bad_rate),
            Err(SimError::InvalidRate { .. })
        ));

        let empty = r#"{ "scenarios": [] }"#;
        assert!(matches!(
            ScenarioSet::from_json_str(empty),
            Err(SimError::Configuration(_))
        ));

        assert!(matches!(
            ScenarioSet::from_json_str("not json"),
            Err(SimError::Serialization(_))
        ));
    }
}
