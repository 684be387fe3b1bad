//! Independent replications and multi-scenario batches
//!
//! Every run owns its own random stream, so replications and scenarios share
//! no mutable state and seeded results do not depend on thread scheduling.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::SimulationResults;
use crate::config::SimulationConfig;
use crate::engine::simulate;
use crate::error::SimError;
use crate::estimate::MetricEstimate;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplicationConfig {
    pub replications: usize,
    /// Two-sided confidence level in (0, 1)
    pub confidence: f64,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            replications: 10,
            confidence: 0.95,
        }
    }
}

impl ReplicationConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.replications == 0 {
            return Err(SimError::Configuration(
                "replications must be > 0".to_string(),
            ));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(SimError::Configuration(format!(
                "confidence must be in (0, 1), got {}",
                self.confidence
            )));
        }
        Ok(())
    }
}

/// Seed for replication `i`, derived from `base` with SplitMix64.
pub fn derive_seed(base: u64, i: u64) -> u64 {
    let mut x = base.wrapping_add(i.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Across-replication estimates for one configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationSummary {
    pub config: SimulationConfig,
    /// Seed the per-run seeds were derived from
    pub base_seed: u64,
    pub confidence: f64,
    pub utilization: MetricEstimate,
    pub avg_customers_system: MetricEstimate,
    pub avg_customers_queue: MetricEstimate,
    pub avg_system_time: MetricEstimate,
    pub avg_queue_time: MetricEstimate,
    pub runs: Vec<SimulationResults>,
}

/// Run `replication.replications` independent copies of `config`.
///
/// Without a seed in `config` a base seed is drawn from the thread RNG and
/// recorded in the summary, so the batch can be reproduced afterwards.
pub fn run_replications(
    config: &SimulationConfig,
    replication: ReplicationConfig,
) -> Result<ReplicationSummary, SimError> {
    config.validate()?;
    replication.validate()?;

    let base_seed = config.seed.unwrap_or_else(rand::random);
    let mut runs = Vec::with_capacity(replication.replications);

    for i in 0..replication.replications {
        let seed = derive_seed(base_seed, i as u64);
        debug!(replication = i, seed = seed, "Starting replication");
        runs.push(simulate(config.clone().with_seed(seed))?);
    }

    let estimate = |metric: fn(&SimulationResults) -> f64| -> Result<MetricEstimate, SimError> {
        let samples: Vec<f64> = runs.iter().map(metric).collect();
        MetricEstimate::from_samples(&samples, replication.confidence)
            .ok_or_else(|| SimError::Internal("no replications to summarize".to_string()))
    };

    Ok(ReplicationSummary {
        config: config.clone(),
        base_seed,
        confidence: replication.confidence,
        utilization: estimate(|r| r.server_utilization)?,
        avg_customers_system: estimate(|r| r.avg_customers_system)?,
        avg_customers_queue: estimate(|r| r.avg_customers_queue)?,
        avg_system_time: estimate(|r| r.avg_system_time)?,
        avg_queue_time: estimate(|r| r.avg_queue_time)?,
        runs,
    })
}

/// Run each scenario on its own scoped thread.
///
/// Every configuration is validated before any thread starts. Results come
/// back in input order.
pub fn run_scenarios(configs: &[SimulationConfig]) -> Result<Vec<SimulationResults>, SimError> {
    for config in configs {
        config.validate()?;
    }

    std::thread::scope(|scope| {
        let handles: Vec<_> = configs
            .iter()
            .map(|config| scope.spawn(move || simulate(config.clone())))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| SimError::Internal("scenario worker panicked".to_string()))
                    .and_then(|result| result)
            })
            .collect()
    })
}
