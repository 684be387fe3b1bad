//! Long-run averages from a finished run's accumulators
//!
//! Time-weighted quantities (Ls, Lq, utilization, P(n)) divide an area under
//! the state curve by the horizon. Per-customer quantities (Ws, Wq) divide
//! totals by the number of customers that completed service; customers still
//! present at the horizon do not contribute.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::state::Accumulators;

/// Output of one simulation run
///
/// Times are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    pub customers_served: u64,
    /// Time-average number in system (Ls)
    pub avg_customers_system: f64,
    /// Time-average number in queue (Lq)
    pub avg_customers_queue: f64,
    /// Average sojourn per completed customer (Ws)
    pub avg_system_time: f64,
    /// Average queue wait per completed customer (Wq)
    pub avg_queue_time: f64,
    pub server_utilization: f64,
    /// Fraction of the horizon spent with exactly `n` customers present
    pub state_probabilities: BTreeMap<usize, f64>,
    /// Horizon T the averages are taken over
    pub horizon: f64,
    /// Simulated time actually accumulated; equals `horizon` for a finished run
    #[serde(default)]
    pub observed_time: f64,
}

impl SimulationResults {
    /// Aggregate a snapshot of accumulators over a horizon of `horizon` minutes.
    pub fn from_accumulators(acc: &Accumulators, horizon: f64) -> Self {
        let per_customer = |total: f64| {
            if acc.customers_served == 0 {
                0.0
            } else {
                total / acc.customers_served as f64
            }
        };
        let idle_time = acc.state_time.get(&0).copied().unwrap_or(0.0);

        Self {
            customers_served: acc.customers_served,
            avg_customers_system: acc.system_area / horizon,
            avg_customers_queue: acc.queue_area / horizon,
            avg_system_time: per_customer(acc.total_system_time),
            avg_queue_time: per_customer(acc.total_queue_time),
            server_utilization: ((horizon - idle_time) / horizon).clamp(0.0, 1.0),
            state_probabilities: acc
                .state_time
                .iter()
                .map(|(&n, &time)| (n, time / horizon))
                .collect(),
            horizon,
            observed_time: acc.observed_time,
        }
    }

    /// P(n) as observed; zero for states never visited.
    pub fn probability(&self, n: usize) -> f64 {
        self.state_probabilities.get(&n).copied().unwrap_or(0.0)
    }

    /// Sum of the observed distribution (1 up to rounding).
    pub fn total_probability(&self) -> f64 {
        self.state_probabilities.values().sum()
    }

    /// Largest number of customers ever present.
    pub fn max_observed_state(&self) -> usize {
        self.state_probabilities.keys().next_back().copied().unwrap_or(0)
    }

    /// Completed customers per minute of observed time (λ_eff).
    pub fn effective_arrival_rate(&self) -> f64 {
        if self.observed_time > 0.0 {
            self.customers_served as f64 / self.observed_time
        } else {
            0.0
        }
    }

    /// λ_eff · Ws, which Little's law says should match Ls.
    pub fn little_system_estimate(&self) -> f64 {
        self.effective_arrival_rate() * self.avg_system_time
    }

    /// λ_eff · Wq, which Little's law says should match Lq.
    pub fn little_queue_estimate(&self) -> f64 {
        self.effective_arrival_rate() * self.avg_queue_time
    }
}
