//! Structured logging for queue simulation runs
//!
//! Logging goes through `tracing`. Binaries and demos install a subscriber
//! with one of the initializers below; libraries only emit events.
//!
//! ```bash
//! # Default (info level)
//! cargo run -p qsim --example mm1_comparison
//!
//! # Every arrival and departure
//! RUST_LOG=qsim_core::engine=trace cargo run -p qsim --example mm1_comparison
//! ```
//!
//! Level guidelines:
//! - **TRACE**: individual arrivals, departures and draws
//! - **DEBUG**: run setup and replication progress
//! - **INFO**: run start and completion with headline results
//! - **WARN**: configurations whose output is not comparable to theory

use tracing::{debug, info, trace, warn, Span};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::randomness::DrawSite;
use crate::state::{EventKind, QueueState};
use crate::SimTime;

/// Initialize logging at INFO unless `RUST_LOG` says otherwise
pub fn init_simulation_logging() {
    init_simulation_logging_with_level("info")
}

/// Initialize logging with a specific level
///
/// Calling this more than once is harmless; only the first subscriber wins.
///
/// # Arguments
/// * `level` - Log level: "trace", "debug", "info", "warn", or "error"
pub fn init_simulation_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{level},qsim_core={level},qsim_metrics={level}").into());

    let installed = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_level(true))
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!("Simulation logging initialized at level: {}", level);
    }
}

/// Create a span covering one simulation run
pub fn simulation_span(arrival_rate: f64, service_rate: f64, seed: Option<u64>) -> Span {
    tracing::info_span!(
        "mm1_run",
        lambda = arrival_rate,
        mu = service_rate,
        seed = ?seed
    )
}

/// Logging helpers for run lifecycle and events
pub mod events {
    use super::*;

    pub fn simulation_started(horizon: SimTime, rho: f64) {
        info!(horizon = %horizon, rho = rho, "Simulation started");
    }

    pub fn simulation_completed(final_time: SimTime, events_processed: u64, customers_served: u64) {
        info!(
            final_time = %final_time,
            events_processed = events_processed,
            customers_served = customers_served,
            "Simulation completed"
        );
    }

    pub fn event_processed(time: SimTime, kind: EventKind, queue: &QueueState) {
        trace!(
            time = %time,
            event = ?kind,
            n_system = queue.n_system,
            n_queue = queue.n_queue,
            server = ?queue.server,
            "Processed event"
        );
    }

    /// `None` means the generator was seeded from OS entropy.
    pub fn provider_seeded(seed: Option<u64>) {
        debug!(seed = ?seed, "Random provider seeded");
    }

    pub fn variate_drawn(site: DrawSite, draw: u64, value: f64) {
        trace!(
            site = site.tag,
            site_id = site.site_id,
            draw = draw,
            value = value,
            "Drew variate"
        );
    }

    pub fn horizon_reached(horizon: SimTime, in_system: usize) {
        trace!(
            horizon = %horizon,
            in_system = in_system,
            "Horizon reached; unfinished customers excluded"
        );
    }
}

/// Logging helpers for suspicious configurations and states
pub mod diagnostics {
    use super::*;

    /// λ ≥ μ: the run proceeds, but the queue grows without bound.
    pub fn unstable_configuration(arrival_rate: f64, service_rate: f64) {
        warn!(
            lambda = arrival_rate,
            mu = service_rate,
            rho = arrival_rate / service_rate,
            "Unstable configuration: queue will grow without bound"
        );
    }

    /// Simulated and theoretical values diverge beyond the expected noise.
    pub fn large_deviation(metric: &str, theoretical: f64, simulated: f64) {
        warn!(
            metric = metric,
            theoretical = theoretical,
            simulated = simulated,
            "Simulated value far from theory"
        );
    }
}
