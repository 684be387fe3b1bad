//! Discrete-event simulation of the M/M/1 queue.
//!
//! This crate drives a single-server FIFO queue with Poisson arrivals and
//! exponential service times through a next-event loop, and pairs the
//! long-run averages it measures with the closed-form steady-state values.
//!
//! # Architecture Overview
//!
//! - [`Mm1Simulation`]: owns the clock, the queue state and a
//!   [`RandomProvider`]; advances from event to event until the horizon.
//! - [`SimulationState`]: the mutable system state plus the running areas
//!   and state-occupancy times collected along the trajectory.
//! - [`SimulationResults`]: time-weighted and per-customer averages over the
//!   horizon.
//! - [`TheoreticalMm1`]: the textbook steady-state formulas for ρ < 1.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use qsim_core::{simulate, SimulationConfig, TheoreticalMm1};
//!
//! let config = SimulationConfig::new(4.0, 12.0).with_seed(42);
//! let results = simulate(config.clone())?;
//! let theory = TheoreticalMm1::from_config(&config)?;
//!
//! println!("Lq simulated {:.4} vs theory {:.4}", results.avg_customers_queue, theory.lq);
//! # Ok::<(), qsim_core::SimError>(())
//! ```
//!
//! # Time Model
//!
//! Rates are given in customers per hour; the simulation clock and every
//! reported time are in minutes, represented by [`SimTime`].

pub mod aggregate;
pub mod config;
pub mod dists;
pub mod engine;
pub mod error;
pub mod estimate;
pub mod logging;
pub mod randomness;
pub mod replication;
pub mod state;
pub mod theory;
pub mod time;

pub use aggregate::SimulationResults;
pub use config::{ScenarioSet, SimulationConfig, DEFAULT_HORIZON_MINUTES};
pub use dists::ExponentialVariate;
pub use engine::{simulate, EventRecord, Mm1Simulation, SimulationObserver, StepOutcome};
pub use error::SimError;
pub use estimate::MetricEstimate;
pub use logging::{init_simulation_logging, init_simulation_logging_with_level, simulation_span};
pub use randomness::{DrawSite, RandomProvider, SeededRandomProvider};
pub use replication::{run_replications, run_scenarios, ReplicationConfig, ReplicationSummary};
pub use state::{
    Accumulators, CompletedCustomer, EventKind, QueueState, ServerStatus, SimulationState,
};
pub use theory::{StateProbabilities, TheoreticalMm1};
pub use time::SimTime;
