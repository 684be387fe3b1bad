//! # qsim - M/M/1 queueing, simulated and solved
//!
//! A discrete-event simulation of the single-server Poisson queue, checked
//! against the closed-form steady-state results.
//!
//! ## Feature Flags
//!
//! - `default`: `metrics` and `viz`
//! - `metrics`: comparison tables, customer histograms, time series, export
//! - `viz`: SVG charts (implies `metrics`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use qsim::prelude::*;
//!
//! let config = SimulationConfig::new(6.0, 12.0).with_seed(42);
//! let comparison = ScenarioComparison::run(config)?;
//! println!("{comparison}");
//! # Ok::<(), qsim::metrics::MetricsError>(())
//! ```

pub use qsim_core as core;

#[cfg(feature = "metrics")]
pub use qsim_metrics as metrics;

#[cfg(feature = "viz")]
pub use qsim_viz as viz;

/// The logging facade every qsim crate emits through
pub use tracing;

pub mod prelude {
    //! Commonly used types and functions

    pub use qsim_core::{
        init_simulation_logging, run_replications, run_scenarios, simulate, Mm1Simulation,
        ReplicationConfig, ScenarioSet, SimError, SimTime, SimulationConfig, SimulationObserver,
        SimulationResults, TheoreticalMm1,
    };

    #[cfg(feature = "metrics")]
    pub use qsim_metrics::{
        export_json, CustomerStats, MetricsError, QueueTimeSeries, ScenarioComparison,
    };

    #[cfg(feature = "viz")]
    pub use qsim_viz::{generate_comparison_charts, ChartConfig, VizError};
}
