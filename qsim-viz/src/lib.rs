//! Charts for M/M/1 simulation results
//!
//! Static SVG charts built with the plotters library:
//!
//! - **Wq vs ρ**: theoretical and simulated mean queue wait per scenario
//! - **State distribution**: simulated P(n) next to (1-ρ)ρⁿ
//! - **Time series**: smoothed queue occupancy over simulated time
//!
//! # Example
//!
//! ```no_run
//! use qsim_core::SimulationConfig;
//! use qsim_metrics::ScenarioComparison;
//! use qsim_viz::charts::generate_comparison_charts;
//!
//! let cmp = ScenarioComparison::run(SimulationConfig::new(6.0, 12.0).with_seed(42)).unwrap();
//! generate_comparison_charts(&[cmp], "charts").unwrap();
//! ```

pub mod charts;
pub mod error;

pub use charts::state_distribution::create_state_distribution_chart;
pub use charts::time_series::{create_time_series_chart, queue_series, TimeSeries};
pub use charts::wq_vs_rho::{create_wq_vs_rho_chart, wq_points, WqPoint};
pub use charts::{generate_comparison_charts, ChartConfig};
pub use error::VizError;
