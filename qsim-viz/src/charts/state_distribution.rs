//! Simulated state occupancy P(n) against the geometric steady state

use plotters::prelude::*;
use std::path::Path;

use qsim_metrics::ScenarioComparison;

use crate::charts::util::{check_dimensions, padded_max, rendering};
use crate::charts::ChartConfig;
use crate::error::VizError;

/// States shown by default, starting from n = 0
pub const DEFAULT_MAX_STATES: usize = 20;

/// Create the P(n) chart for one scenario with default labels.
pub fn create_state_distribution_chart(
    comparison: &ScenarioComparison,
    output_path: impl AsRef<Path>,
) -> Result<(), VizError> {
    let config = ChartConfig::new(format!(
        "Proportion of time with n customers (lam={}, mu={})",
        comparison.config.arrival_rate, comparison.config.service_rate
    ))
    .x_label("Customers in system (n)")
    .y_label("P(n)");

    create_state_distribution_chart_with_config(
        comparison,
        DEFAULT_MAX_STATES,
        output_path,
        &config,
    )
}

/// Draw simulated (left) and theoretical (right) bars for n = 0..max_states.
///
/// Fewer states are drawn when the run never went that high.
pub fn create_state_distribution_chart_with_config(
    comparison: &ScenarioComparison,
    max_states: usize,
    output_path: impl AsRef<Path>,
    config: &ChartConfig,
) -> Result<(), VizError> {
    if max_states == 0 {
        return Err(VizError::InvalidConfiguration(
            "max_states must be at least 1".to_string(),
        ));
    }
    check_dimensions(config.width, config.height)?;

    let states = (comparison.results.max_observed_state() + 1).min(max_states);
    let simulated: Vec<f64> = (0..states)
        .map(|n| comparison.results.probability(n))
        .collect();
    let theory: Option<Vec<f64>> = comparison
        .theory
        .map(|t| t.probabilities().take(states).collect());

    let y_max = padded_max(
        simulated
            .iter()
            .chain(theory.iter().flatten())
            .copied(),
    );

    let root = SVGBackend::new(output_path.as_ref(), (config.width, config.height))
        .into_drawing_area();
    root.fill(&WHITE)
        .map_err(rendering("Failed to fill background"))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&config.title, ("sans-serif", 26))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5..(states as f64 - 0.5), 0.0..y_max)
        .map_err(rendering("Failed to build chart"))?;

    chart
        .configure_mesh()
        .x_desc(&config.x_label)
        .y_desc(&config.y_label)
        .x_labels(states.min(21))
        .x_label_formatter(&|x| format!("{:.0}", x))
        .draw()
        .map_err(rendering("Failed to configure mesh"))?;

    const BAR: f64 = 0.38;
    chart
        .draw_series(simulated.iter().enumerate().map(|(n, &p)| {
            let x = n as f64;
            Rectangle::new([(x - BAR, 0.0), (x, p)], RED.mix(0.7).filled())
        }))
        .map_err(rendering("Failed to draw simulated bars"))?
        .label("Simulated")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], RED.mix(0.7).filled()));

    if let Some(theory) = &theory {
        chart
            .draw_series(theory.iter().enumerate().map(|(n, &p)| {
                let x = n as f64;
                Rectangle::new([(x, 0.0), (x + BAR, p)], BLUE.mix(0.7).filled())
            }))
            .map_err(rendering("Failed to draw theoretical bars"))?
            .label("Theoretical (1-ρ)ρⁿ")
            .legend(|(x, y)| {
                Rectangle::new([(x, y - 5), (x + 12, y + 5)], BLUE.mix(0.7).filled())
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(rendering("Failed to draw legend"))?;

    root.present()
        .map_err(|e| VizError::ExportFailed(format!("Failed to save chart: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsim_core::SimulationConfig;

    #[test]
    fn test_state_distribution_chart_generation() {
        let cmp = ScenarioComparison::run(
            SimulationConfig::new(6.0, 12.0)
                .with_seed(42)
                .with_horizon(10_000.0),
        )
        .unwrap();
        let output_path = std::env::temp_dir().join("qsim_test_state_distribution.svg");

        create_state_distribution_chart(&cmp, &output_path).unwrap();
        let svg = std::fs::read_to_string(&output_path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Simulated"));

        std::fs::remove_file(output_path).ok();
    }

    #[test]
    fn test_unstable_scenario_draws_only_simulation() {
        let cmp = ScenarioComparison::run(
            SimulationConfig::new(13.0, 12.0)
                .with_seed(1)
                .with_horizon(2_000.0),
        )
        .unwrap();
        let output_path = std::env::temp_dir().join("qsim_test_state_distribution_unstable.svg");

        create_state_distribution_chart(&cmp, &output_path).unwrap();
        let svg = std::fs::read_to_string(&output_path).unwrap();
        assert!(!svg.contains("Theoretical"));

        std::fs::remove_file(output_path).ok();
    }

    #[test]
    fn test_zero_states_is_rejected() {
        let cmp = ScenarioComparison::run(
            SimulationConfig::new(4.0, 12.0)
                .with_seed(3)
                .with_horizon(100.0),
        )
        .unwrap();
        let result = create_state_distribution_chart_with_config(
            &cmp,
            0,
            std::env::temp_dir().join("qsim_never_written.svg"),
            &ChartConfig::new("P(n)"),
        );
        assert!(matches!(result, Err(VizError::InvalidConfiguration(_))));
    }
}
