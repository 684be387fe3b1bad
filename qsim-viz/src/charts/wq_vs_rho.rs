//! Mean queue wait against utilization, theory versus simulation

use plotters::prelude::*;
use std::path::Path;

use qsim_metrics::ScenarioComparison;

use crate::charts::util::{check_dimensions, padded_max, rendering};
use crate::charts::ChartConfig;
use crate::error::VizError;

/// One scenario on the Wq-vs-ρ chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WqPoint {
    pub rho: f64,
    /// Closed-form Wq in minutes; `None` when ρ ≥ 1
    pub theoretical: Option<f64>,
    /// Simulated Wq in minutes
    pub simulated: f64,
}

/// Extract chart points from comparisons, ordered by ρ.
pub fn wq_points(comparisons: &[ScenarioComparison]) -> Vec<WqPoint> {
    let mut points: Vec<WqPoint> = comparisons
        .iter()
        .map(|cmp| WqPoint {
            rho: cmp.config.rho(),
            theoretical: cmp.theory.map(|t| t.wq),
            simulated: cmp.results.avg_queue_time,
        })
        .collect();
    points.sort_by(|a, b| a.rho.total_cmp(&b.rho));
    points
}

/// Create the Wq-vs-ρ chart with the default labels.
///
/// # Example
/// ```no_run
/// use qsim_core::SimulationConfig;
/// use qsim_metrics::ScenarioComparison;
/// use qsim_viz::charts::wq_vs_rho::create_wq_vs_rho_chart;
///
/// let cmps: Vec<ScenarioComparison> = [4.0, 6.0, 10.8]
///     .iter()
///     .map(|&l| ScenarioComparison::run(SimulationConfig::new(l, 12.0).with_seed(42)).unwrap())
///     .collect();
/// create_wq_vs_rho_chart(&cmps, "wq_vs_rho.svg").unwrap();
/// ```
pub fn create_wq_vs_rho_chart(
    comparisons: &[ScenarioComparison],
    output_path: impl AsRef<Path>,
) -> Result<(), VizError> {
    let config = ChartConfig::new("Wq vs Utilization")
        .x_label("Utilization (ρ)")
        .y_label("Avg Waiting Time in Queue (minutes)");

    create_wq_vs_rho_chart_with_config(&wq_points(comparisons), output_path, &config)
}

pub fn create_wq_vs_rho_chart_with_config(
    points: &[WqPoint],
    output_path: impl AsRef<Path>,
    config: &ChartConfig,
) -> Result<(), VizError> {
    if points.is_empty() {
        return Err(VizError::InvalidData(
            "No scenarios available for Wq vs rho chart".to_string(),
        ));
    }
    check_dimensions(config.width, config.height)?;

    let theory: Vec<(f64, f64)> = points
        .iter()
        .filter_map(|p| p.theoretical.map(|wq| (p.rho, wq)))
        .collect();
    let simulated: Vec<(f64, f64)> = points.iter().map(|p| (p.rho, p.simulated)).collect();

    let x_max = padded_max(points.iter().map(|p| p.rho));
    let y_max = padded_max(theory.iter().chain(&simulated).map(|&(_, wq)| wq));

    let root = SVGBackend::new(output_path.as_ref(), (config.width, config.height))
        .into_drawing_area();
    root.fill(&WHITE)
        .map_err(rendering("Failed to fill background"))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&config.title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)
        .map_err(rendering("Failed to build chart"))?;

    chart
        .configure_mesh()
        .x_desc(&config.x_label)
        .y_desc(&config.y_label)
        .draw()
        .map_err(rendering("Failed to configure mesh"))?;

    if !theory.is_empty() {
        chart
            .draw_series(LineSeries::new(theory.clone(), BLUE.stroke_width(2)))
            .map_err(rendering("Failed to draw theoretical line"))?
            .label("Theoretical Wq")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
        chart
            .draw_series(theory.iter().map(|&p| Circle::new(p, 5, BLUE.filled())))
            .map_err(rendering("Failed to draw theoretical markers"))?;
    }

    chart
        .draw_series(LineSeries::new(simulated.clone(), RED.stroke_width(2)))
        .map_err(rendering("Failed to draw simulated line"))?
        .label("Simulated Wq")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
    chart
        .draw_series(simulated.iter().map(|&p| Cross::new(p, 6, RED.stroke_width(2))))
        .map_err(rendering("Failed to draw simulated markers"))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
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
    use qsim_core::{SimulationConfig, SimulationResults};
    use std::collections::BTreeMap;

    fn comparison(lambda: f64, wq: f64) -> ScenarioComparison {
        let results = SimulationResults {
            customers_served: 10,
            avg_customers_system: 0.5,
            avg_customers_queue: 0.2,
            avg_system_time: wq + 5.0,
            avg_queue_time: wq,
            server_utilization: lambda / 12.0,
            state_probabilities: BTreeMap::from([(0, 1.0)]),
            horizon: 100.0,
            observed_time: 100.0,
        };
        ScenarioComparison::new(SimulationConfig::new(lambda, 12.0), results).unwrap()
    }

    #[test]
    fn test_points_sorted_by_rho() {
        let cmps = vec![comparison(10.8, 40.0), comparison(4.0, 2.4), comparison(13.0, 90.0)];
        let points = wq_points(&cmps);

        assert_eq!(points.len(), 3);
        assert!((points[0].rho - 1.0 / 3.0).abs() < 1e-12);
        assert!((points[0].theoretical.unwrap() - 2.5).abs() < 1e-12);
        assert_eq!(points[2].theoretical, None);
        assert_eq!(points[2].simulated, 90.0);
    }

    #[test]
    fn test_chart_is_written() {
        let cmps = vec![comparison(4.0, 2.4), comparison(6.0, 5.1), comparison(10.8, 44.0)];
        let output_path = std::env::temp_dir().join("qsim_test_wq_vs_rho.svg");

        create_wq_vs_rho_chart(&cmps, &output_path).unwrap();
        let svg = std::fs::read_to_string(&output_path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Wq vs Utilization"));

        std::fs::remove_file(output_path).ok();
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let output_path = std::env::temp_dir().join("qsim_test_wq_empty.svg");
        assert!(matches!(
            create_wq_vs_rho_chart(&[], &output_path),
            Err(VizError::InvalidData(_))
        ));
    }
}
