//! End-to-end: run the reference scenarios with observers attached, compare
//! against theory, publish and export.

use std::sync::{Arc, Mutex};

use qsim_core::{Mm1Simulation, SimTime, SimulationConfig};
use qsim_metrics::{
    export_json, publish_results, with_run_metrics_recorder, ComparisonReport, CustomerStats,
    QueueTimeSeries, RunMetrics, ScenarioComparison,
};

fn reference_scenarios() -> Vec<SimulationConfig> {
    [4.0, 6.0, 10.8]
        .iter()
        .map(|&lambda| {
            SimulationConfig::new(lambda, 12.0)
                .with_seed(42)
                .with_horizon(200_000.0)
        })
        .collect()
}

#[test]
fn observers_agree_with_engine_results() {
    for config in reference_scenarios() {
        let horizon = SimTime::from_minutes(config.horizon);
        let mut observers = (
            CustomerStats::new().unwrap(),
            QueueTimeSeries::new(2_000.0, 0.2).unwrap(),
        );

        let results = Mm1Simulation::new(config.clone())
            .unwrap()
            .run_with_observer(&mut observers)
            .unwrap();
        let (stats, mut series) = observers;
        series.finish(horizon);

        assert_eq!(stats.customers(), results.customers_served);
        let wait = stats.wait_stats().unwrap();
        assert!((wait.mean - results.avg_queue_time).abs() < 1e-6);
        assert!(wait.p99 >= wait.p50);
        assert!(!series.in_system.aggregated().is_empty());
    }
}

#[test]
fn comparisons_track_theory_for_stable_scenarios() {
    let comparisons: Vec<ScenarioComparison> = reference_scenarios()
        .into_iter()
        .map(|config| ScenarioComparison::run(config).unwrap())
        .collect();

    for cmp in &comparisons {
        assert!(cmp.is_stable());
        let util = &cmp.metrics()[0];
        assert!(util.relative_error().unwrap() < 0.05, "{cmp}");
    }

    let wq: Vec<f64> = comparisons.iter().map(|c| c.results.avg_queue_time).collect();
    assert!(wq[0] < wq[1] && wq[1] < wq[2]);
}

#[test]
fn publish_and_export_round_trip() {
    let comparisons: Vec<ScenarioComparison> = reference_scenarios()
        .into_iter()
        .map(|config| ScenarioComparison::run(config.with_horizon(10_000.0)).unwrap())
        .collect();

    let store = Arc::new(Mutex::new(RunMetrics::default()));
    with_run_metrics_recorder(&store, || {
        for (i, cmp) in comparisons.iter().enumerate() {
            publish_results(&format!("scenario-{i}"), &cmp.results);
        }
    });
    {
        let locked = store.lock().unwrap();
        for (i, cmp) in comparisons.iter().enumerate() {
            let label = format!("scenario-{i}");
            assert_eq!(
                locked.gauge("mm1_server_utilization", &[("scenario", label.as_str())]),
                Some(cmp.results.server_utilization)
            );
        }
    }

    let path = std::env::temp_dir().join(format!("qsim_pipeline_{}.json", std::process::id()));
    export_json(&comparisons, &path, false).unwrap();
    let report = ComparisonReport::load(&path).unwrap();
    assert_eq!(report.scenarios.len(), 3);
    assert!(report.scenarios.iter().all(|s| s.theory.is_some()));
    std::fs::remove_file(&path).ok();
}
