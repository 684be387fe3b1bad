//! Long-run behaviour of the simulated queue against closed-form theory

use qsim_core::{simulate, SimError, SimulationConfig, TheoreticalMm1};

const LONG_HORIZON: f64 = 4_000_000.0;

fn relative_error(simulated: f64, theoretical: f64) -> f64 {
    (simulated - theoretical).abs() / theoretical
}

fn assert_within(metric: &str, simulated: f64, theoretical: f64, tolerance: f64) {
    let err = relative_error(simulated, theoretical);
    assert!(
        err <= tolerance,
        "{metric}: simulated {simulated:.5} vs theoretical {theoretical:.5} (relative error {err:.4})"
    );
}

#[test]
fn low_load_converges_to_theory() {
    let config = SimulationConfig::new(4.0, 12.0)
        .with_seed(42)
        .with_horizon(LONG_HORIZON);
    let results = simulate(config.clone()).unwrap();
    let theory = TheoreticalMm1::from_config(&config).unwrap();

    assert_within("rho", results.server_utilization, theory.rho, 0.05);
    assert_within("Ls", results.avg_customers_system, theory.ls, 0.05);
    assert_within("Lq", results.avg_customers_queue, theory.lq, 0.05);
    assert_within("Ws", results.avg_system_time, theory.ws, 0.05);
    assert_within("Wq", results.avg_queue_time, theory.wq, 0.05);
    for n in 0..4 {
        assert_within(&format!("P{n}"), results.probability(n), theory.p(n), 0.05);
    }
}

#[test]
fn reference_scenario_at_default_horizon() {
    let config = SimulationConfig::new(4.0, 12.0)
        .with_seed(42)
        .with_horizon(20_000.0);
    let results = simulate(config.clone()).unwrap();
    let theory = TheoreticalMm1::from_config(&config).unwrap();

    assert_within("rho", results.server_utilization, theory.rho, 0.05);
    assert_within("Ls", results.avg_customers_system, theory.ls, 0.05);
    assert_within("Lq", results.avg_customers_queue, theory.lq, 0.05);
    assert_within("Ws", results.avg_system_time, theory.ws, 0.05);
    assert_within("Wq", results.avg_queue_time, theory.wq, 0.05);
    assert_within("P0", results.probability(0), theory.p(0), 0.05);
}

#[test]
fn heavy_load_shows_congestion() {
    let light = simulate(
        SimulationConfig::new(4.0, 12.0)
            .with_seed(42)
            .with_horizon(200_000.0),
    )
    .unwrap();
    let heavy = simulate(
        SimulationConfig::new(10.8, 12.0)
            .with_seed(42)
            .with_horizon(200_000.0),
    )
    .unwrap();

    assert!(heavy.server_utilization > 0.85);
    assert!(heavy.avg_queue_time > 10.0 * light.avg_queue_time);
    assert!(heavy.avg_customers_queue > 10.0 * light.avg_customers_queue);
    assert!(heavy.max_observed_state() > light.max_observed_state());
}

#[test]
fn littles_law_holds_in_a_single_run() {
    for lambda in [4.0, 6.0, 9.0] {
        let results = simulate(
            SimulationConfig::new(lambda, 12.0)
                .with_seed(11)
                .with_horizon(1_000_000.0),
        )
        .unwrap();

        assert_within(
            "L = λW",
            results.little_system_estimate(),
            results.avg_customers_system,
            0.03,
        );
        assert_within(
            "Lq = λWq",
            results.little_queue_estimate(),
            results.avg_customers_queue,
            0.03,
        );
    }
}

#[test]
fn state_distribution_is_conserved() {
    for (lambda, seed) in [(4.0, 1), (6.0, 2), (10.8, 3)] {
        let results = simulate(
            SimulationConfig::new(lambda, 12.0)
                .with_seed(seed)
                .with_horizon(50_000.0),
        )
        .unwrap();

        assert!((results.total_probability() - 1.0).abs() < 1e-9);
        assert!(
            (results.probability(0) - (1.0 - results.server_utilization)).abs() < 1e-9,
            "idle fraction must equal 1 - utilization"
        );
        assert!(results.state_probabilities.values().all(|&p| p >= 0.0));
        assert!((results.observed_time - results.horizon).abs() < 1e-6);
    }
}

#[test]
fn error_shrinks_with_horizon() {
    let theory = TheoreticalMm1::new(6.0, 12.0).unwrap();
    let mean_error = |horizon: f64| -> f64 {
        let seeds = [3u64, 5, 8, 13, 21];
        let total: f64 = seeds
            .iter()
            .map(|&seed| {
                let results = simulate(
                    SimulationConfig::new(6.0, 12.0)
                        .with_seed(seed)
                        .with_horizon(horizon),
                )
                .unwrap();
                relative_error(results.avg_queue_time, theory.wq)
            })
            .sum();
        total / seeds.len() as f64
    };

    let short = mean_error(20_000.0);
    let long = mean_error(2_000_000.0);
    assert!(
        long < short,
        "mean Wq error should shrink: T=20k {short:.4}, T=2M {long:.4}"
    );
}

#[test]
fn tiny_horizon_reports_zeros() {
    let results = simulate(
        SimulationConfig::new(4.0, 12.0)
            .with_seed(42)
            .with_horizon(1e-9),
    )
    .unwrap();

    assert_eq!(results.customers_served, 0);
    assert_eq!(results.avg_system_time, 0.0);
    assert_eq!(results.avg_queue_time, 0.0);
    assert_eq!(results.avg_customers_queue, 0.0);
    assert!((results.total_probability() - 1.0).abs() < 1e-9);
}

#[test]
fn unstable_scenario_runs_but_has_no_theory() {
    let config = SimulationConfig::new(13.0, 12.0)
        .with_seed(42)
        .with_horizon(20_000.0);

    let results = simulate(config.clone()).unwrap();
    assert!(results.server_utilization > 0.9);
    assert!(matches!(
        TheoreticalMm1::from_config(&config),
        Err(SimError::UnstableSystem { .. })
    ));
}

#[test]
fn invalid_inputs_are_rejected() {
    assert!(matches!(
        simulate(SimulationConfig::new(0.0, 12.0)),
        Err(SimError::InvalidRate { .. })
    ));
    assert!(matches!(
        simulate(SimulationConfig::new(4.0, f64::NAN)),
        Err(SimError::InvalidRate { .. })
    ));
    assert!(matches!(
        simulate(SimulationConfig::new(4.0, 12.0).with_horizon(0.0)),
        Err(SimError::InvalidHorizon(_))
    ));
}
