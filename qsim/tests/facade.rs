use qsim::prelude::*;

#[test]
fn prelude_covers_a_full_comparison() {
    let set = ScenarioSet::from_json_str(include_str!("../../demos/scenarios.json")).unwrap();
    let configs: Vec<SimulationConfig> = set
        .resolved()
        .into_iter()
        .map(|c| c.with_horizon(5_000.0))
        .collect();
    assert!(configs.iter().all(|c| c.seed == Some(42)));

    let span = qsim::tracing::info_span!("facade_comparison", scenarios = configs.len());
    let _guard = span.enter();
    let results = run_scenarios(&configs).unwrap();
    let comparisons: Vec<ScenarioComparison> = configs
        .into_iter()
        .zip(results)
        .map(|(config, results)| ScenarioComparison::new(config, results).unwrap())
        .collect();

    assert_eq!(comparisons.len(), 3);
    assert!(comparisons.iter().all(ScenarioComparison::is_stable));
    assert!(comparisons[0].to_string().starts_with("Scenario: lam=4, mu=12"));
}
