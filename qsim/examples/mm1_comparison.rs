//! M/M/1 simulation versus closed-form theory
//!
//! Runs three load levels (λ = 4, 6, 10.8 per hour against μ = 12 per hour),
//! prints the comparison tables, then writes JSON and SVG charts.
//!
//! Run with: cargo run -p qsim --example mm1_comparison [scenarios.json]
//!
//! A scenario file looks like `demos/scenarios.json`.

use std::path::PathBuf;

use qsim::prelude::*;
use qsim::viz::charts::time_series::{create_time_series_chart, queue_series};

const OUTPUT_DIR: &str = "target/mm1_comparison";

fn reference_scenarios() -> ScenarioSet {
    ScenarioSet {
        seed: Some(42),
        scenarios: [4.0, 6.0, 10.8]
            .iter()
            .map(|&lambda| SimulationConfig::new(lambda, 12.0))
            .collect(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_simulation_logging();

    let set = match std::env::args().nth(1) {
        Some(path) => ScenarioSet::load(path)?,
        None => reference_scenarios(),
    };
    let configs = set.resolved();

    println!("=== M/M/1: simulation vs theory ===");
    let results = run_scenarios(&configs)?;
    let comparisons = configs
        .into_iter()
        .zip(results)
        .map(|(config, results)| ScenarioComparison::new(config, results))
        .collect::<Result<Vec<_>, _>>()?;

    for cmp in &comparisons {
        println!("\n{cmp}");
        qsim::tracing::info!(
            lambda = cmp.config.arrival_rate,
            mu = cmp.config.service_rate,
            customers = cmp.results.customers_served,
            max_relative_error = ?cmp.max_relative_error(),
            "Scenario compared"
        );
        cmp.deviations(0.10);
    }

    // Detailed look at the most heavily loaded scenario
    let Some(busiest) = comparisons
        .iter()
        .max_by(|a, b| a.config.rho().total_cmp(&b.config.rho()))
    else {
        return Ok(());
    };
    let config = busiest.config.clone();
    println!(
        "\n=== Detail: lam={}, mu={} ===",
        config.arrival_rate, config.service_rate
    );

    let mut observers = (CustomerStats::new()?, QueueTimeSeries::new(250.0, 0.2)?);
    Mm1Simulation::new(config.clone())?.run_with_observer(&mut observers)?;
    let (stats, mut series) = observers;
    series.finish(SimTime::from_minutes(config.horizon));

    if let Some(wait) = stats.wait_stats() {
        println!("Queue wait:  {wait}");
    }
    if let Some(sojourn) = stats.sojourn_stats() {
        println!("Sojourn:     {sojourn}");
    }
    if let Some(delayed) = stats.fraction_delayed() {
        println!("Delayed:     {:.4} (theory: rho = {:.4})", delayed, config.rho());
    }

    let summary = run_replications(
        &config,
        ReplicationConfig {
            replications: 20,
            confidence: 0.95,
        },
    )?;
    let wq = summary.avg_queue_time;
    println!(
        "Wq over {} replications: {:.4} min, 95% CI [{:.4}, {:.4}]",
        wq.samples, wq.mean, wq.ci_low, wq.ci_high
    );
    if let Ok(theory) = TheoreticalMm1::from_config(&config) {
        let verdict = if wq.contains(theory.wq) { "inside" } else { "outside" };
        println!("Theoretical Wq {:.4} min is {verdict} the interval", theory.wq);
    }

    // Artifacts
    let output_dir = PathBuf::from(OUTPUT_DIR);
    let charts = generate_comparison_charts(&comparisons, &output_dir)?;

    let occupancy_path = output_dir.join("occupancy.svg");
    let chart_config = ChartConfig::new("Queue occupancy (EMA-smoothed)")
        .x_label("Time (min)")
        .y_label("Customers");
    create_time_series_chart(&queue_series(&series), &chart_config, &occupancy_path)?;

    let report_path = output_dir.join("comparison.json");
    export_json(&comparisons, &report_path, true)?;

    println!("\nWrote:");
    for path in charts.iter().chain([&occupancy_path, &report_path]) {
        println!("  {}", path.display());
    }
    Ok(())
}
