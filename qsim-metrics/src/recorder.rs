//! Publishing run results through the `metrics` facade
//!
//! [`publish_results`] emits standard `metrics` gauges and counters labelled by
//! scenario, so any installed recorder (Prometheus, statsd, ...) sees them.
//! For tests and harnesses, [`with_run_metrics_recorder`] captures them into
//! an in-memory [`RunMetrics`] without touching global state:
//!
//! ```rust
//! # use std::sync::{Arc, Mutex};
//! # use qsim_metrics::{RunMetrics, with_run_metrics_recorder};
//! let store = Arc::new(Mutex::new(RunMetrics::default()));
//! with_run_metrics_recorder(&store, || {
//!     metrics::counter!("mm1_customers_served_total", "scenario" => "demo").increment(3);
//! });
//! let locked = store.lock().unwrap();
//! assert_eq!(locked.counter("mm1_customers_served_total", &[("scenario", "demo")]), Some(3));
//! ```

use metrics::{
    counter, gauge, Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString,
    Unit,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use qsim_core::{SimulationResults, TheoreticalMm1};

/// Metric identity: name plus labels sorted by key
type MetricKey = (String, Vec<(String, String)>);

fn metric_key(name: &str, labels: &[(&str, &str)]) -> MetricKey {
    let mut labels: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    labels.sort();
    (name.to_string(), labels)
}

/// Count, sum and range of the values recorded into a histogram
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramSummary {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl HistogramSummary {
    pub fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// In-memory metric store filled by [`RunMetricsRecorder`]
#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    counters: BTreeMap<MetricKey, u64>,
    gauges: BTreeMap<MetricKey, f64>,
    histograms: BTreeMap<MetricKey, HistogramSummary>,
}

impl RunMetrics {
    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> Option<u64> {
        self.counters.get(&metric_key(name, labels)).copied()
    }

    pub fn gauge(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        self.gauges.get(&metric_key(name, labels)).copied()
    }

    pub fn histogram(&self, name: &str, labels: &[(&str, &str)]) -> Option<HistogramSummary> {
        self.histograms.get(&metric_key(name, labels)).copied()
    }

    /// Names of every gauge recorded, with duplicates across labels removed.
    pub fn gauge_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.gauges.keys().map(|(n, _)| n.as_str()).collect();
        names.dedup();
        names
    }

    fn add_counter(&mut self, key: &MetricKey, value: u64) {
        *self.counters.entry(key.clone()).or_insert(0) += value;
    }

    fn set_counter(&mut self, key: &MetricKey, value: u64) {
        self.counters.insert(key.clone(), value);
    }

    fn add_gauge(&mut self, key: &MetricKey, delta: f64) {
        *self.gauges.entry(key.clone()).or_insert(0.0) += delta;
    }

    fn set_gauge(&mut self, key: &MetricKey, value: f64) {
        self.gauges.insert(key.clone(), value);
    }

    fn record_histogram(&mut self, key: &MetricKey, value: f64) {
        self.histograms
            .entry(key.clone())
            .and_modify(|h| {
                h.count += 1;
                h.sum += value;
                h.min = h.min.min(value);
                h.max = h.max.max(value);
            })
            .or_insert(HistogramSummary {
                count: 1,
                sum: value,
                min: value,
                max: value,
            });
    }
}

fn lock(store: &Mutex<RunMetrics>) -> MutexGuard<'_, RunMetrics> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A `metrics::Recorder` writing into a shared [`RunMetrics`]
#[derive(Clone)]
pub struct RunMetricsRecorder {
    store: Arc<Mutex<RunMetrics>>,
}

impl RunMetricsRecorder {
    pub fn new(store: Arc<Mutex<RunMetrics>>) -> Self {
        Self { store }
    }
}

/// Run `f` with a local recorder capturing into `store`.
pub fn with_run_metrics_recorder<T>(store: &Arc<Mutex<RunMetrics>>, f: impl FnOnce() -> T) -> T {
    let recorder = RunMetricsRecorder::new(store.clone());
    metrics::with_local_recorder(&recorder, f)
}

struct Handle {
    store: Arc<Mutex<RunMetrics>>,
    key: MetricKey,
}

impl metrics::CounterFn for Handle {
    fn increment(&self, value: u64) {
        lock(&self.store).add_counter(&self.key, value);
    }

    fn absolute(&self, value: u64) {
        lock(&self.store).set_counter(&self.key, value);
    }
}

impl metrics::GaugeFn for Handle {
    fn increment(&self, value: f64) {
        lock(&self.store).add_gauge(&self.key, value);
    }

    fn decrement(&self, value: f64) {
        lock(&self.store).add_gauge(&self.key, -value);
    }

    fn set(&self, value: f64) {
        lock(&self.store).set_gauge(&self.key, value);
    }
}

impl metrics::HistogramFn for Handle {
    fn record(&self, value: f64) {
        lock(&self.store).record_histogram(&self.key, value);
    }
}

impl RunMetricsRecorder {
    fn handle(&self, key: &Key) -> Arc<Handle> {
        let labels: Vec<(&str, &str)> = key.labels().map(|l| (l.key(), l.value())).collect();
        Arc::new(Handle {
            store: self.store.clone(),
            key: metric_key(key.name(), &labels),
        })
    }
}

impl Recorder for RunMetricsRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(self.handle(key))
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(self.handle(key))
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(self.handle(key))
    }
}

/// Emit the headline results of one run, labelled `scenario`.
pub fn publish_results(scenario: &str, results: &SimulationResults) {
    let label = scenario.to_string();
    counter!("mm1_customers_served_total", "scenario" => label.clone())
        .absolute(results.customers_served);
    gauge!("mm1_server_utilization", "scenario" => label.clone()).set(results.server_utilization);
    gauge!("mm1_avg_customers_system", "scenario" => label.clone())
        .set(results.avg_customers_system);
    gauge!("mm1_avg_customers_queue", "scenario" => label.clone())
        .set(results.avg_customers_queue);
    gauge!("mm1_avg_system_time_minutes", "scenario" => label.clone())
        .set(results.avg_system_time);
    gauge!("mm1_avg_queue_time_minutes", "scenario" => label.clone())
        .set(results.avg_queue_time);

    for (n, p) in &results.state_probabilities {
        gauge!("mm1_state_probability", "scenario" => label.clone(), "n" => n.to_string()).set(*p);
    }
}

/// Emit the closed-form reference for a scenario, labelled `scenario`.
pub fn publish_theory(scenario: &str, theory: &TheoreticalMm1) {
    let label = scenario.to_string();
    gauge!("mm1_theory_rho", "scenario" => label.clone()).set(theory.rho);
    gauge!("mm1_theory_ls", "scenario" => label.clone()).set(theory.ls);
    gauge!("mm1_theory_lq", "scenario" => label.clone()).set(theory.lq);
    gauge!("mm1_theory_ws_minutes", "scenario" => label.clone()).set(theory.ws);
    gauge!("mm1_theory_wq_minutes", "scenario" => label).set(theory.wq);
}
