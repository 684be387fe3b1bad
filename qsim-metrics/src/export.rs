//! JSON export of scenario comparisons
//!
//! Writes a structured report suitable for programmatic consumption and
//! plotting tools: per scenario the configuration, the raw results, the
//! theoretical reference (absent when ρ ≥ 1) and the metric-by-metric
//! comparison with relative errors.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use qsim_core::{SimulationConfig, SimulationResults, TheoreticalMm1};

use crate::comparison::{MetricComparison, ScenarioComparison, COMPARED_STATES};
use crate::error::MetricsError;

/// Complete export document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub scenarios: Vec<ScenarioEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioEntry {
    pub config: SimulationConfig,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub theory: Option<TheoreticalMm1>,
    pub results: SimulationResults,
    pub metrics: Vec<MetricEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub name: String,
    pub theoretical: Option<f64>,
    pub simulated: f64,
    pub relative_error: Option<f64>,
}

impl From<MetricComparison> for MetricEntry {
    fn from(m: MetricComparison) -> Self {
        Self {
            relative_error: m.relative_error(),
            name: m.name,
            theoretical: m.theoretical,
            simulated: m.simulated,
        }
    }
}

impl From<&ScenarioComparison> for ScenarioEntry {
    fn from(cmp: &ScenarioComparison) -> Self {
        Self {
            config: cmp.config.clone(),
            theory: cmp.theory,
            results: cmp.results.clone(),
            metrics: cmp
                .metrics()
                .into_iter()
                .chain(cmp.state_probabilities(COMPARED_STATES))
                .map(MetricEntry::from)
                .collect(),
        }
    }
}

impl ComparisonReport {
    pub fn new(comparisons: &[ScenarioComparison]) -> Self {
        Self {
            scenarios: comparisons.iter().map(ScenarioEntry::from).collect(),
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, MetricsError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    pub fn load(path: &Path) -> Result<Self, MetricsError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// JSON exporter for scenario comparisons
#[derive(Debug)]
pub struct JsonExporter {
    path: PathBuf,
    pretty: bool,
}

impl JsonExporter {
    /// # Arguments
    /// * `path` - Output file path
    /// * `pretty` - Whether to pretty-print the JSON
    pub fn new(path: &Path, pretty: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            pretty,
        }
    }

    pub fn export(&self, comparisons: &[ScenarioComparison]) -> Result<(), MetricsError> {
        let json = ComparisonReport::new(comparisons).to_json(self.pretty)?;
        let mut file = File::create(&self.path)?;
        file.write_all(json.as_bytes())?;
        tracing::debug!(path = %self.path.display(), scenarios = comparisons.len(), "Exported comparison report");
        Ok(())
    }
}

/// Write `comparisons` to `path` as JSON.
pub fn export_json(
    comparisons: &[ScenarioComparison],
    path: &Path,
    pretty: bool,
) -> Result<(), MetricsError> {
    JsonExporter::new(path, pretty).export(comparisons)
}
