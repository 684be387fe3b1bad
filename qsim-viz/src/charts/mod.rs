//! Chart generation for queueing results
//!
//! Every chart is written as SVG through the plotters library.

pub mod state_distribution;
pub mod time_series;
pub mod wq_vs_rho;
mod util;

use crate::error::VizError;
use qsim_metrics::ScenarioComparison;
use std::path::{Path, PathBuf};

/// Common chart configuration
#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Chart width in pixels
    pub width: u32,
    /// Chart height in pixels
    pub height: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
        }
    }
}

impl ChartConfig {
    /// Create a new chart configuration with title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    pub fn y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = label.into();
        self
    }
}

/// Write the standard chart set for a batch of scenarios into `output_dir`.
///
/// Produces `wq_vs_rho.svg` plus one `state_distribution_<i>.svg` per
/// scenario, and returns the written paths.
pub fn generate_comparison_charts(
    comparisons: &[ScenarioComparison],
    output_dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, VizError> {
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    let wq_path = output_dir.join("wq_vs_rho.svg");
    wq_vs_rho::create_wq_vs_rho_chart(comparisons, &wq_path)?;
    written.push(wq_path);

    for (i, cmp) in comparisons.iter().enumerate() {
        let path = output_dir.join(format!("state_distribution_{i}.svg"));
        state_distribution::create_state_distribution_chart(cmp, &path)?;
        written.push(path);
    }

    Ok(written)
}
