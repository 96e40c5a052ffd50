//! Predict Command Implementation
//!
//! Screens one comma-separated submission against the artifacts and prints
//! the verdict.

use anyhow::{Context, Result};
use clap::Args;
use oncoscreen_serving::page::{error_message, InputMode};
use oncoscreen_serving::{Artifacts, Diagnosis, Screener, Verdict};
use std::path::PathBuf;
use tracing::info;

/// Output format for the verdict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable line
    #[default]
    Text,
    /// JSON object
    Json,
}

/// Screen one comma-separated submission
///
/// # Example
///
/// ```bash
/// oncoscreen predict --artifacts-dir ./artifacts \
///     "11.76,21.6,74.72,427.9,0.08637,..."
/// ```
#[derive(Args, Debug, Clone)]
pub struct PredictCommand {
    /// Directory containing scaler.json, model_spec.json and dense/params.json
    #[arg(
        long,
        short = 'd',
        default_value = "./artifacts",
        env = "ONCOSCREEN_ARTIFACTS_DIR"
    )]
    pub artifacts_dir: PathBuf,

    /// Output format
    #[arg(long, short = 'f', default_value = "text")]
    pub format: OutputFormat,

    /// Exactly 30 comma-separated measurements
    pub features: String,
}

impl PredictCommand {
    /// Execute the predict command
    pub async fn run(&self) -> Result<()> {
        let artifacts = Artifacts::load(&self.artifacts_dir)
            .with_context(|| format!("Failed to load artifacts from {:?}", self.artifacts_dir))?;
        let screener = Screener::from_artifacts(&artifacts);

        let verdict = screener
            .screen_bulk(&self.features)
            .map_err(|e| anyhow::anyhow!(error_message(&e, InputMode::Bulk)))?;
        info!(label = verdict.label, "screening complete");

        println!("{}", render(&verdict, self.format)?);
        Ok(())
    }
}

/// Format a verdict for stdout.
pub fn render(verdict: &Verdict, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => {
            let diagnosis = match verdict.diagnosis {
                Diagnosis::Benign => "Benign",
                Diagnosis::Malignant => "Malignant",
            };
            format!(
                "{} (label {}), confidence {}",
                diagnosis,
                verdict.label,
                verdict.confidence_display()
            )
        }
        OutputFormat::Json => serde_json::to_string(verdict)?,
    })
}
