//! The parse → scale → predict → present pipeline.

use crate::artifacts::Artifacts;
use crate::error::ScreeningResult;
use crate::features::FeatureVector;
use crate::inference::Classifier;
use crate::input::{parse_bulk, parse_fields};
use crate::scaler::FeatureScaler;
use crate::verdict::Verdict;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs submissions through the loaded scaler and classifier.
///
/// A `Screener` holds only immutable, shared collaborators and is built once
/// at startup, then handed to request handlers.
#[derive(Clone)]
pub struct Screener {
    scaler: Arc<dyn FeatureScaler>,
    classifier: Arc<dyn Classifier>,
}

impl Screener {
    /// Create a screener from explicit collaborators.
    pub fn new(scaler: Arc<dyn FeatureScaler>, classifier: Arc<dyn Classifier>) -> Self {
        Self { scaler, classifier }
    }

    /// Create a screener from loaded artifacts.
    pub fn from_artifacts(artifacts: &Artifacts) -> Self {
        Self::new(
            Arc::clone(&artifacts.scaler),
            Arc::clone(&artifacts.classifier),
        )
    }

    /// Screen an already validated feature vector.
    pub fn screen(&self, features: &FeatureVector) -> ScreeningResult<Verdict> {
        let scaled = self.scaler.transform(features)?;
        let distribution = self.classifier.predict(&scaled)?;
        let verdict = Verdict::from_distribution(&distribution);
        debug!(
            label = verdict.label,
            confidence = verdict.confidence,
            "screened submission"
        );
        Ok(verdict)
    }

    /// Parse a comma-separated submission and screen it.
    ///
    /// The scaler and classifier are not invoked if parsing fails.
    pub fn screen_bulk(&self, text: &str) -> ScreeningResult<Verdict> {
        let features = parse_bulk(text).inspect_err(|e| warn!("Rejected bulk input: {}", e))?;
        self.screen(&features)
    }

    /// Parse the detailed per-feature fields and screen them.
    pub fn screen_fields(&self, fields: &HashMap<String, String>) -> ScreeningResult<Verdict> {
        let features =
            parse_fields(fields).inspect_err(|e| warn!("Rejected detailed input: {}", e))?;
        self.screen(&features)
    }
}

impl std::fmt::Debug for Screener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screener")
            .field("scaler_dim", &self.scaler.dim())
            .field("classifier_input_dim", &self.classifier.input_dim())
            .finish()
    }
}
