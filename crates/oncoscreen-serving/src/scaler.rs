//! Pre-fit feature scaling applied before inference.

use crate::error::{ScreeningError, ScreeningResult};
use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Deterministic transform from raw measurements to model input.
pub trait FeatureScaler: Send + Sync {
    /// Number of features the scaler was fit on.
    fn dim(&self) -> usize;

    /// Scale one feature vector.
    fn transform(&self, features: &FeatureVector) -> ScreeningResult<Vec<f64>>;
}

/// Standardisation `(x - mean) / scale`, stored as `scaler.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Per-feature mean
    pub mean: Vec<f64>,
    /// Per-feature scale (standard deviation)
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Build a scaler, checking that both parameter vectors agree in length.
    ///
    /// Zero scale entries are replaced with `1.0` so constant features pass
    /// through centred but unscaled.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> ScreeningResult<Self> {
        if mean.len() != scale.len() {
            return Err(ScreeningError::artifact(format!(
                "scaler mean has {} entries but scale has {}",
                mean.len(),
                scale.len()
            )));
        }
        if let Some(i) = mean
            .iter()
            .chain(scale.iter())
            .position(|v| !v.is_finite())
        {
            return Err(ScreeningError::artifact(format!(
                "scaler parameter {i} is not finite"
            )));
        }
        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();
        Ok(Self { mean, scale })
    }

    /// Read a scaler from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ScreeningResult<Self> {
        let path = path.as_ref();
        debug!("Loading scaler from: {:?}", path);
        let json = std::fs::read_to_string(path).map_err(|e| {
            ScreeningError::artifact(format!("Failed to read scaler at {:?}: {}", path, e))
        })?;
        let raw: StandardScaler = serde_json::from_str(&json).map_err(|e| {
            ScreeningError::artifact(format!("Failed to parse scaler at {:?}: {}", path, e))
        })?;
        Self::new(raw.mean, raw.scale)
    }
}

impl FeatureScaler for StandardScaler {
    fn dim(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, features: &FeatureVector) -> ScreeningResult<Vec<f64>> {
        let values = features.values();
        if values.len() != self.dim() {
            return Err(ScreeningError::inference(format!(
                "scaler expects {} features, got {}",
                self.dim(),
                values.len()
            )));
        }
        Ok(values
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }
}
