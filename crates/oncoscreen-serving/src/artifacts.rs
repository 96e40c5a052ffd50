//! Loading of the pre-built scaler, model and display image.
//!
//! An artifact directory looks like:
//!
//! ```text
//! artifacts/
//! ├── scaler.json          {"mean": [..30], "scale": [..30]}
//! ├── model_spec.json      {"type": "mlp", "input_dim": 30, ...}
//! ├── dense/params.json    {"mlp.layers.0.weight": [...], ...}
//! └── cancer_image.png     optional
//! ```
//!
//! Everything is read once at startup; the resulting [`Artifacts`] is
//! immutable and shared by reference.

use crate::config::ArtifactConfig;
use crate::error::{ScreeningError, ScreeningResult};
use crate::features::FEATURE_COUNT;
use crate::inference::{best_device, build_classifier, Classifier, ModelSpec};
use crate::scaler::{FeatureScaler, StandardScaler};
use crate::verdict::CLASS_COUNT;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything the screening pipeline needs, loaded from disk.
pub struct Artifacts {
    /// Directory the artifacts were loaded from
    pub path: PathBuf,

    /// Timestamp when the artifacts were loaded
    pub loaded_at: std::time::Instant,

    /// Layer layout of the classifier
    pub model_spec: ModelSpec,

    /// Feature scaler
    pub scaler: Arc<dyn FeatureScaler>,

    /// Classifier
    pub classifier: Arc<dyn Classifier>,

    /// Display image bytes, if present
    pub image: Option<Vec<u8>>,
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifacts")
            .field("path", &self.path)
            .field("loaded_at", &self.loaded_at)
            .field("model_spec", &self.model_spec)
            .field("scaler_dim", &self.scaler.dim())
            .field("image_bytes", &self.image.as_ref().map(Vec::len))
            .finish()
    }
}

impl Artifacts {
    /// Load the artifacts in `dir` using the default file layout.
    pub fn load(dir: impl AsRef<Path>) -> ScreeningResult<Self> {
        Self::load_with(dir, &ArtifactConfig::default())
    }

    /// Load the artifacts in `dir` using the file names in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScreeningError::ArtifactLoad`] if a required file is missing
    /// or malformed, if the scaler and model disagree on the number of
    /// features, or if the model does not score exactly two classes.
    pub fn load_with(dir: impl AsRef<Path>, config: &ArtifactConfig) -> ScreeningResult<Self> {
        let path = dir.as_ref().to_path_buf();
        info!("Loading artifacts from: {:?}", path);

        if !path.is_dir() {
            return Err(ScreeningError::artifact(format!(
                "Artifact directory does not exist: {:?}",
                path
            )));
        }

        let scaler = StandardScaler::from_json_file(path.join(&config.scaler_file))?;
        debug!("Loaded scaler with {} features", scaler.dim());

        let model_spec = load_model_spec(&path.join(&config.model_spec_file))?;
        let params = load_dense_params(&path.join(&config.params_file))?;
        debug!("Loaded {} dense params", params.len());

        if scaler.dim() != FEATURE_COUNT || model_spec.input_dim() != FEATURE_COUNT {
            return Err(ScreeningError::artifact(format!(
                "expected {} features, scaler has {} and model expects {}",
                FEATURE_COUNT,
                scaler.dim(),
                model_spec.input_dim()
            )));
        }

        if model_spec.class_count() != CLASS_COUNT {
            return Err(ScreeningError::artifact(format!(
                "expected a {}-class model, model scores {} classes",
                CLASS_COUNT,
                model_spec.class_count()
            )));
        }

        let classifier = build_classifier(&model_spec, &params, &best_device())?;

        let image = load_image(&path.join(&config.image_file))?;

        info!("Artifacts loaded successfully from: {:?}", path);
        Ok(Self {
            path,
            loaded_at: std::time::Instant::now(),
            model_spec,
            scaler: Arc::new(scaler),
            classifier: Arc::from(classifier),
            image,
        })
    }
}

fn load_model_spec(path: &Path) -> ScreeningResult<ModelSpec> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        ScreeningError::artifact(format!("Failed to read model spec at {:?}: {}", path, e))
    })?;
    serde_json::from_str(&json).map_err(|e| {
        ScreeningError::artifact(format!("Failed to parse model spec at {:?}: {}", path, e))
    })
}

fn load_dense_params(path: &Path) -> ScreeningResult<HashMap<String, Vec<f32>>> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        ScreeningError::artifact(format!("Failed to read dense params at {:?}: {}", path, e))
    })?;
    serde_json::from_str(&json).map_err(|e| {
        ScreeningError::artifact(format!("Failed to parse dense params at {:?}: {}", path, e))
    })
}

fn load_image(path: &Path) -> ScreeningResult<Option<Vec<u8>>> {
    if !path.exists() {
        warn!("No display image at {:?}, page will render without it", path);
        return Ok(None);
    }
    Ok(Some(std::fs::read(path)?))
}


#[cfg(test)]
mod tests {
    use super::testing::write_sum_artifacts;
    use super::*;
    use crate::inference::{MlpSpec, OutputActivation};
    use tempfile::tempdir;

    #[test]
    fn test_load_artifacts() {
        let dir = tempdir().unwrap();
        write_sum_artifacts(dir.path());

        let artifacts = Artifacts::load(dir.path()).unwrap();
        assert_eq!(artifacts.scaler.dim(), 30);
        assert_eq!(artifacts.classifier.input_dim(), 30);
        assert!(artifacts.image.is_none());
    }

    #[test]
    fn test_load_with_image() {
        let dir = tempdir().unwrap();
        write_sum_artifacts(dir.path());
        std::fs::write(dir.path().join("cancer_image.png"), b"\x89PNG").unwrap();

        let artifacts = Artifacts::load(dir.path()).unwrap();
        assert_eq!(artifacts.image.as_deref(), Some(&b"\x89PNG"[..]));
    }

    #[test]
    fn test_load_nonexistent_path() {
        let result = Artifacts::load("/nonexistent/path/to/artifacts");
        assert!(matches!(result, Err(ScreeningError::ArtifactLoad(_))));
    }

    #[test]
    fn test_missing_scaler() {
        let dir = tempdir().unwrap();
        write_sum_artifacts(dir.path());
        std::fs::remove_file(dir.path().join("scaler.json")).unwrap();

        let err = Artifacts::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("scaler"));
    }

    #[test]
    fn test_malformed_model_spec() {
        let dir = tempdir().unwrap();
        write_sum_artifacts(dir.path());
        std::fs::write(dir.path().join("model_spec.json"), "{not json").unwrap();

        assert!(matches!(
            Artifacts::load(dir.path()),
            Err(ScreeningError::ArtifactLoad(_))
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let dir = tempdir().unwrap();
        write_sum_artifacts(dir.path());
        std::fs::write(
            dir.path().join("scaler.json"),
            serde_json::json!({ "mean": vec![0.0; 10], "scale": vec![1.0; 10] }).to_string(),
        )
        .unwrap();

        let err = Artifacts::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("expected 30 features"));
    }

    fn rewrite_model(dir: &Path, edit: impl FnOnce(&mut MlpSpec, &mut HashMap<String, Vec<f32>>)) {
        let (mut spec, mut params) = crate::inference::tests::sum_model_params(FEATURE_COUNT);
        edit(&mut spec, &mut params);
        std::fs::write(
            dir.join("model_spec.json"),
            serde_json::to_string(&ModelSpec::Mlp(spec)).unwrap(),
        )
        .unwrap();
        std::fs::write(
            dir.join("dense").join("params.json"),
            serde_json::to_string(&params).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn test_three_class_model_rejected() {
        let dir = tempdir().unwrap();
        write_sum_artifacts(dir.path());
        rewrite_model(dir.path(), |spec, params| {
            spec.output_dim = 3;
            params.insert("mlp.layers.1.weight".to_string(), vec![1.0; 6]);
            params.insert("mlp.layers.1.bias".to_string(), vec![0.0; 3]);
        });

        let err = Artifacts::load(dir.path()).unwrap_err();
        assert!(matches!(err, ScreeningError::ArtifactLoad(_)));
        assert!(err.to_string().contains("2-class"));
    }

    #[test]
    fn test_sigmoid_and_raw_two_class_models_load() {
        let dir = tempdir().unwrap();
        write_sum_artifacts(dir.path());
        rewrite_model(dir.path(), |spec, _| {
            spec.output_activation = OutputActivation::None;
        });
        assert!(Artifacts::load(dir.path()).is_ok());

        rewrite_model(dir.path(), |spec, params| {
            spec.hidden_dims = vec![];
            spec.output_dim = 1;
            spec.output_activation = OutputActivation::Sigmoid;
            params.clear();
            params.insert("mlp.layers.0.weight".to_string(), vec![1.0; FEATURE_COUNT]);
            params.insert("mlp.layers.0.bias".to_string(), vec![0.0]);
        });
        let artifacts = Artifacts::load(dir.path()).unwrap();
        assert_eq!(artifacts.model_spec.class_count(), 2);
    }

    #[test]
    fn test_custom_file_names() {
        let dir = tempdir().unwrap();
        write_sum_artifacts(dir.path());
        std::fs::rename(
            dir.path().join("scaler.json"),
            dir.path().join("scaler.v2.json"),
        )
        .unwrap();

        let config = ArtifactConfig {
            scaler_file: "scaler.v2.json".into(),
            ..Default::default()
        };
        assert!(Artifacts::load_with(dir.path(), &config).is_ok());
    }
}
