//! Breast tumor screening form served over HTTP.
//!
//! This crate takes 30 numeric tumor measurements, scales them with a pre-fit
//! scaler, evaluates a pre-trained classifier and renders a benign/malignant
//! verdict with a confidence score.
//!
//! # Overview
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌────────────┐   ┌────────────┐   ┌──────────┐
//! │ HTTP form /  │──►│ input       │──►│ scaler     │──►│ inference  │──►│ verdict  │
//! │ JSON API     │   │ (parse, 30) │   │ (standard) │   │ (Candle)   │   │ + page   │
//! └──────────────┘   └─────────────┘   └────────────┘   └────────────┘   └──────────┘
//! ```
//!
//! - **input**: comma-separated or per-field parsing with exact-count checks
//! - **scaler**: `(x - mean) / scale`, loaded from `scaler.json`
//! - **inference**: feed-forward classifier evaluated with Candle
//! - **verdict**: `label = argmax`, `confidence = 100 * max`, label 1 is benign
//! - **page** / **server**: server-side rendered form on `axum`
//!
//! The scaler and classifier are loaded once into [`Artifacts`] and shared
//! read-only through a [`Screener`].
//!
//! # Quick Start
//!
//! ```no_run
//! use oncoscreen_serving::{Artifacts, Screener};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let artifacts = Artifacts::load("./artifacts")?;
//! let screener = Screener::from_artifacts(&artifacts);
//!
//! let verdict = screener.screen_bulk(oncoscreen_serving::features::SAMPLE_BULK_INPUT)?;
//! println!("label={} confidence={}", verdict.label, verdict.confidence_display());
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`ScreeningResult<T>`] which wraps [`ScreeningError`]:
//!
//! ```
//! use oncoscreen_serving::error::{ScreeningError, ScreeningResult};
//! use oncoscreen_serving::verdict::Verdict;
//!
//! fn describe(result: ScreeningResult<Verdict>) -> String {
//!     match result {
//!         Ok(v) => v.confidence_display(),
//!         Err(ScreeningError::InvalidFeatureCount { expected, .. }) => {
//!             format!("need {expected} values")
//!         }
//!         Err(e) if e.is_input_error() => format!("bad input: {e}"),
//!         Err(e) => format!("error: {e}"),
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod artifacts;
pub mod config;
pub mod error;
pub mod features;
pub mod inference;
pub mod input;
pub mod page;
pub mod scaler;
pub mod screening;
pub mod server;
pub mod verdict;

// Re-export main types at crate root for convenience
pub use artifacts::Artifacts;
pub use config::{ArtifactConfig, ServerConfig};
pub use error::{ScreeningError, ScreeningResult};
pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use inference::{ClassDistribution, Classifier};
pub use scaler::{FeatureScaler, StandardScaler};
pub use screening::Screener;
pub use server::{AppState, Server};
pub use verdict::{Diagnosis, Verdict};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "oncoscreen-serving");
    }

    #[test]
    fn test_re_exports() {
        let _ = ServerConfig::default();
        let _ = ArtifactConfig::default();
        assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
    }
}
