//! The fixed 30-measurement feature layout.

use crate::error::{ScreeningError, ScreeningResult};
use serde::{Deserialize, Serialize};

/// Number of measurements in a feature vector.
pub const FEATURE_COUNT: usize = 30;

/// Feature names in model input order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "mean radius",
    "mean texture",
    "mean perimeter",
    "mean area",
    "mean smoothness",
    "mean compactness",
    "mean concavity",
    "mean concave points",
    "mean symmetry",
    "mean fractal dimension",
    "radius error",
    "texture error",
    "perimeter error",
    "area error",
    "smoothness error",
    "compactness error",
    "concavity error",
    "concave points error",
    "symmetry error",
    "fractal dimension error",
    "worst radius",
    "worst texture",
    "worst perimeter",
    "worst area",
    "worst smoothness",
    "worst compactness",
    "worst concavity",
    "worst concave points",
    "worst symmetry",
    "worst fractal dimension",
];

/// Prefilled value of the bulk text field.
pub const SAMPLE_BULK_INPUT: &str = "11.76,21.6,74.72,427.9,0.08637,0.04966,0.01657,0.01115,0.1495,0.05888,0.4062,1.21,2.635,28.47,0.005857,0.009758,0.01168,0.007445,0.02406,0.001769,12.98,25.72,82.98,516.5,0.1085,0.08615,0.05523,0.03715,0.2433,0.06563";

/// Prefilled values of the detailed per-feature fields.
pub const SAMPLE_DETAILED_INPUT: [f64; FEATURE_COUNT] = [
    22.270, 19.67, 152.80, 1509.0, 0.13260, 0.27680, 0.426400, 0.182300, 0.2556, 0.07039,
    1.2150, 1.5450, 10.050, 170.00, 0.006515, 0.086680, 0.104000, 0.024800, 0.03112, 0.005037,
    28.40, 28.01, 206.80, 2360.0, 0.1701, 0.6997, 0.96080, 0.29100, 0.4055, 0.09789,
];

/// Display label for a feature: the name with its first letter capitalised.
pub fn display_label(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// An ordered vector of exactly [`FEATURE_COUNT`] measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Build a feature vector, rejecting any length other than [`FEATURE_COUNT`].
    pub fn new(values: Vec<f64>) -> ScreeningResult<Self> {
        if values.len() != FEATURE_COUNT {
            return Err(ScreeningError::InvalidFeatureCount {
                expected: FEATURE_COUNT,
                actual: values.len(),
            });
        }
        Ok(Self(values))
    }

    /// The raw measurements in model input order.
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Pair each measurement with its feature name.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

impl TryFrom<Vec<f64>> for FeatureVector {
    type Error = ScreeningError;

    fn try_from(values: Vec<f64>) -> ScreeningResult<Self> {
        Self::new(values)
    }
}

impl From<FeatureVector> for Vec<f64> {
    fn from(v: FeatureVector) -> Self {
        v.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_length() {
        assert!(FeatureVector::new(vec![0.0; FEATURE_COUNT]).is_ok());

        let err = FeatureVector::new(vec![1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            ScreeningError::InvalidFeatureCount {
                expected: 30,
                actual: 3
            }
        ));

        assert!(FeatureVector::new(vec![0.0; FEATURE_COUNT + 1]).is_err());
    }

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("mean radius"), "Mean radius");
        assert_eq!(display_label("worst fractal dimension"), "Worst fractal dimension");
        assert_eq!(display_label(""), "");
    }

    #[test]
    fn test_named_follows_feature_order() {
        let v = FeatureVector::new(SAMPLE_DETAILED_INPUT.to_vec()).unwrap();
        let named: Vec<_> = v.named().collect();
        assert_eq!(named[0], ("mean radius", 22.270));
        assert_eq!(named[29], ("worst fractal dimension", 0.09789));
    }

    #[test]
    fn test_serde_enforces_length() {
        let v: FeatureVector = serde_json::from_str(&serde_json::to_string(&[1.0; 30]).unwrap()).unwrap();
        assert_eq!(v.values().len(), 30);

        let err = serde_json::from_str::<FeatureVector>("[1.0, 2.0]");
        assert!(err.is_err());
    }

    #[test]
    fn test_sample_bulk_has_thirty_tokens() {
        assert_eq!(SAMPLE_BULK_INPUT.split(',').count(), FEATURE_COUNT);
    }
}
