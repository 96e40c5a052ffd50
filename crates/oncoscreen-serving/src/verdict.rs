//! Mapping a class distribution to the verdict shown to the user.

use crate::inference::ClassDistribution;
use serde::Serialize;

/// Class label rendered as the benign verdict.
///
/// Label `1` is benign for the shipped model; every other label is rendered
/// as malignant.
pub const BENIGN_LABEL: usize = 1;

/// Number of classes the classifier must score.
pub const CLASS_COUNT: usize = 2;

/// Diagnosis implied by a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnosis {
    /// Label == [`BENIGN_LABEL`]
    Benign,
    /// Any other label
    Malignant,
}

impl Diagnosis {
    /// Diagnosis for a predicted label.
    pub fn from_label(label: usize) -> Self {
        if label == BENIGN_LABEL {
            Diagnosis::Benign
        } else {
            Diagnosis::Malignant
        }
    }
}

/// Outcome of screening one feature vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    /// Index of the most probable class
    pub label: usize,
    /// Highest class probability as a percentage
    pub confidence: f64,
    /// Diagnosis implied by `label`
    pub diagnosis: Diagnosis,
}

impl Verdict {
    /// Present a distribution: `label = argmax`, `confidence = 100 * max`.
    pub fn from_distribution(distribution: &ClassDistribution) -> Self {
        let label = distribution.argmax();
        Self {
            label,
            confidence: distribution.max() * 100.0,
            diagnosis: Diagnosis::from_label(label),
        }
    }

    /// Confidence with two decimals, e.g. `98.00%`.
    pub fn confidence_display(&self) -> String {
        format!("{:.2}%", self.confidence)
    }

    /// Whether the benign panel should be shown.
    pub fn is_benign(&self) -> bool {
        self.diagnosis == Diagnosis::Benign
    }
}
