//! Classification results as returned by the Inference Service.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One (class, confidence) pair of a ranked distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassScore {
    #[serde(rename = "class")]
    pub class: String,
    pub confidence: f64,
}

impl ClassScore {
    pub fn new(class: impl Into<String>, confidence: f64) -> Self {
        Self {
            class: class.into(),
            confidence,
        }
    }
}

/// Immutable result of one inference call.
///
/// `ranked` is ordered by descending confidence and sums informally to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub predicted_class: String,
    pub confidence: f64,
    #[serde(default)]
    pub ranked: Vec<ClassScore>,
}

impl ClassificationResult {
    /// Build a result, sorting `ranked` by descending confidence.
    pub fn new(predicted_class: impl Into<String>, confidence: f64, mut ranked: Vec<ClassScore>) -> Self {
        ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Self {
            predicted_class: predicted_class.into(),
            confidence,
            ranked,
        }
    }

    /// Class → confidence map of the full distribution.
    ///
    /// Falls back to the top prediction alone when no distribution was sent.
    pub fn distribution(&self) -> BTreeMap<String, f64> {
        if self.ranked.is_empty() {
            return BTreeMap::from([(self.predicted_class.clone(), self.confidence)]);
        }
        self.ranked
            .iter()
            .map(|s| (s.class.clone(), s.confidence))
            .collect()
    }
}
