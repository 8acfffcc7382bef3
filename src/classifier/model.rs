use ndarray::{aview1, Array1};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::ClassifierError;
use super::TriageLabel;

/// A fitted linear classifier over tf-idf feature vectors.
///
/// Holds one weight row and one intercept per triage class. Scoring is the
/// plain decision function `w · x + b`; prediction takes the argmax over the
/// four classes. The parameters are produced offline by the trainer and are
/// immutable here.
#[derive(Debug, Clone, Serialize)]
pub struct LinearClassifier {
    classes: Vec<TriageLabel>,
    weights: Vec<Vec<f32>>,
    intercepts: Vec<f32>,
}

// Deserialized parameters go through `LinearClassifier::new` so an artifact
// with inconsistent shapes is rejected at load time, not at request time.
impl<'de> Deserialize<'de> for LinearClassifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Parts {
            classes: Vec<TriageLabel>,
            weights: Vec<Vec<f32>>,
            intercepts: Vec<f32>,
        }
        let parts = Parts::deserialize(deserializer)?;
        LinearClassifier::new(parts.classes, parts.weights, parts.intercepts)
            .map_err(serde::de::Error::custom)
    }
}

impl LinearClassifier {
    /// Assembles a classifier from fitted parameters.
    ///
    /// # Errors
    /// `ModelError` if the parameter shapes are inconsistent (row count vs.
    /// class count, or ragged weight rows).
    pub fn new(
        classes: Vec<TriageLabel>,
        weights: Vec<Vec<f32>>,
        intercepts: Vec<f32>,
    ) -> Result<Self, ClassifierError> {
        if classes.is_empty() {
            return Err(ClassifierError::ModelError(
                "Classifier must define at least one class".into(),
            ));
        }
        if weights.len() != classes.len() || intercepts.len() != classes.len() {
            return Err(ClassifierError::ModelError(format!(
                "Expected {} weight rows and intercepts, got {} and {}",
                classes.len(),
                weights.len(),
                intercepts.len()
            )));
        }
        let dimension = weights[0].len();
        if weights.iter().any(|row| row.len() != dimension) {
            return Err(ClassifierError::ModelError(
                "Weight rows have inconsistent dimensions".into(),
            ));
        }
        Ok(Self {
            classes,
            weights,
            intercepts,
        })
    }

    /// The classes this model scores, in weight-row order.
    pub fn classes(&self) -> &[TriageLabel] {
        &self.classes
    }

    /// Number of input features each weight row expects.
    pub fn dimension(&self) -> usize {
        self.weights[0].len()
    }

    /// Computes the per-class decision scores for a feature vector.
    ///
    /// # Errors
    /// `PredictionError` if the feature vector length does not match the
    /// fitted dimension.
    pub fn decision_function(
        &self,
        features: &Array1<f32>,
    ) -> Result<Vec<(TriageLabel, f32)>, ClassifierError> {
        if features.len() != self.dimension() {
            return Err(ClassifierError::PredictionError(format!(
                "Feature vector has {} dimensions, model expects {}",
                features.len(),
                self.dimension()
            )));
        }
        Ok(self
            .classes
            .iter()
            .zip(self.weights.iter())
            .zip(self.intercepts.iter())
            .map(|((&label, row), &bias)| (label, aview1(row).dot(features) + bias))
            .collect())
    }

    /// Returns the highest-scoring class for a feature vector.
    pub fn predict(&self, features: &Array1<f32>) -> Result<TriageLabel, ClassifierError> {
        let scores = self.decision_function(features)?;
        scores
            .into_iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(label, _)| label)
            .ok_or_else(|| ClassifierError::PredictionError("No classes to score".into()))
    }
}
