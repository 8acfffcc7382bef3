use std::collections::HashMap;

use super::error::ClassifierError;
use super::model::LinearClassifier;
use super::vectorizer::TfidfVectorizer;
use super::TriageLabel;

/// Upper bound on accepted symptom text, in bytes.
///
/// Inputs past this point are rejected up front instead of being fed to the
/// vectorizer.
pub const MAX_INPUT_BYTES: usize = 8 * 1024;

/// The fitted vectorize-then-classify pipeline used by the serving path.
///
/// # Thread Safety
///
/// This type is `Send + Sync` because the fitted parameters are plain owned
/// data and are never mutated after construction. A single pipeline wrapped in
/// an `Arc` is shared read-only by all concurrent requests.
#[derive(Debug, Clone)]
pub struct TriagePipeline {
    vectorizer: TfidfVectorizer,
    classifier: LinearClassifier,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<TriagePipeline>();
    }
};

/// Information about the fitted pipeline's shape.
#[derive(Debug, Clone)]
pub struct PipelineInfo {
    /// Number of tf-idf features the vectorizer produces
    pub num_features: usize,
    /// Labels the classifier scores, in weight-row order
    pub class_labels: Vec<TriageLabel>,
}

impl TriagePipeline {
    /// Pairs a fitted vectorizer with a fitted classifier.
    ///
    /// # Errors
    /// `ModelError` if the classifier's expected dimension does not match the
    /// vectorizer's output dimension.
    pub fn new(
        vectorizer: TfidfVectorizer,
        classifier: LinearClassifier,
    ) -> Result<Self, ClassifierError> {
        if vectorizer.dimension() != classifier.dimension() {
            return Err(ClassifierError::ModelError(format!(
                "Vectorizer produces {} features but classifier expects {}",
                vectorizer.dimension(),
                classifier.dimension()
            )));
        }
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    /// Returns information about the pipeline's current state
    pub fn info(&self) -> PipelineInfo {
        PipelineInfo {
            num_features: self.vectorizer.dimension(),
            class_labels: self.classifier.classes().to_vec(),
        }
    }

    /// The fitted vectorizer half of the pipeline.
    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    /// The fitted classifier half of the pipeline.
    pub fn classifier(&self) -> &LinearClassifier {
        &self.classifier
    }

    /// Predicts the triage label for a symptom description.
    ///
    /// Deterministic for a fixed pipeline: identical input text always yields
    /// the identical label.
    ///
    /// # Errors
    /// - `ValidationError` if the text is empty or exceeds [`MAX_INPUT_BYTES`]
    /// - `PredictionError` if scoring fails
    pub fn predict(&self, text: &str) -> Result<TriageLabel, ClassifierError> {
        let (label, _) = self.predict_with_scores(text)?;
        Ok(label)
    }

    /// Predicts the triage label and returns the per-class decision scores.
    pub fn predict_with_scores(
        &self,
        text: &str,
    ) -> Result<(TriageLabel, HashMap<TriageLabel, f32>), ClassifierError> {
        if text.is_empty() {
            return Err(ClassifierError::ValidationError(
                "Input text cannot be empty".into(),
            ));
        }
        if text.len() > MAX_INPUT_BYTES {
            return Err(ClassifierError::ValidationError(format!(
                "Input text too long: {} bytes (max: {})",
                text.len(),
                MAX_INPUT_BYTES
            )));
        }

        let features = self.vectorizer.transform(text);
        let scores = self.classifier.decision_function(&features)?;

        let best = scores
            .iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(label, _)| *label)
            .ok_or_else(|| ClassifierError::PredictionError("No classes to score".into()))?;

        Ok((best, scores.into_iter().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::vectorizer::DEFAULT_MAX_FEATURES;

    fn toy_pipeline() -> TriagePipeline {
        let vectorizer = TfidfVectorizer::fit(
            &["mild headache", "severe chest pain"],
            DEFAULT_MAX_FEATURES,
        );
        let dimension = vectorizer.dimension();
        let classifier = LinearClassifier::new(
            vec![TriageLabel::SelfMonitor, TriageLabel::Emergency],
            vec![vec![0.0; dimension], vec![0.1; dimension]],
            vec![0.5, 0.0],
        )
        .unwrap();
        TriagePipeline::new(vectorizer, classifier).unwrap()
    }

    #[test]
    fn test_empty_input_rejected() {
        let pipeline = toy_pipeline();
        let result = pipeline.predict("");
        assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
    }

    #[test]
    fn test_oversized_input_rejected() {
        let pipeline = toy_pipeline();
        let text = "pain ".repeat(MAX_INPUT_BYTES / 4);
        let result = pipeline.predict(&text);
        assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
    }

    #[test]
    fn test_scores_cover_all_classes() {
        let pipeline = toy_pipeline();
        let (_, scores) = pipeline.predict_with_scores("mild headache").unwrap();
        assert_eq!(scores.len(), 2);
    }

    #[test]
    fn test_dimension_mismatch_rejected_at_construction() {
        let vectorizer = TfidfVectorizer::fit(&["mild headache"], DEFAULT_MAX_FEATURES);
        let classifier = LinearClassifier::new(
            vec![TriageLabel::SelfMonitor],
            vec![vec![0.0; vectorizer.dimension() + 1]],
            vec![0.0],
        )
        .unwrap();
        assert!(TriagePipeline::new(vectorizer, classifier).is_err());
    }
}
