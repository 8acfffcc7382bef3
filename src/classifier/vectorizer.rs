use std::collections::{HashMap, HashSet};

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Default cap on the learned vocabulary size.
pub const DEFAULT_MAX_FEATURES: usize = 20_000;

/// A fitted tf-idf vectorizer over word 1- and 2-grams.
///
/// The vocabulary and idf weights are learned once at training time and are
/// immutable afterwards; `transform` is a pure function of the fitted state.
/// Out-of-vocabulary terms contribute zero signal and never raise an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    max_features: usize,
}

/// Lowercases the text and extracts word tokens of at least two characters.
fn word_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Expands word tokens into the unigram + bigram term sequence.
fn terms(tokens: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len() * 2);
    out.extend(tokens.iter().cloned());
    for pair in tokens.windows(2) {
        out.push(format!("{} {}", pair[0], pair[1]));
    }
    out
}

impl TfidfVectorizer {
    /// Learns the vocabulary and idf weights from a corpus of documents.
    ///
    /// Terms are ranked by corpus frequency and truncated to `max_features`;
    /// the surviving terms are indexed in lexicographic order so that a
    /// fitted vectorizer serializes deterministically. Idf uses the smoothed
    /// form `ln((1 + n) / (1 + df)) + 1`.
    pub fn fit<S: AsRef<str>>(documents: &[S], max_features: usize) -> Self {
        let mut corpus_counts: HashMap<String, u64> = HashMap::new();
        let mut doc_counts: HashMap<String, u64> = HashMap::new();

        for doc in documents {
            let doc_terms = terms(&word_tokens(doc.as_ref()));
            let mut seen: HashSet<&str> = HashSet::new();
            for term in &doc_terms {
                *corpus_counts.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term) {
                    *doc_counts.entry(term.clone()).or_insert(0) += 1;
                }
            }
        }

        // Keep the most frequent terms; break frequency ties lexicographically
        // so fitting is reproducible.
        let mut ranked: Vec<(String, u64)> = corpus_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);

        let mut kept: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
        kept.sort();

        let n_docs = documents.len() as f32;
        let mut vocabulary = HashMap::with_capacity(kept.len());
        let mut idf = Vec::with_capacity(kept.len());
        for (index, term) in kept.into_iter().enumerate() {
            let df = doc_counts.get(&term).copied().unwrap_or(0) as f32;
            idf.push(((1.0 + n_docs) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Self {
            vocabulary,
            idf,
            max_features,
        }
    }

    /// Number of features a transformed vector carries.
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    /// Configured vocabulary cap.
    pub fn max_features(&self) -> usize {
        self.max_features
    }

    /// Transforms text into a sparse `(feature_index, weight)` representation.
    ///
    /// The weights are L2-normalized tf-idf values. An input with no known
    /// terms yields an empty vector rather than an error.
    pub fn transform_sparse(&self, text: &str) -> Vec<(usize, f32)> {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for term in terms(&word_tokens(text)) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut weighted: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();

        let norm: f32 = weighted.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 1e-10 {
            for (_, w) in weighted.iter_mut() {
                *w /= norm;
            }
        }

        weighted.sort_by_key(|(index, _)| *index);
        weighted
    }

    /// Transforms text into a dense feature vector of length `dimension()`.
    pub fn transform(&self, text: &str) -> Array1<f32> {
        let mut dense = Array1::zeros(self.dimension());
        for (index, weight) in self.transform_sparse(text) {
            dense[index] = weight;
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted() -> TfidfVectorizer {
        TfidfVectorizer::fit(
            &[
                "severe chest pain",
                "mild headache for two days",
                "severe chest pain started suddenly",
            ],
            DEFAULT_MAX_FEATURES,
        )
    }

    #[test]
    fn test_tokenization_drops_single_chars() {
        let tokens = word_tokens("I am 25 years old, a bit dizzy");
        assert!(!tokens.contains(&"i".to_string()));
        assert!(!tokens.contains(&"a".to_string()));
        assert!(tokens.contains(&"25".to_string()));
        assert!(tokens.contains(&"dizzy".to_string()));
    }

    #[test]
    fn test_bigrams_included() {
        let vectorizer = fitted();
        assert!(vectorizer.vocabulary.contains_key("chest pain"));
        assert!(vectorizer.vocabulary.contains_key("chest"));
    }

    #[test]
    fn test_transform_is_normalized() {
        let vectorizer = fitted();
        let vector = vectorizer.transform("severe chest pain");
        let norm: f32 = vector.iter().map(|w| w * w).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_unknown_terms_are_silent() {
        let vectorizer = fitted();
        let sparse = vectorizer.transform_sparse("completely unrelated gibberish");
        assert!(sparse.is_empty());
    }

    #[test]
    fn test_max_features_caps_vocabulary() {
        let vectorizer = TfidfVectorizer::fit(
            &["one two three four five", "six seven eight nine ten"],
            4,
        );
        assert_eq!(vectorizer.dimension(), 4);
    }

    #[test]
    fn test_case_insensitive() {
        let vectorizer = fitted();
        let a = vectorizer.transform("Severe Chest Pain");
        let b = vectorizer.transform("severe chest pain");
        assert_eq!(a, b);
    }
}
