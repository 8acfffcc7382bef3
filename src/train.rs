//! Offline training for the triage pipeline.
//!
//! This is the upstream collaborator of the serving core: it fits the tf-idf
//! vectorizer and the linear classifier on a labeled dataset and hands both
//! artifacts to the [`ArtifactStore`](crate::classifier::ArtifactStore). The
//! server never trains; it only consumes what this module produces.

use std::collections::HashMap;
use std::fmt;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::classifier::{
    ClassifierError, LinearClassifier, TfidfVectorizer, TriageLabel, TriagePipeline,
    DEFAULT_MAX_FEATURES,
};
use crate::data::Record;

#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("Training set is empty")]
    EmptyDataset,
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),
}

/// Knobs for a training run. The defaults mirror the reference setup:
/// 1+2-gram tf-idf capped at 20k features, balanced class weights, an 80/20
/// held-out split and a fixed iteration budget.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub max_features: usize,
    pub epochs: usize,
    pub learning_rate: f32,
    pub l2: f32,
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            epochs: 1000,
            learning_rate: 1.0,
            l2: 1e-4,
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Per-class evaluation metrics on the held-out split.
#[derive(Debug, Clone)]
pub struct ClassMetrics {
    pub label: TriageLabel,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Held-out evaluation of a fitted pipeline.
#[derive(Debug, Clone)]
pub struct EvalReport {
    pub per_class: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub test_rows: usize,
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<14} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1", "support"
        )?;
        for m in &self.per_class {
            writeln!(
                f,
                "{:<14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(
            f,
            "accuracy: {:.3} on {} held-out rows",
            self.accuracy, self.test_rows
        )
    }
}

/// Splits records into train/test keeping the class ratios intact.
///
/// Deterministic for a fixed seed. Every class keeps at least one training
/// row even at small sizes.
pub fn stratified_split(
    records: &[Record],
    test_fraction: f64,
    seed: u64,
) -> (Vec<Record>, Vec<Record>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut by_label: HashMap<TriageLabel, Vec<&Record>> = HashMap::new();
    for record in records {
        by_label.entry(record.label).or_default().push(record);
    }

    let mut train = Vec::new();
    let mut test = Vec::new();
    // Iterate in canonical label order so the split is reproducible.
    for label in TriageLabel::ALL {
        let Some(mut group) = by_label.remove(&label) else {
            continue;
        };
        group.shuffle(&mut rng);
        let n_test = ((group.len() as f64) * test_fraction).floor() as usize;
        let n_test = n_test.min(group.len().saturating_sub(1));
        for (i, record) in group.into_iter().enumerate() {
            if i < n_test {
                test.push(record.clone());
            } else {
                train.push(record.clone());
            }
        }
    }
    train.shuffle(&mut rng);
    (train, test)
}

/// Fits the full pipeline and evaluates it on a held-out split.
pub fn train(records: &[Record], cfg: &TrainConfig) -> Result<(TriagePipeline, EvalReport), TrainError> {
    if records.is_empty() {
        return Err(TrainError::EmptyDataset);
    }

    let (train_rows, test_rows) = stratified_split(records, cfg.test_fraction, cfg.seed);
    info!(
        "Training on {} rows, holding out {} for evaluation",
        train_rows.len(),
        test_rows.len()
    );

    let texts: Vec<&str> = train_rows.iter().map(|r| r.text.as_str()).collect();
    let vectorizer = TfidfVectorizer::fit(&texts, cfg.max_features);
    info!("Fitted vectorizer with {} features", vectorizer.dimension());

    let features: Vec<Vec<(usize, f32)>> = train_rows
        .iter()
        .map(|r| vectorizer.transform_sparse(&r.text))
        .collect();
    let targets: Vec<usize> = train_rows
        .iter()
        .map(|r| class_index(r.label))
        .collect();

    let (weights, intercepts) = fit_softmax(
        &features,
        &targets,
        vectorizer.dimension(),
        TriageLabel::ALL.len(),
        cfg,
    );

    let classifier = LinearClassifier::new(TriageLabel::ALL.to_vec(), weights, intercepts)?;
    let pipeline = TriagePipeline::new(vectorizer, classifier)?;

    let report = evaluate(&pipeline, &test_rows)?;
    Ok((pipeline, report))
}

/// Evaluates a pipeline against labeled rows.
pub fn evaluate(pipeline: &TriagePipeline, rows: &[Record]) -> Result<EvalReport, TrainError> {
    let mut correct = 0usize;
    // confusion[actual][predicted]
    let mut confusion = [[0usize; 4]; 4];
    for row in rows {
        let predicted = pipeline.predict(&row.text)?;
        if predicted == row.label {
            correct += 1;
        }
        confusion[class_index(row.label)][class_index(predicted)] += 1;
    }

    let mut per_class = Vec::with_capacity(TriageLabel::ALL.len());
    for (i, label) in TriageLabel::ALL.into_iter().enumerate() {
        let support: usize = confusion[i].iter().sum();
        let tp = confusion[i][i];
        let predicted_total: usize = (0..4).map(|a| confusion[a][i]).sum();
        let precision = ratio(tp, predicted_total);
        let recall = ratio(tp, support);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        per_class.push(ClassMetrics {
            label,
            precision,
            recall,
            f1,
            support,
        });
    }

    Ok(EvalReport {
        per_class,
        accuracy: ratio(correct, rows.len()),
        test_rows: rows.len(),
    })
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn class_index(label: TriageLabel) -> usize {
    TriageLabel::ALL
        .iter()
        .position(|&l| l == label)
        .unwrap_or(0)
}

/// Full-batch softmax regression with balanced class weights and L2 decay.
fn fit_softmax(
    features: &[Vec<(usize, f32)>],
    targets: &[usize],
    dimension: usize,
    num_classes: usize,
    cfg: &TrainConfig,
) -> (Vec<Vec<f32>>, Vec<f32>) {
    let n = features.len();
    let mut weights = vec![vec![0f32; dimension]; num_classes];
    let mut intercepts = vec![0f32; num_classes];

    // Balanced sample weights: n / (k * count_c), so rare classes are not
    // drowned out by the mild ones in a realistic distribution.
    let mut class_counts = vec![0usize; num_classes];
    for &t in targets {
        class_counts[t] += 1;
    }
    let sample_weight: Vec<f32> = (0..num_classes)
        .map(|c| {
            if class_counts[c] == 0 {
                0.0
            } else {
                n as f32 / (num_classes as f32 * class_counts[c] as f32)
            }
        })
        .collect();

    let mut grad_w = vec![vec![0f32; dimension]; num_classes];
    let mut grad_b = vec![0f32; num_classes];
    let mut logits = vec![0f32; num_classes];

    for epoch in 0..cfg.epochs {
        for row in grad_w.iter_mut() {
            row.iter_mut().for_each(|g| *g = 0.0);
        }
        grad_b.iter_mut().for_each(|g| *g = 0.0);

        let mut loss = 0f64;
        for (x, &y) in features.iter().zip(targets.iter()) {
            for c in 0..num_classes {
                let mut score = intercepts[c];
                for &(j, v) in x {
                    score += weights[c][j] * v;
                }
                logits[c] = score;
            }
            let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            let mut denom = 0f32;
            for logit in logits.iter_mut() {
                *logit = (*logit - max).exp();
                denom += *logit;
            }

            let w = sample_weight[y];
            loss -= f64::from(w) * f64::from((logits[y] / denom).max(1e-12).ln());
            for c in 0..num_classes {
                let p = logits[c] / denom;
                let g = w * (p - if c == y { 1.0 } else { 0.0 });
                grad_b[c] += g;
                for &(j, v) in x {
                    grad_w[c][j] += g * v;
                }
            }
        }

        let scale = cfg.learning_rate / n as f32;
        for c in 0..num_classes {
            for j in 0..dimension {
                weights[c][j] -= scale * grad_w[c][j] + cfg.learning_rate * cfg.l2 * weights[c][j];
            }
            intercepts[c] -= scale * grad_b[c];
        }

        if epoch % 100 == 0 {
            debug!("epoch {}: loss {:.4}", epoch, loss / n as f64);
        }
    }

    (weights, intercepts)
}
