//! Evaluation of the statistical model.
//!
//! Everything here trains fresh models and looks at raw model predictions;
//! the cached model and the override rules are not involved.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::classifier::{Category, ClassifierError, TrainedModel};
use crate::config::TrainingConfig;
use crate::corpus::Corpus;

pub const DEFAULT_FOLDS: usize = 5;

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// A per-class report in the shape of a classic classification report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: BTreeMap<Category, ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

/// Result of [`evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifierMetrics {
    /// Accuracy of each held-out fold
    pub fold_scores: Vec<f64>,
    pub mean_accuracy: f64,
    pub std_accuracy: f64,
    /// Computed on the same examples the model was trained on. This is an
    /// optimistic fit measure, not an estimate of generalization.
    pub training_report: ClassificationReport,
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    let denom = precision + recall;
    if denom < 1e-10 {
        0.0
    } else {
        2.0 * precision * recall / denom
    }
}

impl ClassificationReport {
    /// Builds a report over every class present in either `y_true` or `y_pred`.
    pub fn from_predictions(y_true: &[Category], y_pred: &[Category]) -> Self {
        let mut labels: Vec<Category> = y_true.iter().chain(y_pred).copied().collect();
        labels.sort();
        labels.dedup();

        let mut classes = BTreeMap::new();
        for &label in &labels {
            let mut tp = 0;
            let mut fp = 0;
            let mut fn_ = 0;
            for (&t, &p) in y_true.iter().zip(y_pred) {
                match (t == label, p == label) {
                    (true, true) => tp += 1,
                    (false, true) => fp += 1,
                    (true, false) => fn_ += 1,
                    (false, false) => {}
                }
            }
            let precision = ratio(tp, tp + fp);
            let recall = ratio(tp, tp + fn_);
            classes.insert(
                label,
                ClassMetrics {
                    precision,
                    recall,
                    f1: f1(precision, recall),
                    support: tp + fn_,
                },
            );
        }

        let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
        let total_support: usize = classes.values().map(|m| m.support).sum();
        let n_classes = classes.len().max(1) as f64;

        let macro_avg = ClassMetrics {
            precision: classes.values().map(|m| m.precision).sum::<f64>() / n_classes,
            recall: classes.values().map(|m| m.recall).sum::<f64>() / n_classes,
            f1: classes.values().map(|m| m.f1).sum::<f64>() / n_classes,
            support: total_support,
        };

        let weighted = |field: fn(&ClassMetrics) -> f64| {
            if total_support == 0 {
                0.0
            } else {
                classes.values().map(|m| field(m) * m.support as f64).sum::<f64>()
                    / total_support as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
            support: total_support,
        };

        Self {
            accuracy: ratio(correct, y_true.len()),
            classes,
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>15} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        for (label, m) in &self.classes {
            writeln!(
                f,
                "{:>15} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                label.as_str(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:>15} {:>9} {:>9} {:>9.2} {:>9}", "accuracy", "", "", self.accuracy, self.macro_avg.support)?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>15} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        Ok(())
    }
}

/// Splits example indices into `k` folds, keeping each class spread evenly.
///
/// Examples are dealt round-robin per class in corpus order, so the split is
/// deterministic.
pub fn stratified_folds(labels: &[Category], k: usize) -> Result<Vec<Vec<usize>>, ClassifierError> {
    if k < 2 {
        return Err(ClassifierError::ValidationError(format!(
            "Cross-validation needs at least 2 folds, got {}",
            k
        )));
    }

    let mut by_class: BTreeMap<Category, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }
    if let Some((label, members)) = by_class.iter().find(|(_, m)| m.len() < k) {
        return Err(ClassifierError::ValidationError(format!(
            "Class '{}' has {} examples, fewer than the {} folds",
            label,
            members.len(),
            k
        )));
    }

    let mut folds = vec![Vec::new(); k];
    for members in by_class.values() {
        for (j, &i) in members.iter().enumerate() {
            folds[j % k].push(i);
        }
    }
    for fold in &mut folds {
        fold.sort_unstable();
    }
    Ok(folds)
}

/// Accuracy of fresh models on each held-out fold.
pub fn cross_val_scores(
    corpus: &Corpus,
    config: &TrainingConfig,
    k: usize,
) -> Result<Vec<f64>, ClassifierError> {
    let labels: Vec<Category> = corpus.categories().collect();
    let folds = stratified_folds(&labels, k)?;

    let mut scores = Vec::with_capacity(k);
    for (fold_idx, test_idx) in folds.iter().enumerate() {
        let train_idx: Vec<usize> = (0..corpus.len()).filter(|i| test_idx.binary_search(i).is_err()).collect();
        let model = TrainedModel::train(&corpus.subset(&train_idx), config)?;

        let correct = test_idx
            .iter()
            .filter(|&&i| model.predict(&corpus.examples()[i].text).category == labels[i])
            .count();
        let score = ratio(correct, test_idx.len());
        log::debug!("Fold {}/{}: accuracy {:.3}", fold_idx + 1, k, score);
        scores.push(score);
    }
    Ok(scores)
}

/// Cross-validated accuracy plus a per-class report on the training data.
pub fn evaluate(corpus: &Corpus, config: &TrainingConfig) -> Result<ClassifierMetrics, ClassifierError> {
    let fold_scores = cross_val_scores(corpus, config, DEFAULT_FOLDS)?;
    let mean_accuracy = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
    let std_accuracy = (fold_scores
        .iter()
        .map(|s| (s - mean_accuracy).powi(2))
        .sum::<f64>()
        / fold_scores.len() as f64)
        .sqrt();

    let model = TrainedModel::train(corpus, config)?;
    let y_true: Vec<Category> = corpus.categories().collect();
    let y_pred: Vec<Category> = corpus.texts().map(|t| model.predict(t).category).collect();
    let training_report = ClassificationReport::from_predictions(&y_true, &y_pred);

    log::info!(
        "Cross-validated accuracy: {:.3} (+/- {:.3}) over {} folds",
        mean_accuracy,
        std_accuracy,
        fold_scores.len()
    );

    Ok(ClassifierMetrics {
        fold_scores,
        mean_accuracy,
        std_accuracy,
        training_report,
    })
}
