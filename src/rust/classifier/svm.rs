use std::collections::BTreeMap;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::category::Category;
use super::error::ClassifierError;
use super::utils::{sparse_dot, squared_norm};
use super::vectorizer::SparseVector;
use crate::config::TrainingConfig;

/// One-vs-rest linear SVM with squared hinge loss.
///
/// Each binary problem is solved in the dual by coordinate descent. The bias
/// is learned as the weight of an extra constant feature, so it is
/// regularized like every other weight. Per-sample costs are scaled by
/// balanced class weights `n / (k * count)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvc {
    classes: Vec<Category>,
    /// One weight vector per class; the last entry is the bias
    weights: Vec<Array1<f64>>,
}

impl LinearSvc {
    pub fn fit(
        samples: &[SparseVector],
        labels: &[Category],
        n_features: usize,
        config: &TrainingConfig,
    ) -> Result<Self, ClassifierError> {
        if samples.len() != labels.len() {
            return Err(ClassifierError::TrainingError(format!(
                "Got {} samples but {} labels",
                samples.len(),
                labels.len()
            )));
        }

        let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
        for &label in labels {
            *counts.entry(label).or_insert(0) += 1;
        }
        if counts.len() < 2 {
            return Err(ClassifierError::TrainingError(format!(
                "At least two classes are required, found {}",
                counts.len()
            )));
        }

        let n_samples = labels.len() as f64;
        let n_classes = counts.len() as f64;
        let class_weight: BTreeMap<Category, f64> = counts
            .iter()
            .map(|(&c, &count)| (c, n_samples / (n_classes * count as f64)))
            .collect();
        let costs: Vec<f64> = labels.iter().map(|l| config.c * class_weight[l]).collect();

        let classes: Vec<Category> = counts.keys().copied().collect();
        let mut weights = Vec::with_capacity(classes.len());
        for &class in &classes {
            let targets: Vec<f64> = labels
                .iter()
                .map(|&l| if l == class { 1.0 } else { -1.0 })
                .collect();
            let (w, iterations) = solve_binary(samples, &targets, &costs, n_features, config);
            if iterations == config.max_iter {
                log::warn!(
                    "Solver for class '{}' reached max_iter ({}) without converging",
                    class,
                    config.max_iter
                );
            } else {
                log::debug!("Solver for class '{}' converged in {} passes", class, iterations);
            }
            weights.push(w);
        }

        Ok(Self { classes, weights })
    }

    pub fn classes(&self) -> &[Category] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.weights.first().map(|w| w.len() - 1).unwrap_or(0)
    }

    /// Signed distance to each one-vs-rest hyperplane, in class order.
    pub fn decision_function(&self, x: &SparseVector) -> Vec<f64> {
        self.weights
            .iter()
            .map(|w| sparse_dot(w, x) + w[w.len() - 1])
            .collect()
    }

    /// The highest-scoring class and its score. Ties go to the first class.
    pub fn predict(&self, x: &SparseVector) -> (Category, f64) {
        let scores = self.decision_function(x);
        let mut best = 0;
        for (i, &score) in scores.iter().enumerate() {
            if score > scores[best] {
                best = i;
            }
        }
        (self.classes[best], scores[best])
    }
}

/// Dual coordinate descent for the L2-regularized, L2-loss SVM.
///
/// Returns the weights (bias last) and the number of passes taken.
fn solve_binary(
    samples: &[SparseVector],
    targets: &[f64],
    costs: &[f64],
    n_features: usize,
    config: &TrainingConfig,
) -> (Array1<f64>, usize) {
    let bias = n_features;
    let mut w = Array1::<f64>::zeros(n_features + 1);
    let mut alpha = vec![0.0; samples.len()];
    let diag: Vec<f64> = costs.iter().map(|c| 0.5 / c).collect();
    // +1 for the constant bias feature
    let qd: Vec<f64> = samples
        .iter()
        .zip(&diag)
        .map(|(x, d)| squared_norm(x) + 1.0 + d)
        .collect();

    let mut order: Vec<usize> = (0..samples.len()).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut pass = 0;
    while pass < config.max_iter {
        order.shuffle(&mut rng);
        let mut pg_max = f64::NEG_INFINITY;
        let mut pg_min = f64::INFINITY;

        for &i in &order {
            let x = &samples[i];
            let y = targets[i];
            let g = y * (sparse_dot(&w, x) + w[bias]) - 1.0 + diag[i] * alpha[i];

            let pg = if alpha[i] == 0.0 { g.min(0.0) } else { g };
            pg_max = pg_max.max(pg);
            pg_min = pg_min.min(pg);

            if pg.abs() > 1e-12 {
                let old = alpha[i];
                alpha[i] = (alpha[i] - g / qd[i]).max(0.0);
                let step = (alpha[i] - old) * y;
                for &(j, v) in x {
                    w[j] += step * v;
                }
                w[bias] += step;
            }
        }

        pass += 1;
        if pg_max - pg_min <= config.tolerance {
            break;
        }
    }

    (w, pass)
}
