use serde::{Deserialize, Serialize};

/// Hyper-parameters for the vectorize-then-classify pipeline.
///
/// Every field feeds the model fingerprint, so changing any of them
/// invalidates a cached model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Smallest and largest n-gram length, inclusive
    pub ngram_range: (usize, usize),
    /// Vocabulary cap; the most frequent terms are kept
    pub max_features: usize,
    /// Use `1 + ln(tf)` instead of raw term counts
    pub sublinear_tf: bool,
    /// Inverse regularization strength of the SVM
    pub c: f64,
    /// Maximum passes of the dual coordinate descent solver
    pub max_iter: usize,
    /// Stopping tolerance on the projected gradient
    pub tolerance: f64,
    /// Seed for the solver's per-pass permutation
    pub seed: u64,
    /// Margin below which short, non-sentiment predictions fall back to neutral
    pub confidence_threshold: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            ngram_range: (1, 3),
            max_features: 5000,
            sublinear_tf: true,
            c: 1.0,
            max_iter: 1000,
            tolerance: 1e-4,
            seed: 42,
            confidence_threshold: 0.5,
        }
    }
}

impl TrainingConfig {
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.ngram_range = (min_n, max_n);
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_sublinear_tf(mut self, sublinear_tf: bool) -> Self {
        self.sublinear_tf = sublinear_tf;
        self
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Checks that the parameters describe a trainable pipeline.
    pub fn validate(&self) -> Result<(), String> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(format!("Invalid n-gram range ({}, {})", min_n, max_n));
        }
        if self.max_features == 0 {
            return Err("max_features must be greater than zero".into());
        }
        if !(self.c > 0.0) {
            return Err(format!("C must be positive, got {}", self.c));
        }
        if self.max_iter == 0 {
            return Err("max_iter must be greater than zero".into());
        }
        if !(self.tolerance > 0.0) {
            return Err(format!("Tolerance must be positive, got {}", self.tolerance));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = TrainingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ngram_range, (1, 3));
        assert!(config.sublinear_tf);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(TrainingConfig::default().with_ngram_range(0, 2).validate().is_err());
        assert!(TrainingConfig::default().with_ngram_range(3, 1).validate().is_err());
        assert!(TrainingConfig::default().with_max_features(0).validate().is_err());
        assert!(TrainingConfig::default().with_c(0.0).validate().is_err());
        assert!(TrainingConfig::default().with_tolerance(f64::NAN).validate().is_err());
    }
}
