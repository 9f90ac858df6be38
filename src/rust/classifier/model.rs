use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::category::Category;
use super::error::ClassifierError;
use super::preprocess::preprocess;
use super::svm::LinearSvc;
use super::vectorizer::TfIdfVectorizer;
use crate::config::TrainingConfig;
use crate::corpus::Corpus;

/// Bumped whenever the serialized layout of [`TrainedModel`] changes.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// A raw model prediction before any override rule is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub category: Category,
    /// Decision value of the winning one-vs-rest classifier
    pub margin: f64,
}

/// A fitted vectorize-then-classify pipeline.
///
/// The model remembers the fingerprint of the corpus and config it was
/// trained from, which lets a cache detect that it has gone stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub format_version: u32,
    pub fingerprint: String,
    vectorizer: TfIdfVectorizer,
    svm: LinearSvc,
}

impl TrainedModel {
    /// Fits a fresh pipeline on every example of the corpus.
    pub fn train(corpus: &Corpus, config: &TrainingConfig) -> Result<Self, ClassifierError> {
        config.validate().map_err(ClassifierError::ValidationError)?;

        let documents: Vec<String> = corpus.texts().map(preprocess).collect();
        let labels: Vec<Category> = corpus.categories().collect();

        let mut vectorizer = TfIdfVectorizer::new(config);
        let samples = vectorizer.fit_transform(&documents)?;
        let svm = LinearSvc::fit(&samples, &labels, vectorizer.n_features(), config)?;

        log::info!(
            "Trained model on {} examples ({} features, {} classes)",
            corpus.len(),
            vectorizer.n_features(),
            svm.classes().len()
        );

        Ok(Self {
            format_version: MODEL_FORMAT_VERSION,
            fingerprint: model_fingerprint(corpus, config),
            vectorizer,
            svm,
        })
    }

    /// Predicts from text that has already been through [`preprocess`].
    pub fn predict_preprocessed(&self, processed: &str) -> Prediction {
        let features = self.vectorizer.transform(processed);
        let (category, margin) = self.svm.predict(&features);
        Prediction { category, margin }
    }

    /// Preprocesses and predicts.
    pub fn predict(&self, text: &str) -> Prediction {
        self.predict_preprocessed(&preprocess(text))
    }

    /// Per-class decision values, paired with their class.
    pub fn decision_scores(&self, text: &str) -> Vec<(Category, f64)> {
        let features = self.vectorizer.transform(&preprocess(text));
        self.svm
            .classes()
            .iter()
            .copied()
            .zip(self.svm.decision_function(&features))
            .collect()
    }

    pub fn classes(&self) -> &[Category] {
        self.svm.classes()
    }

    pub fn n_features(&self) -> usize {
        self.vectorizer.n_features()
    }
}

/// SHA-256 over the corpus fingerprint and the training configuration.
pub fn model_fingerprint(corpus: &Corpus, config: &TrainingConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(corpus.fingerprint().as_bytes());
    hasher.update(format!("{:?}", config).as_bytes());
    hasher.update(MODEL_FORMAT_VERSION.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_builtin() {
        let model = TrainedModel::train(&Corpus::builtin(), &TrainingConfig::default()).unwrap();
        assert_eq!(model.classes().len(), 5);
        assert!(model.n_features() > 100);
        assert_eq!(model.format_version, MODEL_FORMAT_VERSION);
        assert_eq!(model.decision_scores("How does this work?").len(), 5);
    }

    #[test]
    fn test_fits_training_examples() {
        let corpus = Corpus::builtin();
        let model = TrainedModel::train(&corpus, &TrainingConfig::default()).unwrap();
        let correct = corpus
            .examples()
            .iter()
            .filter(|e| model.predict(&e.text).category == e.category)
            .count();
        assert!(correct as f64 / corpus.len() as f64 >= 0.9);
    }

    #[test]
    fn test_fingerprint_depends_on_config() {
        let corpus = Corpus::builtin();
        let a = model_fingerprint(&corpus, &TrainingConfig::default());
        let b = model_fingerprint(&corpus, &TrainingConfig::default().with_c(0.5));
        assert_ne!(a, b);
        assert_eq!(a, model_fingerprint(&corpus, &TrainingConfig::default()));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = TrainedModel::train(&Corpus::builtin(), &TrainingConfig::default().with_max_features(0));
        assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
    }
}
