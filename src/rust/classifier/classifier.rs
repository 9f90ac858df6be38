use std::sync::Arc;

use serde::Serialize;

use super::category::Category;
use super::error::ClassifierError;
use super::model::TrainedModel;
use super::preprocess::preprocess;
use super::rules::{apply_overrides, OverrideRule};
use crate::config::TrainingConfig;

/// The outcome of classifying one text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub category: Category,
    pub description: &'static str,
    /// What the statistical model predicted before the override rules ran
    pub raw_prediction: Category,
    /// Decision value behind `raw_prediction`
    pub margin: f64,
    /// The override that replaced the raw prediction, if any
    pub rule: Option<OverrideRule>,
}

/// A thread-safe text classifier: a trained TF-IDF + linear SVM pipeline
/// followed by the override rules.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use amygdala::{Category, Classifier};
/// use std::sync::Arc;
/// use std::thread;
///
/// let classifier = Arc::new(Classifier::builder().build()?);
///
/// let classifier_clone = Arc::clone(&classifier);
/// let handle = thread::spawn(move || classifier_clone.classify("When will it ship?"));
/// assert_eq!(handle.join().unwrap()?.category, Category::Question);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    model: Arc<TrainedModel>,
    config: TrainingConfig,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    pub(crate) fn new(model: Arc<TrainedModel>, config: TrainingConfig) -> Self {
        Self { model, config }
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            num_classes: self.model.classes().len(),
            class_labels: self.model.classes().to_vec(),
            num_features: self.model.n_features(),
            fingerprint: self.model.fingerprint.clone(),
            confidence_threshold: self.config.confidence_threshold,
        }
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    /// Classifies a text.
    ///
    /// # Errors
    /// - `ValidationError` if the text is empty or only whitespace
    pub fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        if text.trim().is_empty() {
            return Err(ClassifierError::ValidationError("Input text cannot be empty".into()));
        }

        let processed = preprocess(text);
        let prediction = self.model.predict_preprocessed(&processed);
        let (category, rule) =
            apply_overrides(text, &processed, &prediction, self.config.confidence_threshold);

        if let Some(rule) = rule {
            log::debug!(
                "Override '{}' changed {} -> {} for {:?}",
                rule.as_str(),
                prediction.category,
                category,
                text
            );
        }

        Ok(Classification {
            category,
            description: category.describe(),
            raw_prediction: prediction.category,
            margin: prediction.margin,
            rule,
        })
    }

    /// Classifies a text and returns only its category.
    pub fn classify_label(&self, text: &str) -> Result<Category, ClassifierError> {
        self.classify(text).map(|c| c.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_classifier() -> Classifier {
        Classifier::builder()
            .without_cache()
            .build()
            .expect("Failed to create classifier")
    }

    #[test]
    fn test_class_info() {
        let classifier = setup_test_classifier();
        let info = classifier.info();
        assert_eq!(info.num_classes, 5);
        assert!(info.class_labels.contains(&Category::Neutral));
        assert!(!info.class_labels.contains(&Category::Uncertain));
        assert_eq!(info.fingerprint.len(), 64);
    }

    #[test]
    fn test_empty_input() {
        let classifier = setup_test_classifier();
        assert!(matches!(classifier.classify(""), Err(ClassifierError::ValidationError(_))));
        assert!(classifier.classify(" \n\t").is_err());
    }

    #[test]
    fn test_classification_fields() {
        let classifier = setup_test_classifier();
        let result = classifier.classify("I don't love this").unwrap();
        assert_eq!(result.category, Category::Negative);
        assert_eq!(result.rule, Some(OverrideRule::NegativeOpener));
        assert_eq!(result.description, Category::Negative.describe());
    }

    #[test]
    fn test_unseen_vocabulary() {
        // Nothing in the vocabulary: the decision comes from the biases alone
        let classifier = setup_test_classifier();
        assert!(classifier.classify("zzz qqq").is_ok());
    }
}
