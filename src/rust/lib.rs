//! A small supervised text classifier: TF-IDF features, a one-vs-rest linear
//! SVM, and a chain of hand-written override rules on top of the model.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use amygdala::{Category, Classifier, Corpus};
//!
//! let classifier = Classifier::builder()
//!     .with_corpus(Corpus::builtin())
//!     .build()?;
//!
//! let result = classifier.classify("This is an amazing product, I love it!")?;
//! assert_eq!(result.category, Category::Positive);
//! println!("{}: {}", result.category, result.description);
//! # Ok(())
//! # }
//! ```
//!
//! # Process-wide classifier
//!
//! [`classify_text`], [`get_category_description`] and
//! [`get_classifier_metrics`] use a shared classifier built on first use from
//! the built-in corpus, loading the cached model when one matches.
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let category = amygdala::classify_text("When will my order arrive?")?;
//! println!("{}", amygdala::get_category_description(category.as_str()));
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex};

use lazy_static::lazy_static;

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod export;
pub mod metrics;
pub mod model_cache;

pub use classifier::preprocess::preprocess;
pub use classifier::{
    get_category_description, Category, Classification, Classifier, ClassifierBuilder, ClassifierError,
    ClassifierInfo, OverrideRule, TrainedModel,
};
pub use config::TrainingConfig;
pub use corpus::{Corpus, CorpusError, CorpusStats, Example};
pub use metrics::{evaluate, ClassificationReport, ClassifierMetrics};
pub use model_cache::{CacheError, ModelCache};

lazy_static! {
    static ref DEFAULT_CLASSIFIER: Mutex<Option<Arc<Classifier>>> = Mutex::new(None);
}

/// Returns the shared classifier, building it on first use.
pub fn default_classifier() -> Result<Arc<Classifier>, ClassifierError> {
    let mut slot = DEFAULT_CLASSIFIER
        .lock()
        .map_err(|_| ClassifierError::ModelError("Default classifier lock poisoned".into()))?;
    if let Some(classifier) = slot.as_ref() {
        return Ok(Arc::clone(classifier));
    }

    log::info!("Building default classifier...");
    let classifier = Arc::new(Classifier::builder().build()?);
    *slot = Some(Arc::clone(&classifier));
    Ok(classifier)
}

/// Classifies a text with the shared classifier.
pub fn classify_text(text: &str) -> Result<Category, ClassifierError> {
    default_classifier()?.classify_label(text)
}

/// Evaluates a freshly trained model on the built-in corpus.
pub fn get_classifier_metrics() -> Result<ClassifierMetrics, ClassifierError> {
    evaluate(&Corpus::builtin(), &TrainingConfig::default())
}

pub fn init_logger() {
    env_logger::init();
}
