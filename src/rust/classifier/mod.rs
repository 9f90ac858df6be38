mod error;
mod category;
#[allow(clippy::module_inception)]
mod classifier;
mod model;
mod rules;
mod svm;
mod utils;
mod vectorizer;
pub mod builder;
pub mod preprocess;

pub use error::ClassifierError;
pub use category::{get_category_description, Category, UNKNOWN_CATEGORY};
pub use classifier::{Classification, Classifier};
pub use model::{model_fingerprint, Prediction, TrainedModel, MODEL_FORMAT_VERSION};
pub use rules::{
    apply_overrides, OverrideRule, EXTREME_POSITIVE_PHRASES, NEGATIVE_OPENERS, NEGATIVE_PATTERNS,
    POSITIVE_WORDS,
};
pub use svm::LinearSvc;
pub use vectorizer::{SparseVector, TfIdfVectorizer};
pub use builder::ClassifierBuilder;

/// Information about the current state and configuration of a classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    /// Number of classes the model was trained on
    pub num_classes: usize,
    /// Labels of the classes, in label order
    pub class_labels: Vec<Category>,
    /// Size of the TF-IDF vocabulary
    pub num_features: usize,
    /// Fingerprint of the corpus and configuration behind the model
    pub fingerprint: String,
    /// Margin below which short texts fall back to neutral
    pub confidence_threshold: f64,
}
