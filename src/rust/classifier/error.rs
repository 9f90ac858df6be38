use thiserror::Error;

use crate::corpus::CorpusError;
use crate::model_cache::CacheError;

/// Represents the different types of errors that can occur in the text classifier.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Error occurred due to invalid input parameters
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Error occurred while fitting the vectorizer or the linear model
    #[error("Training error: {0}")]
    TrainingError(String),
    /// Error occurred while using a trained model
    #[error("Model error: {0}")]
    ModelError(String),
    /// Error occurred while making predictions
    #[error("Prediction error: {0}")]
    PredictionError(String),
    /// Error occurred while reading or writing the cached model
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
    /// Error occurred while loading the example corpus
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),
}
