use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};

use super::classifier::Classifier;
use super::error::ClassifierError;
use super::model::{model_fingerprint, TrainedModel};
use crate::config::TrainingConfig;
use crate::corpus::Corpus;
use crate::model_cache::ModelCache;

/// Where the builder looks for, and stores, a trained model.
#[derive(Debug, Clone, Default)]
enum CacheLocation {
    /// The platform cache directory, see [`ModelCache::get_default_models_dir`]
    #[default]
    Default,
    Dir(PathBuf),
    /// Train in memory and never touch the disk
    Disabled,
}

/// A builder for constructing a Classifier with a fluent interface.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use amygdala::{Classifier, Corpus, TrainingConfig};
///
/// let classifier = Classifier::builder()
///     .with_corpus(Corpus::builtin())
///     .with_config(TrainingConfig::default().with_c(0.5))
///     .with_cache_dir("/tmp/amygdala/models")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ClassifierBuilder {
    corpus: Option<Corpus>,
    config: TrainingConfig,
    cache: CacheLocation,
    fresh: bool,
}

impl ClassifierBuilder {
    /// Creates a builder that will use the built-in corpus, the default
    /// configuration and the default cache directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the examples to train on
    pub fn with_corpus(mut self, corpus: Corpus) -> Self {
        self.corpus = Some(corpus);
        self
    }

    /// Sets the training hyper-parameters and the confidence threshold
    pub fn with_config(mut self, config: TrainingConfig) -> Self {
        self.config = config;
        self
    }

    /// Stores the cached model under `dir` instead of the default location
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache = CacheLocation::Dir(dir.into());
        self
    }

    /// Never reads or writes a cached model
    pub fn without_cache(mut self) -> Self {
        self.cache = CacheLocation::Disabled;
        self
    }

    /// Ignores any cached model and retrains, overwriting the cache
    pub fn fresh(mut self, fresh: bool) -> Self {
        self.fresh = fresh;
        self
    }

    /// Loads a matching cached model or trains a new one.
    ///
    /// A cached model trained from a different corpus or configuration, or one
    /// that cannot be decoded, is discarded and replaced.
    pub fn build(self) -> Result<Classifier, ClassifierError> {
        self.config.validate().map_err(ClassifierError::ValidationError)?;
        let corpus = self.corpus.unwrap_or_else(Corpus::builtin);

        let cache = match &self.cache {
            CacheLocation::Default => Some(ModelCache::new_default()),
            CacheLocation::Dir(dir) => Some(ModelCache::new(dir)),
            CacheLocation::Disabled => None,
        };
        // An unusable cache directory only costs us the shortcut.
        let cache = match cache {
            Some(Ok(cache)) => {
                info!("Using model cache in {:?}", cache.models_dir());
                Some(cache)
            }
            Some(Err(e)) => {
                warn!("Model cache unavailable ({}), training in memory", e);
                None
            }
            None => None,
        };

        let model = match &cache {
            Some(cache) => Self::load_or_train(cache, &corpus, &self.config, self.fresh)?,
            None => TrainedModel::train(&corpus, &self.config)?,
        };

        Ok(Classifier::new(Arc::new(model), self.config))
    }

    fn load_or_train(
        cache: &ModelCache,
        corpus: &Corpus,
        config: &TrainingConfig,
        fresh: bool,
    ) -> Result<TrainedModel, ClassifierError> {
        let fingerprint = model_fingerprint(corpus, config);

        if fresh {
            info!("Fresh model requested - ignoring any cached model");
        } else {
            match cache.load_verified(&fingerprint) {
                Ok(Some(model)) => {
                    info!("Loaded cached model from {:?}", cache.get_model_path());
                    return Ok(model);
                }
                Ok(None) => info!("No cached model, training..."),
                Err(e) => warn!("Cached model unusable ({}), retraining", e),
            }
        }

        let model = TrainedModel::train(corpus, config)?;
        match cache.save(&model) {
            Ok(path) => info!("Cached model at {:?}", path),
            // The model is still usable; only the shortcut is lost.
            Err(e) => warn!("Failed to cache model: {}", e),
        }
        Ok(model)
    }
}
