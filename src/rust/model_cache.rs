use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::classifier::{TrainedModel, MODEL_FORMAT_VERSION};

/// File name of the serialized model inside the models directory.
pub const MODEL_FILE_NAME: &str = "model.bin";

/// Keeps temp file names distinct between saves within one process.
static SAVE_COUNTER: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    #[error("Fingerprint mismatch: expected {expected}, got {actual}")]
    FingerprintMismatch { expected: String, actual: String },
    #[error("Model format version {found} is not supported (expected {expected})")]
    VersionMismatch { expected: u32, found: u32 },
}

/// On-disk cache for a single trained model.
///
/// The cache is purely a performance shortcut: a missing, stale or
/// unreadable file is reported to the caller, who retrains.
#[derive(Debug, Clone)]
pub struct ModelCache {
    models_dir: PathBuf,
}

impl ModelCache {
    /// Creates a new ModelCache in the default models directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_models_dir())
    }

    /// Returns the default models directory path
    pub fn get_default_models_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("AMYGDALA_CACHE") {
            return PathBuf::from(path).join("models");
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("amygdala").join("models");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("amygdala").join("models");
        }

        // 4. If all else fails, use system temp directory (platform agnostic)
        env::temp_dir().join("amygdala").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self { models_dir })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn get_model_path(&self) -> PathBuf {
        self.models_dir.join(MODEL_FILE_NAME)
    }

    pub fn is_cached(&self) -> bool {
        let model_path = self.get_model_path();
        log::debug!("Model path: {:?} (exists: {})", model_path, model_path.exists());
        model_path.exists()
    }

    /// Serializes the model and moves it into place with a rename, so readers
    /// never observe a half-written file.
    pub fn save(&self, model: &TrainedModel) -> Result<PathBuf, CacheError> {
        let model_path = self.get_model_path();
        let tmp_path = self
            .models_dir
            .join(format!(
                "{}.{}.{}.tmp",
                MODEL_FILE_NAME,
                std::process::id(),
                SAVE_COUNTER.fetch_add(1, Ordering::Relaxed)
            ));

        let bytes = bincode::serialize(model)?;
        log::info!("Writing {} bytes to {:?}", bytes.len(), model_path);

        fs::create_dir_all(&self.models_dir)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        drop(file);

        if let Err(e) = fs::rename(&tmp_path, &model_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(model_path)
    }

    /// Reads the cached model. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<TrainedModel>, CacheError> {
        let model_path = self.get_model_path();
        let bytes = match fs::read(&model_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No cached model at {:?}", model_path);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        log::info!("Read {} bytes from {:?}", bytes.len(), model_path);

        let model: TrainedModel = bincode::deserialize(&bytes)?;
        if model.format_version != MODEL_FORMAT_VERSION {
            return Err(CacheError::VersionMismatch {
                expected: MODEL_FORMAT_VERSION,
                found: model.format_version,
            });
        }
        Ok(Some(model))
    }

    /// Loads the cached model only if it was trained from `expected_fingerprint`.
    pub fn load_verified(&self, expected_fingerprint: &str) -> Result<Option<TrainedModel>, CacheError> {
        match self.load()? {
            Some(model) if model.fingerprint != expected_fingerprint => {
                Err(CacheError::FingerprintMismatch {
                    expected: expected_fingerprint.to_string(),
                    actual: model.fingerprint,
                })
            }
            other => Ok(other),
        }
    }

    pub fn remove(&self) -> Result<(), CacheError> {
        let model_path = self.get_model_path();
        if model_path.exists() {
            log::info!("Removing cached model at {:?}", model_path);
            fs::remove_file(&model_path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_models_dir() {
        // Test with environment variable
        env::set_var("AMYGDALA_CACHE", "/tmp/test-amygdala-cache");
        let path = ModelCache::get_default_models_dir();
        assert!(path.to_str().unwrap().contains("/tmp/test-amygdala-cache/models"));
        env::remove_var("AMYGDALA_CACHE");

        // Test without environment variable
        let path = ModelCache::get_default_models_dir();
        assert!(path.to_str().unwrap().contains("amygdala"));
    }

    #[test]
    fn test_missing_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ModelCache::new(dir.path().join("models")).unwrap();
        assert!(!cache.is_cached());
        assert!(cache.load().unwrap().is_none());
        assert!(cache.remove().is_ok());
    }

    #[test]
    fn test_garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ModelCache::new(dir.path()).unwrap();
        fs::write(cache.get_model_path(), b"corrupted data").unwrap();
        assert!(cache.is_cached());
        assert!(cache.load().is_err());
    }
}
