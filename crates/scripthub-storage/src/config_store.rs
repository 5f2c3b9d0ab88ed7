//! The analyses config document store.

use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use scripthub_core::error::{AppError, ErrorKind};
use scripthub_core::result::AppResult;
use scripthub_entity::document::AnalysesConfig;

use crate::layout::StorageLayout;

/// Owns the single JSON document that is the source of truth for analysis
/// metadata and the team/folder trees.
///
/// Every mutation is read-modify-write of the whole document: load, apply
/// the change, persist back. An in-process mutex serializes update cycles so
/// that interleaved service calls behave as if serialized per document; no
/// cross-process locking is provided.
#[derive(Debug)]
pub struct ConfigStore {
    /// Storage paths.
    layout: StorageLayout,
    /// Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl ConfigStore {
    /// A config store over the given layout. The backing file is not
    /// touched until [`initialize`](Self::initialize) runs.
    pub fn new(layout: StorageLayout) -> Self {
        Self {
            layout,
            lock: Mutex::new(()),
        }
    }

    /// The layout this store resolves paths through.
    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Create the storage tree and write a fresh, empty config document if
    /// none exists yet. Idempotent: an existing document is left untouched.
    pub async fn initialize(&self) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        fs::create_dir_all(self.layout.config_dir()).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!(
                    "Failed to create config directory: {}",
                    self.layout.config_dir().display()
                ),
                e,
            )
        })?;
        fs::create_dir_all(self.layout.analyses_dir()).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!(
                    "Failed to create analyses directory: {}",
                    self.layout.analyses_dir().display()
                ),
                e,
            )
        })?;

        if fs::metadata(self.layout.config_file()).await.is_err() {
            self.write(&AnalysesConfig::new()).await?;
            info!(
                path = %self.layout.config_file().display(),
                "Initialized analyses config document"
            );
        }
        Ok(())
    }

    /// The current config document.
    ///
    /// Fails with a not-found error if the document is absent, i.e. before
    /// [`initialize`](Self::initialize) has run.
    pub async fn get(&self) -> AppResult<AnalysesConfig> {
        self.read().await
    }

    /// Read-modify-write the config document as one unit: load the current
    /// document, apply `mutate`, persist the whole document back, and return
    /// the mutator's result. If the mutator fails, nothing is written.
    pub async fn update<R>(
        &self,
        mutate: impl FnOnce(&mut AnalysesConfig) -> AppResult<R>,
    ) -> AppResult<R> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await?;
        let result = mutate(&mut doc)?;
        self.write(&doc).await?;
        Ok(result)
    }

    async fn read(&self) -> AppResult<AnalysesConfig> {
        let path = self.layout.config_file();
        let data = fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found("Analyses config not initialized")
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read config document: {}", path.display()),
                    e,
                )
            }
        })?;
        serde_json::from_str(&data).map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Corrupt config document: {}", path.display()),
                e,
            )
        })
    }

    async fn write(&self, doc: &AnalysesConfig) -> AppResult<()> {
        let path = self.layout.config_file();
        let data = serde_json::to_string_pretty(doc)?;
        fs::write(&path, data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write config document: {}", path.display()),
                e,
            )
        })?;
        debug!(path = %path.display(), "Wrote config document");
        Ok(())
    }
}
