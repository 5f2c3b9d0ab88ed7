//! Per-analysis env-var blob store.

use tokio::fs;
use tracing::debug;

use scripthub_core::error::{AppError, ErrorKind};
use scripthub_core::result::AppResult;

use crate::layout::StorageLayout;

/// Reads and writes the opaque `env/.env` blob of an analysis.
///
/// The content is treated as an uninterpreted string of `KEY=value` lines;
/// parsing and encryption belong to other layers.
#[derive(Debug, Clone)]
pub struct EnvStore {
    /// Storage paths.
    layout: StorageLayout,
}

impl EnvStore {
    /// An env store over the given layout.
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// The analysis's env blob, or an empty string if none was written yet.
    pub async fn read(&self, analysis_id: &str) -> AppResult<String> {
        let path = self.layout.env_file(analysis_id);
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read env blob: {}", path.display()),
                e,
            )),
        }
    }

    /// Replace the analysis's env blob.
    pub async fn write(&self, analysis_id: &str, content: &str) -> AppResult<()> {
        let path = self.layout.env_file(analysis_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create env directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        fs::write(&path, content).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write env blob: {}", path.display()),
                e,
            )
        })?;
        debug!(analysis_id, bytes = content.len(), "Wrote env blob");
        Ok(())
    }
}
