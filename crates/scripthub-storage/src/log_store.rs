//! Per-analysis run-log store.

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use scripthub_core::error::{AppError, ErrorKind};
use scripthub_core::result::AppResult;

use crate::layout::StorageLayout;

/// Name of the log file run output is appended to.
const RUN_LOG_FILE: &str = "run.log";

/// Appends to and reads the `logs/*.log` files of an analysis.
///
/// Each operation opens, writes, and closes its file; no handle outlives a
/// call. Rollback clears these logs through the version store.
#[derive(Debug, Clone)]
pub struct LogStore {
    /// Storage paths.
    layout: StorageLayout,
}

impl LogStore {
    /// A log store over the given layout.
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// Append one entry (newline-terminated) to the analysis's run log.
    pub async fn append(&self, analysis_id: &str, entry: &str) -> AppResult<()> {
        let dir = self.layout.logs_dir(analysis_id);
        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create log directory: {}", dir.display()),
                e,
            )
        })?;
        let path = dir.join(RUN_LOG_FILE);
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to open run log: {}", path.display()),
                    e,
                )
            })?;
        file.write_all(entry.as_bytes()).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to append log entry", e)
        })?;
        if !entry.ends_with('\n') {
            file.write_all(b"\n").await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to append log entry", e)
            })?;
        }
        file.flush()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to flush run log", e))?;
        Ok(())
    }

    /// Concatenated content of all `*.log` files, sorted by file name.
    /// Empty if the analysis has no logs yet.
    pub async fn read_all(&self, analysis_id: &str) -> AppResult<String> {
        let dir = self.layout.logs_dir(analysis_id);
        let mut reader = match fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(String::new()),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to list log directory: {}", dir.display()),
                    e,
                ));
            }
        };

        let mut paths = Vec::new();
        while let Some(entry) = reader.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read log directory entry", e)
        })? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "log") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut combined = String::new();
        for path in paths {
            let content = fs::read_to_string(&path).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read log file: {}", path.display()),
                    e,
                )
            })?;
            combined.push_str(&content);
        }
        Ok(combined)
    }

    /// Remove all of the analysis's log files.
    pub async fn clear(&self, analysis_id: &str) -> AppResult<()> {
        let dir = self.layout.logs_dir(analysis_id);
        if fs::metadata(&dir).await.is_ok() {
            fs::remove_dir_all(&dir).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to clear logs: {}", dir.display()),
                    e,
                )
            })?;
        }
        debug!(analysis_id, "Cleared run logs");
        Ok(())
    }
}
