//! Per-analysis version history: save with dedup, list, rollback, content
//! reads.

use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info};

use scripthub_core::error::{AppError, ErrorKind};
use scripthub_core::result::AppResult;
use scripthub_entity::version::{VersionDescriptor, VersionMetadata};

use crate::layout::StorageLayout;

/// Result of a rollback.
#[derive(Debug, Clone)]
pub struct RollbackOutcome {
    /// The version whose content is now live.
    pub restored_version: u32,
    /// Descriptor of the forward version created to preserve the
    /// pre-rollback live content, if it differed from the target.
    pub preserved: Option<VersionDescriptor>,
}

/// Content fingerprint used for the duplicate check: byte length plus
/// SHA-256 digest.
#[derive(Debug, PartialEq, Eq)]
struct Fingerprint {
    size: u64,
    digest: [u8; 32],
}

fn fingerprint(content: &str) -> Fingerprint {
    Fingerprint {
        size: content.len() as u64,
        digest: Sha256::digest(content.as_bytes()).into(),
    }
}

/// Append-only version history for one analysis at a time.
///
/// Each analysis owns a `versions/` directory with immutable `v<N>.js`
/// snapshots and a `metadata.json` listing them. Version numbers start at 1
/// and strictly increase; rollback creates a new forward version instead of
/// rewinding the counter. The snapshot file is always written before the
/// metadata commit, so a crash mid-save loses only the attempted version,
/// never existing history.
#[derive(Debug, Clone)]
pub struct VersionStore {
    /// Storage paths.
    layout: StorageLayout,
}

impl VersionStore {
    /// A version store over the given layout.
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// Save `content` as a new version and make it live.
    ///
    /// If `content` is byte-identical to the current version's snapshot the
    /// call is a no-op returning the existing descriptor: no new version is
    /// allocated and nothing is written. Only the immediately preceding
    /// version is consulted, not the full history.
    pub async fn save_version(
        &self,
        analysis_id: &str,
        content: &str,
    ) -> AppResult<VersionDescriptor> {
        self.ensure_dirs(analysis_id).await?;
        let mut meta = self.read_metadata(analysis_id).await?;

        if let Some(current) = meta.current_descriptor().cloned() {
            let current_path = self.layout.version_file(analysis_id, current.version);
            if let Ok(existing) = fs::read_to_string(&current_path).await {
                if fingerprint(&existing) == fingerprint(content) {
                    debug!(
                        analysis_id,
                        version = current.version,
                        "Content unchanged, skipping version save"
                    );
                    return Ok(current);
                }
            }
        }

        let descriptor = self.commit_version(analysis_id, &mut meta, content).await?;
        self.write_live(analysis_id, content).await?;

        info!(
            analysis_id,
            version = descriptor.version,
            size = descriptor.size,
            "Saved new version"
        );
        Ok(descriptor)
    }

    /// All saved versions, ordered by version number ascending.
    pub async fn list_versions(&self, analysis_id: &str) -> AppResult<Vec<VersionDescriptor>> {
        let mut versions = self.read_metadata(analysis_id).await?.versions;
        versions.sort_by_key(|d| d.version);
        Ok(versions)
    }

    /// Revert live content to `target_version`.
    ///
    /// The pre-rollback live content is first preserved as a new forward
    /// version when it differs from the target, so a rollback never loses
    /// the most recent edit. The target snapshot is then copied into the
    /// live file, `currentVersion` is set to the target, and the analysis's
    /// accumulated run logs are cleared.
    pub async fn rollback(
        &self,
        analysis_id: &str,
        target_version: u32,
    ) -> AppResult<RollbackOutcome> {
        let mut meta = self.read_metadata(analysis_id).await?;

        let target_path = self.layout.version_file(analysis_id, target_version);
        let target_content = fs::read_to_string(&target_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::version_not_found(format!(
                    "Version {target_version} not found for analysis {analysis_id}"
                ))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read version snapshot: {}", target_path.display()),
                    e,
                )
            }
        })?;

        let live = fs::read_to_string(self.layout.live_script(analysis_id))
            .await
            .ok();

        // Preserve the live content as a new forward version. The duplicate
        // check here is against the rollback target only, never the current
        // snapshot.
        let mut preserved = None;
        if let Some(live_content) = live {
            if live_content != target_content {
                let descriptor = self
                    .commit_version(analysis_id, &mut meta, &live_content)
                    .await?;
                preserved = Some(descriptor);
            }
        }

        self.write_live(analysis_id, &target_content).await?;
        meta.current_version = target_version;
        self.write_metadata(analysis_id, &meta).await?;

        self.clear_logs(analysis_id).await?;

        info!(
            analysis_id,
            target_version,
            preserved = preserved.as_ref().map(|d| d.version),
            "Rolled back analysis"
        );
        Ok(RollbackOutcome {
            restored_version: target_version,
            preserved,
        })
    }

    /// Content of the live file (`version` `None` or `0`) or of a named
    /// snapshot.
    pub async fn get_content(
        &self,
        analysis_id: &str,
        version: Option<u32>,
    ) -> AppResult<String> {
        match version {
            None | Some(0) => fs::read_to_string(self.layout.live_script(analysis_id))
                .await
                .map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        AppError::not_found(format!("Analysis {analysis_id} has no content"))
                    } else {
                        AppError::with_source(
                            ErrorKind::Storage,
                            format!("Failed to read live content of analysis {analysis_id}"),
                            e,
                        )
                    }
                }),
            Some(v) => fs::read_to_string(self.layout.version_file(analysis_id, v))
                .await
                .map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        AppError::version_not_found(format!(
                            "Version {v} not found for analysis {analysis_id}"
                        ))
                    } else {
                        AppError::with_source(
                            ErrorKind::Storage,
                            format!("Failed to read version {v} of analysis {analysis_id}"),
                            e,
                        )
                    }
                }),
        }
    }

    /// Remove the analysis's run logs, leaving an empty log directory.
    pub async fn clear_logs(&self, analysis_id: &str) -> AppResult<()> {
        let logs = self.layout.logs_dir(analysis_id);
        if fs::metadata(&logs).await.is_ok() {
            fs::remove_dir_all(&logs).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to clear logs: {}", logs.display()),
                    e,
                )
            })?;
        }
        fs::create_dir_all(&logs).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to recreate log directory: {}", logs.display()),
                e,
            )
        })?;
        debug!(analysis_id, "Cleared run logs");
        Ok(())
    }

    /// Remove the analysis's entire on-disk directory: live content,
    /// versions, env blob, and logs. Used by the deletion cascade.
    pub async fn delete_analysis_dir(&self, analysis_id: &str) -> AppResult<()> {
        let dir = self.layout.analysis_dir(analysis_id);
        if fs::metadata(&dir).await.is_ok() {
            fs::remove_dir_all(&dir).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete analysis directory: {}", dir.display()),
                    e,
                )
            })?;
        }
        info!(analysis_id, "Deleted analysis directory");
        Ok(())
    }

    /// Allocate the next version number, write its snapshot, then commit the
    /// metadata recording it as current. Snapshot first: the metadata update
    /// is never persisted before the snapshot write succeeds.
    async fn commit_version(
        &self,
        analysis_id: &str,
        meta: &mut VersionMetadata,
        content: &str,
    ) -> AppResult<VersionDescriptor> {
        self.ensure_dirs(analysis_id).await?;
        let version = meta.next_version_number;
        let snapshot = self.layout.version_file(analysis_id, version);
        fs::write(&snapshot, content).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write version snapshot: {}", snapshot.display()),
                e,
            )
        })?;

        let descriptor = VersionDescriptor {
            version,
            timestamp: Utc::now(),
            size: content.len() as u64,
        };
        meta.versions.push(descriptor.clone());
        meta.current_version = version;
        meta.next_version_number = version + 1;
        self.write_metadata(analysis_id, meta).await?;
        Ok(descriptor)
    }

    async fn ensure_dirs(&self, analysis_id: &str) -> AppResult<()> {
        let versions = self.layout.versions_dir(analysis_id);
        fs::create_dir_all(&versions).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create version directory: {}", versions.display()),
                e,
            )
        })?;
        Ok(())
    }

    async fn write_live(&self, analysis_id: &str, content: &str) -> AppResult<()> {
        let live = self.layout.live_script(analysis_id);
        fs::write(&live, content).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write live content: {}", live.display()),
                e,
            )
        })?;
        Ok(())
    }

    async fn read_metadata(&self, analysis_id: &str) -> AppResult<VersionMetadata> {
        let path = self.layout.version_metadata_file(analysis_id);
        match fs::read_to_string(&path).await {
            Ok(data) => serde_json::from_str(&data).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Serialization,
                    format!("Corrupt version metadata: {}", path.display()),
                    e,
                )
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(VersionMetadata::empty()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read version metadata: {}", path.display()),
                e,
            )),
        }
    }

    async fn write_metadata(&self, analysis_id: &str, meta: &VersionMetadata) -> AppResult<()> {
        let path = self.layout.version_metadata_file(analysis_id);
        let data = serde_json::to_string_pretty(meta)?;
        fs::write(&path, data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write version metadata: {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }
}
