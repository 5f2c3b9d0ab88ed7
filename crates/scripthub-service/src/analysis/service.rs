//! Analysis lifecycle operations — upload, metadata updates, content
//! versioning, env blobs, and run logs.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use scripthub_core::error::AppError;
use scripthub_core::result::AppResult;
use scripthub_entity::analysis::{AnalysisRecord, AnalysisStatus};
use scripthub_entity::tree::{self, TreeItem};
use scripthub_entity::version::VersionDescriptor;
use scripthub_storage::{ConfigStore, EnvStore, LogStore, RollbackOutcome, VersionStore};

/// Request to upload a new analysis.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnalysisRequest {
    /// Display name.
    pub name: String,
    /// Initial script content; becomes version 1.
    pub content: String,
    /// Team to file the analysis under; its tree reference is added to the
    /// team's structure root.
    #[serde(default)]
    pub team_id: Option<String>,
}

/// Fields to update on an analysis record. At least one must be provided.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnalysisRequest {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the analysis may be started.
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Manages analysis records and their on-disk content.
///
/// The config document is the source of truth for metadata; content lives
/// in the per-analysis directory and is versioned through the version
/// store. Process lifecycle (running the script) is another component's
/// job — this service only snapshots content around changes.
#[derive(Debug, Clone)]
pub struct AnalysisService {
    /// The analyses config document store.
    config: Arc<ConfigStore>,
    /// Version history store.
    versions: VersionStore,
    /// Env blob store.
    env: EnvStore,
    /// Run-log store.
    logs: LogStore,
}

impl AnalysisService {
    /// Creates a new analysis service.
    pub fn new(
        config: Arc<ConfigStore>,
        versions: VersionStore,
        env: EnvStore,
        logs: LogStore,
    ) -> Self {
        Self {
            config,
            versions,
            env,
            logs,
        }
    }

    /// Upload a new analysis: allocates an id, saves the content as
    /// version 1, inserts the record, and adds the tree reference to the
    /// target team's structure root.
    pub async fn create_analysis(&self, req: CreateAnalysisRequest) -> AppResult<AnalysisRecord> {
        if req.name.trim().is_empty() {
            return Err(AppError::validation("Analysis name cannot be empty"));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let record = AnalysisRecord {
            id: id.clone(),
            name: req.name,
            team_id: req.team_id,
            enabled: true,
            status: AnalysisStatus::Stopped,
            path: format!("analyses/{id}"),
            created_at: now,
            updated_at: now,
        };

        self.versions.save_version(&id, &req.content).await?;

        let stored = record.clone();
        self.config
            .update(move |doc| {
                if let Some(team_id) = stored.team_id.clone() {
                    doc.structure_mut(&team_id)
                        .items
                        .push(TreeItem::analysis(stored.id.clone()));
                }
                doc.analyses.insert(stored.id.clone(), stored);
                Ok(())
            })
            .await?;

        info!(analysis_id = %record.id, name = %record.name, "Analysis created");
        Ok(record)
    }

    /// Look up an analysis record.
    pub async fn get_analysis(&self, analysis_id: &str) -> AppResult<AnalysisRecord> {
        let doc = self.config.get().await?;
        doc.analyses
            .get(analysis_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Analysis {analysis_id} not found")))
    }

    /// All analysis records, in config insertion order.
    pub async fn list_analyses(&self) -> AppResult<Vec<AnalysisRecord>> {
        let doc = self.config.get().await?;
        Ok(doc.analyses.values().cloned().collect())
    }

    /// Merge the provided fields into an analysis record.
    pub async fn update_analysis(
        &self,
        analysis_id: &str,
        req: UpdateAnalysisRequest,
    ) -> AppResult<AnalysisRecord> {
        if req.name.is_none() && req.enabled.is_none() {
            return Err(AppError::validation("No valid fields to update"));
        }

        let analysis_id_owned = analysis_id.to_string();
        let updated = self
            .config
            .update(move |doc| {
                let record = doc.analyses.get_mut(&analysis_id_owned).ok_or_else(|| {
                    AppError::not_found(format!("Analysis {analysis_id_owned} not found"))
                })?;
                if let Some(name) = req.name {
                    if name.trim().is_empty() {
                        return Err(AppError::validation("Analysis name cannot be empty"));
                    }
                    record.name = name;
                }
                if let Some(enabled) = req.enabled {
                    record.enabled = enabled;
                }
                record.updated_at = Utc::now();
                Ok(record.clone())
            })
            .await?;

        info!(analysis_id, "Analysis updated");
        Ok(updated)
    }

    /// Replace the analysis's content, recording a new version unless the
    /// content is unchanged.
    pub async fn update_content(
        &self,
        analysis_id: &str,
        content: &str,
    ) -> AppResult<VersionDescriptor> {
        self.get_analysis(analysis_id).await?;
        let descriptor = self.versions.save_version(analysis_id, content).await?;
        self.touch(analysis_id).await?;
        Ok(descriptor)
    }

    /// Live content (`version` `None` or `0`) or a named snapshot.
    pub async fn get_content(&self, analysis_id: &str, version: Option<u32>) -> AppResult<String> {
        self.get_analysis(analysis_id).await?;
        self.versions.get_content(analysis_id, version).await
    }

    /// All saved versions, ascending.
    pub async fn list_versions(&self, analysis_id: &str) -> AppResult<Vec<VersionDescriptor>> {
        self.get_analysis(analysis_id).await?;
        self.versions.list_versions(analysis_id).await
    }

    /// Revert the analysis to an earlier version. The overwritten live
    /// content is preserved as a new forward version and run logs start
    /// fresh.
    pub async fn rollback(
        &self,
        analysis_id: &str,
        target_version: u32,
    ) -> AppResult<RollbackOutcome> {
        self.get_analysis(analysis_id).await?;
        let outcome = self.versions.rollback(analysis_id, target_version).await?;
        self.touch(analysis_id).await?;
        Ok(outcome)
    }

    /// Delete an analysis: removes the record, splices its tree reference
    /// out of its team's structure, and deletes the on-disk directory.
    pub async fn delete_analysis(&self, analysis_id: &str) -> AppResult<()> {
        let analysis_id_owned = analysis_id.to_string();
        self.config
            .update(move |doc| {
                let record = doc.analyses.shift_remove(&analysis_id_owned).ok_or_else(|| {
                    AppError::not_found(format!("Analysis {analysis_id_owned} not found"))
                })?;
                if let Some(team_id) = record.team_id.as_deref() {
                    if let Some(structure) = doc.team_structure.get_mut(team_id) {
                        tree::take_item(&mut structure.items, &analysis_id_owned);
                    }
                }
                Ok(())
            })
            .await?;

        self.versions.delete_analysis_dir(analysis_id).await?;
        info!(analysis_id, "Analysis deleted");
        Ok(())
    }

    /// The analysis's opaque env blob; empty if none was written yet.
    pub async fn get_env(&self, analysis_id: &str) -> AppResult<String> {
        self.get_analysis(analysis_id).await?;
        self.env.read(analysis_id).await
    }

    /// Replace the analysis's env blob.
    pub async fn set_env(&self, analysis_id: &str, content: &str) -> AppResult<()> {
        self.get_analysis(analysis_id).await?;
        self.env.write(analysis_id, content).await?;
        self.touch(analysis_id).await
    }

    /// Accumulated run-log output.
    pub async fn read_logs(&self, analysis_id: &str) -> AppResult<String> {
        self.get_analysis(analysis_id).await?;
        self.logs.read_all(analysis_id).await
    }

    /// Append one entry to the analysis's run log.
    pub async fn append_log(&self, analysis_id: &str, entry: &str) -> AppResult<()> {
        self.logs.append(analysis_id, entry).await
    }

    /// Remove the analysis's run logs.
    pub async fn clear_logs(&self, analysis_id: &str) -> AppResult<()> {
        self.get_analysis(analysis_id).await?;
        self.logs.clear(analysis_id).await
    }

    async fn touch(&self, analysis_id: &str) -> AppResult<()> {
        let analysis_id_owned = analysis_id.to_string();
        self.config
            .update(move |doc| {
                if let Some(record) = doc.analyses.get_mut(&analysis_id_owned) {
                    record.updated_at = Utc::now();
                }
                Ok(())
            })
            .await
    }
}
