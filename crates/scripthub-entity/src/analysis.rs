//! Analysis record entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Execution status of an analysis script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    /// The script is not running.
    Stopped,
    /// The script's child process is currently running.
    Running,
    /// The last run terminated with an error.
    Error,
}

/// Metadata record for one user-authored analysis script.
///
/// Stored in the `analyses` map of the config document, keyed by [`id`].
/// The `id` is immutable once assigned; display `name` may change freely.
///
/// [`id`]: AnalysisRecord::id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    /// Stable unique identifier, independent of the display name.
    pub id: String,
    /// Display name.
    pub name: String,
    /// The team this analysis belongs to. Must reference an existing team
    /// or the sentinel "uncategorized" team; absent only for legacy records
    /// created before teams existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    /// Whether the analysis may be started.
    pub enabled: bool,
    /// Current execution status.
    pub status: AnalysisStatus,
    /// Directory of the analysis relative to the storage root.
    pub path: String,
    /// When the analysis was uploaded.
    pub created_at: DateTime<Utc>,
    /// When the record or content was last modified.
    pub updated_at: DateTime<Utc>,
}
