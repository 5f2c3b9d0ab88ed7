//! The analyses config document — source of truth for analysis metadata
//! and the per-team folder trees.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisRecord;
use crate::tree::TreeItem;

/// Schema version written into new config documents.
pub const CONFIG_DOCUMENT_VERSION: &str = "5.0";

/// Root-level storage for one team's folder hierarchy.
///
/// `items` is a plain ordered sequence, not wrapped in an implicit folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamStructure {
    /// Root items of the team's tree.
    #[serde(default)]
    pub items: Vec<TreeItem>,
}

/// The whole `analyses-config.json` document.
///
/// Both maps use insertion-ordered storage so that re-serializing the
/// document preserves the order entries were added in, and team-scoped
/// analysis queries return results in config insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysesConfig {
    /// Document schema version.
    pub version: String,
    /// All analysis records, keyed by analysis id.
    #[serde(default)]
    pub analyses: IndexMap<String, AnalysisRecord>,
    /// Folder trees, keyed by team id. A team gains an entry lazily on its
    /// first item.
    #[serde(default)]
    pub team_structure: IndexMap<String, TeamStructure>,
}

impl AnalysesConfig {
    /// A fresh, empty document at the current schema version.
    pub fn new() -> Self {
        Self {
            version: CONFIG_DOCUMENT_VERSION.to_string(),
            analyses: IndexMap::new(),
            team_structure: IndexMap::new(),
        }
    }

    /// The structure for a team, creating an empty one if the team has
    /// none yet.
    pub fn structure_mut(&mut self, team_id: &str) -> &mut TeamStructure {
        self.team_structure
            .entry(team_id.to_string())
            .or_default()
    }
}

impl Default for AnalysesConfig {
    fn default() -> Self {
        Self::new()
    }
}
