//! Storage path configuration.

use serde::{Deserialize, Serialize};

/// On-disk storage configuration.
///
/// All persisted state lives under `data_root`:
///
/// ```text
/// config/analyses-config.json        # analyses config document
/// analyses/<analysisId>/index.js     # live script content
/// analyses/<analysisId>/logs/        # run logs
/// analyses/<analysisId>/env/.env     # env-var blob
/// analyses/<analysisId>/versions/    # version snapshots + metadata
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for all runtime data.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// File name of the team directory database, relative to `data_root`.
    #[serde(default = "default_directory_file")]
    pub directory_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            directory_file: default_directory_file(),
        }
    }
}

fn default_data_root() -> String {
    "./data".to_string()
}

fn default_directory_file() -> String {
    "config/teams.json".to_string()
}
