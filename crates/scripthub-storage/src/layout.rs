//! Path resolution for the on-disk storage tree.

use std::path::{Path, PathBuf};

/// Resolves every persisted path relative to one storage root:
///
/// ```text
/// config/analyses-config.json        # config document
/// analyses/<analysisId>/index.js     # live content
/// analyses/<analysisId>/logs/*.log   # run logs
/// analyses/<analysisId>/env/.env     # env-var blob
/// analyses/<analysisId>/versions/metadata.json
/// analyses/<analysisId>/versions/v<N>.js
/// ```
#[derive(Debug, Clone)]
pub struct StorageLayout {
    /// Root directory for all runtime data.
    root: PathBuf,
}

impl StorageLayout {
    /// A layout rooted at the given data directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the config document.
    pub fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    /// The analyses config document.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join("analyses-config.json")
    }

    /// Directory holding all per-analysis directories.
    pub fn analyses_dir(&self) -> PathBuf {
        self.root.join("analyses")
    }

    /// One analysis's directory.
    pub fn analysis_dir(&self, analysis_id: &str) -> PathBuf {
        self.analyses_dir().join(analysis_id)
    }

    /// The live script content.
    pub fn live_script(&self, analysis_id: &str) -> PathBuf {
        self.analysis_dir(analysis_id).join("index.js")
    }

    /// The run-log directory.
    pub fn logs_dir(&self, analysis_id: &str) -> PathBuf {
        self.analysis_dir(analysis_id).join("logs")
    }

    /// The env-var blob file.
    pub fn env_file(&self, analysis_id: &str) -> PathBuf {
        self.analysis_dir(analysis_id).join("env").join(".env")
    }

    /// The version snapshot directory.
    pub fn versions_dir(&self, analysis_id: &str) -> PathBuf {
        self.analysis_dir(analysis_id).join("versions")
    }

    /// The version metadata document.
    pub fn version_metadata_file(&self, analysis_id: &str) -> PathBuf {
        self.versions_dir(analysis_id).join("metadata.json")
    }

    /// One immutable version snapshot.
    pub fn version_file(&self, analysis_id: &str, version: u32) -> PathBuf {
        self.versions_dir(analysis_id).join(format!("v{version}.js"))
    }
}
