//! Version descriptors and per-analysis version metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata entry recording one immutable historical snapshot of an
/// analysis's content. The snapshot bytes live in a sibling `v<N>.js` file;
/// once written, neither is ever mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDescriptor {
    /// Sequential version number, starting at 1 per analysis.
    pub version: u32,
    /// When the version was saved.
    pub timestamp: DateTime<Utc>,
    /// Snapshot size in bytes.
    pub size: u64,
}

/// The `versions/metadata.json` document of one analysis.
///
/// `versions` is append-only and ordered by version number ascending.
/// `current_version` always equals the version whose content is currently
/// copied into the live `index.js` (0 before the first save).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionMetadata {
    /// Ordered list of saved version descriptors.
    pub versions: Vec<VersionDescriptor>,
    /// The next version number to allocate. Strictly increasing, never
    /// rewound — rollback creates a new forward version.
    pub next_version_number: u32,
    /// The version currently live in `index.js`.
    pub current_version: u32,
}

impl VersionMetadata {
    /// Metadata for an analysis with no saved versions yet.
    pub fn empty() -> Self {
        Self {
            versions: Vec::new(),
            next_version_number: 1,
            current_version: 0,
        }
    }

    /// Look up the descriptor for a version number.
    pub fn descriptor(&self, version: u32) -> Option<&VersionDescriptor> {
        self.versions.iter().find(|d| d.version == version)
    }

    /// Descriptor of the current live version, if any.
    pub fn current_descriptor(&self) -> Option<&VersionDescriptor> {
        self.descriptor(self.current_version)
    }
}
