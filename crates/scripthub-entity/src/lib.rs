//! # scripthub-entity
//!
//! Domain entity models for ScriptHub. Every struct in this crate represents
//! either an entry in the persisted analyses config document, a record in the
//! external team directory, or a value object of the version store. All
//! entities derive `Debug`, `Clone`, `Serialize`, and `Deserialize`, and
//! serialize with the camelCase field names of the on-disk JSON documents.

pub mod analysis;
pub mod document;
pub mod team;
pub mod tree;
pub mod version;

pub use analysis::{AnalysisRecord, AnalysisStatus};
pub use document::{AnalysesConfig, TeamStructure, CONFIG_DOCUMENT_VERSION};
pub use team::{Organization, Team, UNCATEGORIZED_TEAM_ID};
pub use tree::TreeItem;
pub use version::{VersionDescriptor, VersionMetadata};
