//! # scripthub-storage
//!
//! On-disk persistence for ScriptHub. Four stores share one
//! [`StorageLayout`]:
//!
//! - [`ConfigStore`] — the single JSON config document (analysis metadata
//!   and team trees), whole-document read-modify-write.
//! - [`VersionStore`] — per-analysis append-only version history with
//!   content dedup and rollback.
//! - [`EnvStore`] — the opaque per-analysis env-var blob.
//! - [`LogStore`] — per-analysis run logs.
//!
//! All stores are open-write-close per operation; no file handles are held
//! across calls.

pub mod config_store;
pub mod env_store;
pub mod layout;
pub mod log_store;
pub mod version_store;

pub use config_store::ConfigStore;
pub use env_store::EnvStore;
pub use layout::StorageLayout;
pub use log_store::LogStore;
pub use version_store::{RollbackOutcome, VersionStore};
