//! # scripthub-directory
//!
//! The narrow interface to the external team-membership authority, plus the
//! backends that implement it. ScriptHub trusts this authority for team and
//! organization persistence; everything else in the system only sees the
//! [`TeamDirectory`] trait.
//!
//! Two backends are provided:
//! - [`LocalTeamDirectory`] — a JSON file on disk (the embedded directory
//!   database used by single-node deployments).
//! - [`MemoryTeamDirectory`] — in-memory, used by tests and embeddings; can
//!   simulate an authority outage.

pub mod local;
pub mod memory;

use async_trait::async_trait;

use scripthub_core::result::AppResult;
use scripthub_entity::team::{Organization, Team};

pub use local::LocalTeamDirectory;
pub use memory::MemoryTeamDirectory;

/// Read/write access to the organization and team records of the external
/// membership authority.
///
/// Implementations own persistence and atomicity of individual calls; they
/// do not enforce ScriptHub's domain rules (name uniqueness, system-team
/// protection, order renumbering) — those live in the team service.
#[async_trait]
pub trait TeamDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// All known organizations.
    async fn list_organizations(&self) -> AppResult<Vec<Organization>>;

    /// All teams of one organization, in storage order.
    async fn list_teams(&self, organization_id: &str) -> AppResult<Vec<Team>>;

    /// Look up a team by id across organizations.
    async fn find_team(&self, team_id: &str) -> AppResult<Option<Team>>;

    /// Persist a new team record.
    async fn insert_team(&self, team: &Team) -> AppResult<()>;

    /// Replace an existing team record, matched by id.
    async fn update_team(&self, team: &Team) -> AppResult<()>;

    /// Remove a team record, keyed by `{team_id, organization_id}`.
    async fn remove_team(&self, team_id: &str, organization_id: &str) -> AppResult<()>;
}
