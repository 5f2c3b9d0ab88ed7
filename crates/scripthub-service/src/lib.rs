//! # scripthub-service
//!
//! Business logic service layer for ScriptHub. Each service orchestrates
//! the config store, version store, and team directory to implement
//! application-level use cases.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references. The pure tree algorithms the
//! team service builds on are re-exported as [`tree`].

pub mod analysis;
pub mod team;

pub use analysis::{AnalysisService, CreateAnalysisRequest, UpdateAnalysisRequest};
pub use team::{
    AnalysisMove, CreateFolderRequest, CreateTeamRequest, DeleteFolderOutcome, DeleteTeamOutcome,
    MoveItemOutcome, TeamService, UpdateFolderRequest, UpdateTeamRequest,
};

pub use scripthub_entity::tree;
