//! Team CRUD, analysis reassignment, and team-structure operations.

pub mod service;
pub mod structure;

pub use service::{
    AnalysisMove, CreateTeamRequest, DeleteTeamOutcome, TeamService, UpdateTeamRequest,
};
pub use structure::{
    CreateFolderRequest, DeleteFolderOutcome, MoveItemOutcome, UpdateFolderRequest,
};
