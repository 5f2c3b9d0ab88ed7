//! In-memory team directory.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use scripthub_core::error::AppError;
use scripthub_core::result::AppResult;
use scripthub_entity::team::{Organization, Team};

use crate::TeamDirectory;

#[derive(Debug, Default)]
struct State {
    organizations: Vec<Organization>,
    teams: Vec<Team>,
}

/// A [`TeamDirectory`] held entirely in memory.
///
/// Used by tests and by embeddings that do not need a persistent directory.
/// `set_failing(true)` makes every call return an error, simulating an
/// authority outage.
#[derive(Debug, Default)]
pub struct MemoryTeamDirectory {
    state: Mutex<State>,
    failing: AtomicBool,
}

impl MemoryTeamDirectory {
    /// An empty directory with no organizations.
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory seeded with one organization of the given name.
    pub async fn with_organization(name: &str) -> (Self, Organization) {
        let directory = Self::new();
        let organization = Organization {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        directory
            .state
            .lock()
            .await
            .organizations
            .push(organization.clone());
        (directory, organization)
    }

    /// Toggle outage simulation: while set, every call fails.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::upstream("Team authority is unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl TeamDirectory for MemoryTeamDirectory {
    async fn list_organizations(&self) -> AppResult<Vec<Organization>> {
        self.check_available()?;
        Ok(self.state.lock().await.organizations.clone())
    }

    async fn list_teams(&self, organization_id: &str) -> AppResult<Vec<Team>> {
        self.check_available()?;
        Ok(self
            .state
            .lock()
            .await
            .teams
            .iter()
            .filter(|t| t.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn find_team(&self, team_id: &str) -> AppResult<Option<Team>> {
        self.check_available()?;
        Ok(self
            .state
            .lock()
            .await
            .teams
            .iter()
            .find(|t| t.id == team_id)
            .cloned())
    }

    async fn insert_team(&self, team: &Team) -> AppResult<()> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        if state.teams.iter().any(|t| t.id == team.id) {
            return Err(AppError::conflict(format!(
                "Team {} already exists in the directory",
                team.id
            )));
        }
        state.teams.push(team.clone());
        Ok(())
    }

    async fn update_team(&self, team: &Team) -> AppResult<()> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let slot = state
            .teams
            .iter_mut()
            .find(|t| t.id == team.id)
            .ok_or_else(|| AppError::not_found(format!("Team {} not found", team.id)))?;
        *slot = team.clone();
        Ok(())
    }

    async fn remove_team(&self, team_id: &str, organization_id: &str) -> AppResult<()> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let before = state.teams.len();
        state
            .teams
            .retain(|t| !(t.id == team_id && t.organization_id == organization_id));
        if state.teams.len() == before {
            return Err(AppError::not_found(format!("Team {team_id} not found")));
        }
        Ok(())
    }
}
