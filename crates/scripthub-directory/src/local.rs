//! JSON-file-backed team directory.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use scripthub_core::error::{AppError, ErrorKind};
use scripthub_core::result::AppResult;
use scripthub_entity::team::{Organization, Team};

use crate::TeamDirectory;

/// On-disk shape of the directory database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DirectoryDocument {
    /// All organizations.
    #[serde(default)]
    organizations: Vec<Organization>,
    /// All teams, across organizations.
    #[serde(default)]
    teams: Vec<Team>,
}

/// A [`TeamDirectory`] persisted as a single JSON file.
///
/// Every call is read-modify-write of the whole document under an
/// in-process mutex; single-node deployments only.
#[derive(Debug)]
pub struct LocalTeamDirectory {
    /// Path of the JSON database file.
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl LocalTeamDirectory {
    /// Open a directory database at the given path, creating an empty one
    /// (with its parent directories) if the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create directory database parent: {}", parent.display()),
                    e,
                )
            })?;
        }
        let directory = Self {
            path,
            lock: Mutex::new(()),
        };
        if fs::metadata(&directory.path).await.is_err() {
            directory.write(&DirectoryDocument::default()).await?;
            info!(path = %directory.path.display(), "Created empty team directory database");
        }
        Ok(directory)
    }

    /// Create the main organization if the database has none yet, and
    /// return it. Used when bootstrapping a fresh single-node install.
    pub async fn seed_organization(&self, name: &str) -> AppResult<Organization> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await?;
        if let Some(existing) = doc.organizations.first() {
            return Ok(existing.clone());
        }
        let organization = Organization {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        doc.organizations.push(organization.clone());
        self.write(&doc).await?;
        info!(organization_id = %organization.id, name, "Seeded main organization");
        Ok(organization)
    }

    async fn read(&self) -> AppResult<DirectoryDocument> {
        let data = fs::read_to_string(&self.path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read directory database: {}", self.path.display()),
                e,
            )
        })?;
        serde_json::from_str(&data).map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Corrupt directory database: {}", self.path.display()),
                e,
            )
        })
    }

    async fn write(&self, doc: &DirectoryDocument) -> AppResult<()> {
        let data = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write directory database: {}", self.path.display()),
                e,
            )
        })?;
        debug!(path = %self.path.display(), "Wrote directory database");
        Ok(())
    }
}

#[async_trait]
impl TeamDirectory for LocalTeamDirectory {
    async fn list_organizations(&self) -> AppResult<Vec<Organization>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.organizations)
    }

    async fn list_teams(&self, organization_id: &str) -> AppResult<Vec<Team>> {
        let _guard = self.lock.lock().await;
        let doc = self.read().await?;
        Ok(doc
            .teams
            .into_iter()
            .filter(|t| t.organization_id == organization_id)
            .collect())
    }

    async fn find_team(&self, team_id: &str) -> AppResult<Option<Team>> {
        let _guard = self.lock.lock().await;
        let doc = self.read().await?;
        Ok(doc.teams.into_iter().find(|t| t.id == team_id))
    }

    async fn insert_team(&self, team: &Team) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await?;
        if doc.teams.iter().any(|t| t.id == team.id) {
            return Err(AppError::conflict(format!(
                "Team {} already exists in the directory",
                team.id
            )));
        }
        doc.teams.push(team.clone());
        self.write(&doc).await?;
        debug!(team_id = %team.id, "Inserted team record");
        Ok(())
    }

    async fn update_team(&self, team: &Team) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await?;
        let slot = doc
            .teams
            .iter_mut()
            .find(|t| t.id == team.id)
            .ok_or_else(|| AppError::not_found(format!("Team {} not found", team.id)))?;
        *slot = team.clone();
        self.write(&doc).await?;
        debug!(team_id = %team.id, "Updated team record");
        Ok(())
    }

    async fn remove_team(&self, team_id: &str, organization_id: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await?;
        let before = doc.teams.len();
        doc.teams
            .retain(|t| !(t.id == team_id && t.organization_id == organization_id));
        if doc.teams.len() == before {
            return Err(AppError::not_found(format!("Team {team_id} not found")));
        }
        self.write(&doc).await?;
        debug!(team_id, "Removed team record");
        Ok(())
    }
}
