//! Team CRUD and analysis reassignment against the external membership
//! authority.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

use scripthub_core::error::{AppError, ErrorKind};
use scripthub_core::result::AppResult;
use scripthub_directory::TeamDirectory;
use scripthub_entity::analysis::AnalysisRecord;
use scripthub_entity::team::{Team, UNCATEGORIZED_TEAM_ID};
use scripthub_entity::tree::{self, TreeItem};
use scripthub_storage::ConfigStore;

/// Request to create a new team.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    /// Team name, unique within the organization.
    pub name: String,
    /// Display color (optional).
    #[serde(default)]
    pub color: Option<String>,
    /// Display rank; appended at the end when omitted.
    #[serde(default)]
    pub order: Option<u32>,
}

/// Fields to update on a team. At least one must be provided.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamRequest {
    /// New team name.
    #[serde(default)]
    pub name: Option<String>,
    /// New display color.
    #[serde(default)]
    pub color: Option<String>,
    /// New display rank.
    #[serde(default)]
    pub order: Option<u32>,
}

/// Result of deleting a team.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTeamOutcome {
    /// Always true on success.
    pub deleted: bool,
    /// Name of the deleted team.
    pub name: String,
    /// How many analyses were reassigned to the system team.
    pub reassigned_analyses: usize,
}

/// Result of moving an analysis between teams.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMove {
    /// The moved analysis.
    pub analysis_id: String,
    /// Its display name.
    pub analysis_name: String,
    /// Team it was in before the move.
    pub from: String,
    /// Team it is in now.
    pub to: String,
}

/// Orchestrates the team directory, the config store, and the tree
/// algorithms into team CRUD, analysis reassignment, and folder operations.
///
/// Must be initialized once before use; initialization resolves the main
/// organization and guarantees the system "uncategorized" team exists.
#[derive(Debug)]
pub struct TeamService {
    /// The external team-membership authority.
    directory: Arc<dyn TeamDirectory>,
    /// The analyses config document store.
    config: Arc<ConfigStore>,
    /// The main organization id, resolved by `initialize`.
    organization_id: OnceCell<String>,
}

impl TeamService {
    /// Creates a new team service.
    pub fn new(directory: Arc<dyn TeamDirectory>, config: Arc<ConfigStore>) -> Self {
        Self {
            directory,
            config,
            organization_id: OnceCell::new(),
        }
    }

    /// Resolve the main organization and ensure the system team exists.
    ///
    /// Idempotent: a second call is a no-op that leaves the resolved
    /// organization as already set.
    pub async fn initialize(&self) -> AppResult<()> {
        self.organization_id
            .get_or_try_init(|| async {
                let organizations = self.directory.list_organizations().await?;
                let main = organizations
                    .into_iter()
                    .next()
                    .ok_or_else(|| AppError::initialization("Main organization not found"))?;

                let teams = self.directory.list_teams(&main.id).await?;
                if !teams.iter().any(|t| t.is_system) {
                    let system = Team {
                        id: UNCATEGORIZED_TEAM_ID.to_string(),
                        name: "Uncategorized".to_string(),
                        organization_id: main.id.clone(),
                        color: None,
                        order_index: 0,
                        is_system: true,
                        created_at: Utc::now(),
                    };
                    self.directory.insert_team(&system).await?;
                    info!(organization_id = %main.id, "Created system team");
                }

                info!(organization_id = %main.id, "Team service initialized");
                Ok::<_, AppError>(main.id)
            })
            .await?;
        Ok(())
    }

    /// The config store this service persists trees through.
    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    pub(crate) fn organization_id(&self) -> AppResult<&str> {
        self.organization_id
            .get()
            .map(String::as_str)
            .ok_or_else(|| AppError::initialization("Team service not initialized"))
    }

    /// The organization's system "uncategorized" team.
    pub async fn system_team(&self) -> AppResult<Team> {
        let organization_id = self.organization_id()?;
        let teams = self.directory.list_teams(organization_id).await?;
        teams
            .into_iter()
            .find(|t| t.is_system)
            .ok_or_else(|| AppError::initialization("System team not found"))
    }

    /// All teams, sorted by display rank ascending. The system team comes
    /// first by construction of its rank.
    pub async fn get_all_teams(&self) -> AppResult<Vec<Team>> {
        let organization_id = self.organization_id()?;
        let mut teams = self.directory.list_teams(organization_id).await?;
        teams.sort_by_key(|t| t.order_index);
        Ok(teams)
    }

    /// Look up a team, failing with a not-found error if absent.
    pub async fn get_team(&self, team_id: &str) -> AppResult<Team> {
        self.directory
            .find_team(team_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Team {team_id} not found")))
    }

    /// Create a new team.
    ///
    /// Team names are unique within the organization (case-sensitive exact
    /// match). Persistence is delegated to the membership authority.
    pub async fn create_team(&self, req: CreateTeamRequest) -> AppResult<Team> {
        if req.name.trim().is_empty() {
            return Err(AppError::validation("Team name cannot be empty"));
        }

        let organization_id = self.organization_id()?.to_string();
        let teams = self.directory.list_teams(&organization_id).await?;
        if teams.iter().any(|t| t.name == req.name) {
            return Err(AppError::conflict(format!(
                "Team with name '{}' already exists",
                req.name
            )));
        }

        let team = Team {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            organization_id,
            color: req.color,
            order_index: req.order.unwrap_or(teams.len() as u32),
            is_system: false,
            created_at: Utc::now(),
        };

        self.directory
            .insert_team(&team)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Upstream, "Failed to create team", e))?;

        info!(team_id = %team.id, name = %team.name, "Team created");
        Ok(team)
    }

    /// Update a team's name, color, or display rank.
    pub async fn update_team(&self, team_id: &str, req: UpdateTeamRequest) -> AppResult<Team> {
        if req.name.is_none() && req.color.is_none() && req.order.is_none() {
            return Err(AppError::validation("No valid fields to update"));
        }

        let mut team = self.get_team(team_id).await?;

        if let Some(name) = req.name {
            if name.trim().is_empty() {
                return Err(AppError::validation("Team name cannot be empty"));
            }
            team.name = name;
        }
        if let Some(color) = req.color {
            team.color = Some(color);
        }
        if let Some(order) = req.order {
            team.order_index = order;
        }

        self.directory.update_team(&team).await?;
        info!(team_id, "Team updated");
        Ok(team)
    }

    /// Delete a team.
    ///
    /// The team's analyses are reassigned to the system "uncategorized"
    /// team first — records retargeted and their tree references moved to
    /// the system team's root in one config update — so a failing upstream
    /// delete never leaves orphaned team references. The system team itself
    /// cannot be deleted.
    pub async fn delete_team(&self, team_id: &str) -> AppResult<DeleteTeamOutcome> {
        let team = self.get_team(team_id).await?;
        if team.is_system {
            return Err(AppError::validation("The system team cannot be deleted"));
        }

        let system = self.system_team().await?;
        let team_id_owned = team_id.to_string();
        let system_id = system.id.clone();
        let reassigned = self
            .config
            .update(move |doc| {
                doc.team_structure.shift_remove(&team_id_owned);

                let moved: Vec<String> = doc
                    .analyses
                    .values_mut()
                    .filter(|record| record.team_id.as_deref() == Some(team_id_owned.as_str()))
                    .map(|record| {
                        record.team_id = Some(system_id.clone());
                        record.updated_at = Utc::now();
                        record.id.clone()
                    })
                    .collect();

                let target = doc.structure_mut(&system_id);
                for analysis_id in &moved {
                    if tree::find_item(&target.items, analysis_id).is_none() {
                        target.items.push(TreeItem::analysis(analysis_id.clone()));
                    }
                }
                Ok(moved.len())
            })
            .await?;

        let organization_id = self.organization_id()?;
        self.directory
            .remove_team(team_id, organization_id)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Upstream, "Failed to delete team", e))?;

        info!(team_id, reassigned, "Team deleted");
        Ok(DeleteTeamOutcome {
            deleted: true,
            name: team.name,
            reassigned_analyses: reassigned,
        })
    }

    /// All analyses belonging to a team, in config insertion order.
    pub async fn get_analyses_by_team(&self, team_id: &str) -> AppResult<Vec<AnalysisRecord>> {
        self.get_team(team_id).await?;
        let doc = self.config.get().await?;
        Ok(doc
            .analyses
            .values()
            .filter(|record| record.team_id.as_deref() == Some(team_id))
            .cloned()
            .collect())
    }

    /// Number of analyses in a team.
    ///
    /// Deliberately fail-soft: returns 0 for unknown teams and on any
    /// lookup failure, since this only backs a display counter.
    pub async fn get_analysis_count_by_team_id(&self, team_id: &str) -> usize {
        match self.get_analyses_by_team(team_id).await {
            Ok(analyses) => analyses.len(),
            Err(e) => {
                debug!(team_id, error = %e, "Analysis count lookup failed, returning 0");
                0
            }
        }
    }

    /// Move an analysis to another team: retargets the record and moves its
    /// tree reference from the source structure to the target structure's
    /// root, as one config update. Moving to the team it is already in is a
    /// no-op that touches nothing.
    pub async fn move_analysis_to_team(
        &self,
        analysis_id: &str,
        target_team_id: &str,
    ) -> AppResult<AnalysisMove> {
        let target = self.get_team(target_team_id).await?;

        let doc = self.config.get().await?;
        let record = doc
            .analyses
            .get(analysis_id)
            .ok_or_else(|| AppError::not_found(format!("Analysis {analysis_id} not found")))?;
        let from = record
            .team_id
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED_TEAM_ID.to_string());
        let analysis_name = record.name.clone();

        if from == target.id {
            debug!(analysis_id, team_id = %target.id, "Analysis already in team");
            return Ok(AnalysisMove {
                analysis_id: analysis_id.to_string(),
                analysis_name,
                from,
                to: target.id,
            });
        }

        let analysis_id_owned = analysis_id.to_string();
        let from_owned = from.clone();
        let to_owned = target.id.clone();
        self.config
            .update(move |doc| {
                let record = doc.analyses.get_mut(&analysis_id_owned).ok_or_else(|| {
                    AppError::not_found(format!("Analysis {analysis_id_owned} not found"))
                })?;
                record.team_id = Some(to_owned.clone());
                record.updated_at = Utc::now();

                if let Some(source) = doc.team_structure.get_mut(&from_owned) {
                    tree::take_item(&mut source.items, &analysis_id_owned);
                }
                doc.structure_mut(&to_owned)
                    .items
                    .push(TreeItem::analysis(analysis_id_owned.clone()));
                Ok(())
            })
            .await?;

        info!(analysis_id, from = %from, to = %target.id, "Analysis moved between teams");
        Ok(AnalysisMove {
            analysis_id: analysis_id.to_string(),
            analysis_name,
            from,
            to: target.id,
        })
    }

    /// Assign the system team to an analysis that has none. No-op when the
    /// analysis already has a team.
    pub async fn ensure_analysis_has_team(&self, analysis_id: &str) -> AppResult<()> {
        let doc = self.config.get().await?;
        let record = doc
            .analyses
            .get(analysis_id)
            .ok_or_else(|| AppError::not_found(format!("Analysis {analysis_id} not found")))?;
        if record.team_id.is_some() {
            return Ok(());
        }

        let system = self.system_team().await?;
        let analysis_id_owned = analysis_id.to_string();
        let system_id = system.id.clone();
        self.config
            .update(move |doc| {
                let record = doc.analyses.get_mut(&analysis_id_owned).ok_or_else(|| {
                    AppError::not_found(format!("Analysis {analysis_id_owned} not found"))
                })?;
                if record.team_id.is_none() {
                    record.team_id = Some(system_id.clone());
                    record.updated_at = Utc::now();
                    let structure = doc.structure_mut(&system_id);
                    if tree::find_item(&structure.items, &analysis_id_owned).is_none() {
                        structure.items.push(TreeItem::analysis(analysis_id_owned.clone()));
                    }
                }
                Ok(())
            })
            .await?;

        warn!(analysis_id, team_id = %system.id, "Assigned uncategorized team to analysis");
        Ok(())
    }

    /// Renumber team display ranks to match the given order: each id gets
    /// its array position as rank. Returns all teams re-sorted.
    pub async fn reorder_teams(&self, team_ids: &[String]) -> AppResult<Vec<Team>> {
        for (index, team_id) in team_ids.iter().enumerate() {
            let mut team = self.get_team(team_id).await?;
            team.order_index = index as u32;
            self.directory.update_team(&team).await?;
        }
        info!(count = team_ids.len(), "Teams reordered");
        self.get_all_teams().await
    }
}
