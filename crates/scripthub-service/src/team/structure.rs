//! Team-structure operations: folder CRUD, item moves, and reference
//! management over the per-team tree.
//!
//! These methods read the tree from the config store, apply the pure
//! algorithms of [`scripthub_entity::tree`], and write the result back.
//! The lookup primitives themselves (`traverse`, `find_item`,
//! `find_item_with_parent`) are re-exported at the crate root for callers
//! that only need to inspect a tree.

use tracing::info;
use uuid::Uuid;

use scripthub_core::error::AppError;
use scripthub_core::result::AppResult;
use scripthub_entity::tree::{self, TreeItem};

use super::service::TeamService;

/// Request to create a folder.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    /// Parent folder id; `None` appends at the team root.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Folder name.
    pub name: String,
    /// Initial expanded state.
    #[serde(default)]
    pub expanded: bool,
}

/// Fields to update on a folder.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFolderRequest {
    /// New folder name.
    #[serde(default)]
    pub name: Option<String>,
    /// New expanded state.
    #[serde(default)]
    pub expanded: Option<bool>,
}

/// Result of deleting a folder.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFolderOutcome {
    /// Always true on success.
    pub deleted: bool,
    /// How many direct children were promoted into the parent container.
    pub children_moved: usize,
}

/// Result of moving an item.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveItemOutcome {
    /// Always true on success.
    pub moved: bool,
    /// The destination: `"root"` or the target folder id.
    pub to: String,
}

impl TeamService {
    /// Create a folder in a team's tree, appended to the parent container
    /// (team root when `parent_id` is `None`).
    pub async fn create_folder(
        &self,
        team_id: &str,
        req: CreateFolderRequest,
    ) -> AppResult<TreeItem> {
        if req.name.trim().is_empty() {
            return Err(AppError::validation("Folder name cannot be empty"));
        }
        self.get_team(team_id).await?;

        let folder = TreeItem::Folder {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            expanded: req.expanded,
            items: Vec::new(),
        };

        let team_id_owned = team_id.to_string();
        let created = folder.clone();
        self.config()
            .update(move |doc| {
                let structure = doc.structure_mut(&team_id_owned);
                match req.parent_id.as_deref() {
                    None => structure.items.push(folder),
                    Some(parent_id) => {
                        let parent_items = tree::folder_items_mut(&mut structure.items, parent_id)
                            .ok_or_else(|| {
                                AppError::not_found(format!("Folder {parent_id} not found"))
                            })?;
                        parent_items.push(folder);
                    }
                }
                Ok(())
            })
            .await?;

        info!(team_id, folder_id = %created.id(), "Folder created");
        Ok(created)
    }

    /// Merge the provided fields into a folder.
    pub async fn update_folder(
        &self,
        team_id: &str,
        folder_id: &str,
        req: UpdateFolderRequest,
    ) -> AppResult<TreeItem> {
        let team_id_owned = team_id.to_string();
        let folder_id_owned = folder_id.to_string();
        let updated = self
            .config()
            .update(move |doc| {
                let structure = doc
                    .team_structure
                    .get_mut(&team_id_owned)
                    .ok_or_else(|| {
                        AppError::not_found(format!("Folder {folder_id_owned} not found"))
                    })?;
                let item = tree::find_item_mut(&mut structure.items, &folder_id_owned)
                    .ok_or_else(|| {
                        AppError::not_found(format!("Folder {folder_id_owned} not found"))
                    })?;
                let TreeItem::Folder { name, expanded, .. } = item else {
                    return Err(AppError::not_found(format!(
                        "Folder {folder_id_owned} not found"
                    )));
                };
                if let Some(new_name) = req.name {
                    if new_name.trim().is_empty() {
                        return Err(AppError::validation("Folder name cannot be empty"));
                    }
                    *name = new_name;
                }
                if let Some(new_expanded) = req.expanded {
                    *expanded = new_expanded;
                }
                Ok(item.clone())
            })
            .await?;

        info!(team_id, folder_id, "Folder updated");
        Ok(updated)
    }

    /// Delete a folder, splicing its direct children into the containing
    /// sequence at the folder's former position. Only one level is
    /// promoted; nested folders keep their own children.
    pub async fn delete_folder(
        &self,
        team_id: &str,
        folder_id: &str,
    ) -> AppResult<DeleteFolderOutcome> {
        let team_id_owned = team_id.to_string();
        let folder_id_owned = folder_id.to_string();
        let children_moved = self
            .config()
            .update(move |doc| {
                let structure = doc
                    .team_structure
                    .get_mut(&team_id_owned)
                    .ok_or_else(|| {
                        AppError::not_found(format!("Folder {folder_id_owned} not found"))
                    })?;
                tree::promote_folder(&mut structure.items, &folder_id_owned).ok_or_else(|| {
                    AppError::not_found(format!("Folder {folder_id_owned} not found"))
                })
            })
            .await?;

        info!(team_id, folder_id, children_moved, "Folder deleted");
        Ok(DeleteFolderOutcome {
            deleted: true,
            children_moved,
        })
    }

    /// Move an item (folder or analysis reference) to a new container and
    /// position. `target_folder_id` `None` means the team root. A folder
    /// may not be moved into itself or into its own descendant; moving it
    /// above its own ancestors is legal.
    pub async fn move_item(
        &self,
        team_id: &str,
        item_id: &str,
        target_folder_id: Option<&str>,
        position: usize,
    ) -> AppResult<MoveItemOutcome> {
        if target_folder_id == Some(item_id) {
            return Err(AppError::invalid_operation("Cannot move folder into itself"));
        }

        let team_id_owned = team_id.to_string();
        let item_id_owned = item_id.to_string();
        let target_owned = target_folder_id.map(str::to_string);
        let to = self
            .config()
            .update(move |doc| {
                let structure = doc
                    .team_structure
                    .get_mut(&team_id_owned)
                    .ok_or_else(|| {
                        AppError::not_found(format!("Item {item_id_owned} not found"))
                    })?;

                let item = tree::find_item(&structure.items, &item_id_owned).ok_or_else(|| {
                    AppError::not_found(format!("Item {item_id_owned} not found"))
                })?;
                if let Some(target_id) = target_owned.as_deref() {
                    if tree::subtree_contains(item, target_id) {
                        return Err(AppError::invalid_operation(
                            "Cannot move folder into its own descendant",
                        ));
                    }
                    let target = tree::find_item(&structure.items, target_id).ok_or_else(|| {
                        AppError::not_found(format!("Folder {target_id} not found"))
                    })?;
                    if !target.is_folder() {
                        return Err(AppError::not_found(format!(
                            "Folder {target_id} not found"
                        )));
                    }
                }

                let Some(item) = tree::take_item(&mut structure.items, &item_id_owned) else {
                    return Err(AppError::not_found(format!(
                        "Item {item_id_owned} not found"
                    )));
                };

                let container = match target_owned.as_deref() {
                    None => &mut structure.items,
                    Some(target_id) => tree::folder_items_mut(&mut structure.items, target_id)
                        .ok_or_else(|| {
                            AppError::not_found(format!("Folder {target_id} not found"))
                        })?,
                };
                let index = position.min(container.len());
                container.insert(index, item);

                Ok(target_owned.unwrap_or_else(|| "root".to_string()))
            })
            .await?;

        info!(team_id, item_id, to = %to, position, "Item moved");
        Ok(MoveItemOutcome { moved: true, to })
    }

    /// Append an item to a team's structure, creating an empty structure
    /// for the team if it has none yet.
    pub async fn add_item_to_team_structure(
        &self,
        team_id: &str,
        item: TreeItem,
        parent_id: Option<&str>,
    ) -> AppResult<()> {
        let team_id_owned = team_id.to_string();
        let parent_owned = parent_id.map(str::to_string);
        self.config()
            .update(move |doc| {
                let structure = doc.structure_mut(&team_id_owned);
                match parent_owned.as_deref() {
                    None => structure.items.push(item),
                    Some(parent_id) => {
                        let parent_items = tree::folder_items_mut(&mut structure.items, parent_id)
                            .ok_or_else(|| {
                                AppError::not_found(format!("Folder {parent_id} not found"))
                            })?;
                        parent_items.push(item);
                    }
                }
                Ok(())
            })
            .await
    }

    /// Splice the analysis reference out of a team's tree, wherever it
    /// sits. A team with no structure yet, or no matching reference, is a
    /// no-op rather than an error. Returns whether a reference was removed.
    pub async fn remove_item_from_team_structure(
        &self,
        team_id: &str,
        analysis_id: &str,
    ) -> AppResult<bool> {
        let team_id_owned = team_id.to_string();
        let analysis_id_owned = analysis_id.to_string();
        self.config()
            .update(move |doc| {
                let Some(structure) = doc.team_structure.get_mut(&team_id_owned) else {
                    return Ok(false);
                };
                Ok(tree::take_item(&mut structure.items, &analysis_id_owned).is_some())
            })
            .await
    }
}
