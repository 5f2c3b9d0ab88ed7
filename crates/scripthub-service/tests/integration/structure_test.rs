//! Folder CRUD, item moves, and tree invariant tests through the service
//! API.

use std::collections::HashSet;

use scripthub_core::error::ErrorKind;
use scripthub_entity::tree::{self, TreeItem};
use scripthub_service::{CreateFolderRequest, UpdateFolderRequest};

use crate::helpers::TestHub;

fn folder_request(name: &str, parent_id: Option<&str>) -> CreateFolderRequest {
    CreateFolderRequest {
        parent_id: parent_id.map(str::to_string),
        name: name.to_string(),
        expanded: false,
    }
}

/// All ids in a team's tree, in pre-order.
async fn tree_ids(hub: &TestHub, team_id: &str) -> Vec<String> {
    let doc = hub.config.get().await.unwrap();
    let mut ids = Vec::new();
    if let Some(structure) = doc.team_structure.get(team_id) {
        tree::traverse(&structure.items, &mut |item, _, _| -> Option<()> {
            ids.push(item.id().to_string());
            None
        });
    }
    ids
}

#[tokio::test]
async fn test_create_folder_at_root_and_nested() {
    let hub = TestHub::new().await;
    let team_id = hub.create_team("Alpha").await;

    let parent = hub
        .teams
        .create_folder(&team_id, folder_request("Reports", None))
        .await
        .unwrap();
    let child = hub
        .teams
        .create_folder(&team_id, folder_request("Q1", Some(parent.id())))
        .await
        .unwrap();

    let doc = hub.config.get().await.unwrap();
    let items = &doc.team_structure[&team_id].items;
    let found = tree::find_item_with_parent(items, child.id()).expect("nested folder");
    assert_eq!(found.parent.map(TreeItem::id), Some(parent.id()));
    assert_eq!(found.index, 0);
}

#[tokio::test]
async fn test_create_folder_failures() {
    let hub = TestHub::new().await;
    let team_id = hub.create_team("Alpha").await;

    let err = hub
        .teams
        .create_folder(&team_id, folder_request("  ", None))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = hub
        .teams
        .create_folder("missing-team", folder_request("Reports", None))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = hub
        .teams
        .create_folder(&team_id, folder_request("Q1", Some("missing-folder")))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_update_folder_merges_fields() {
    let hub = TestHub::new().await;
    let team_id = hub.create_team("Alpha").await;
    let folder = hub
        .teams
        .create_folder(&team_id, folder_request("Reports", None))
        .await
        .unwrap();

    let updated = hub
        .teams
        .update_folder(&team_id, folder.id(), UpdateFolderRequest {
            name: Some("Archive".into()),
            expanded: Some(true),
        })
        .await
        .unwrap();
    let TreeItem::Folder { name, expanded, .. } = &updated else {
        panic!("expected folder");
    };
    assert_eq!(name, "Archive");
    assert!(*expanded);

    let err = hub
        .teams
        .update_folder(&team_id, "missing", UpdateFolderRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_folder_promotes_children_in_place() {
    let hub = TestHub::new().await;
    let team_id = hub.create_team("Alpha").await;

    // Root: [folder(c1, c2), c3]
    let folder = hub
        .teams
        .create_folder(&team_id, folder_request("Reports", None))
        .await
        .unwrap();
    hub.teams
        .add_item_to_team_structure(&team_id, TreeItem::analysis("c1"), Some(folder.id()))
        .await
        .unwrap();
    hub.teams
        .add_item_to_team_structure(&team_id, TreeItem::analysis("c2"), Some(folder.id()))
        .await
        .unwrap();
    hub.teams
        .add_item_to_team_structure(&team_id, TreeItem::analysis("c3"), None)
        .await
        .unwrap();

    let outcome = hub.teams.delete_folder(&team_id, folder.id()).await.unwrap();
    assert!(outcome.deleted);
    assert_eq!(outcome.children_moved, 2);

    assert_eq!(tree_ids(&hub, &team_id).await, vec!["c1", "c2", "c3"]);

    let err = hub.teams.delete_folder(&team_id, folder.id()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_move_item_into_itself_is_rejected() {
    let hub = TestHub::new().await;
    let team_id = hub.create_team("Alpha").await;
    let folder = hub
        .teams
        .create_folder(&team_id, folder_request("A", None))
        .await
        .unwrap();

    let err = hub
        .teams
        .move_item(&team_id, folder.id(), Some(folder.id()), 0)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidOperation);
    assert_eq!(err.message, "Cannot move folder into itself");
}

#[tokio::test]
async fn test_move_item_into_descendant_is_rejected() {
    let hub = TestHub::new().await;
    let team_id = hub.create_team("Alpha").await;

    // root -> folderA -> folderB
    let folder_a = hub
        .teams
        .create_folder(&team_id, folder_request("A", None))
        .await
        .unwrap();
    let folder_b = hub
        .teams
        .create_folder(&team_id, folder_request("B", Some(folder_a.id())))
        .await
        .unwrap();

    let err = hub
        .teams
        .move_item(&team_id, folder_a.id(), Some(folder_b.id()), 0)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidOperation);
    assert_eq!(err.message, "Cannot move folder into its own descendant");
}

#[tokio::test]
async fn test_move_item_above_its_ancestor_is_legal() {
    let hub = TestHub::new().await;
    let team_id = hub.create_team("Alpha").await;

    let folder_a = hub
        .teams
        .create_folder(&team_id, folder_request("A", None))
        .await
        .unwrap();
    let folder_b = hub
        .teams
        .create_folder(&team_id, folder_request("B", Some(folder_a.id())))
        .await
        .unwrap();

    let outcome = hub
        .teams
        .move_item(&team_id, folder_b.id(), None, 0)
        .await
        .unwrap();
    assert!(outcome.moved);
    assert_eq!(outcome.to, "root");

    let doc = hub.config.get().await.unwrap();
    let items = &doc.team_structure[&team_id].items;
    let found = tree::find_item_with_parent(items, folder_b.id()).expect("folderB");
    assert!(found.parent.is_none());
    assert_eq!(found.index, 0);
}

#[tokio::test]
async fn test_move_item_into_folder_at_position() {
    let hub = TestHub::new().await;
    let team_id = hub.create_team("Alpha").await;

    let folder = hub
        .teams
        .create_folder(&team_id, folder_request("F", None))
        .await
        .unwrap();
    hub.teams
        .add_item_to_team_structure(&team_id, TreeItem::analysis("a1"), Some(folder.id()))
        .await
        .unwrap();
    hub.teams
        .add_item_to_team_structure(&team_id, TreeItem::analysis("a2"), None)
        .await
        .unwrap();

    let outcome = hub
        .teams
        .move_item(&team_id, "a2", Some(folder.id()), 0)
        .await
        .unwrap();
    assert_eq!(outcome.to, folder.id());

    let doc = hub.config.get().await.unwrap();
    let items = &doc.team_structure[&team_id].items;
    let found = tree::find_item_with_parent(items, "a2").expect("a2");
    assert_eq!(found.parent.map(TreeItem::id), Some(folder.id()));
    assert_eq!(found.index, 0);

    // An out-of-range position clamps to the end of the container.
    let outcome = hub
        .teams
        .move_item(&team_id, "a2", None, 99)
        .await
        .unwrap();
    assert_eq!(outcome.to, "root");
    let doc = hub.config.get().await.unwrap();
    let found =
        tree::find_item_with_parent(&doc.team_structure[&team_id].items, "a2").expect("a2");
    assert!(found.parent.is_none());
    assert_eq!(found.index, 1);
}

#[tokio::test]
async fn test_move_item_failures() {
    let hub = TestHub::new().await;
    let team_id = hub.create_team("Alpha").await;
    hub.teams
        .add_item_to_team_structure(&team_id, TreeItem::analysis("a1"), None)
        .await
        .unwrap();

    let err = hub
        .teams
        .move_item(&team_id, "missing", None, 0)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = hub
        .teams
        .move_item(&team_id, "a1", Some("missing-folder"), 0)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    // An analysis leaf is not a valid move target.
    hub.teams
        .add_item_to_team_structure(&team_id, TreeItem::analysis("a2"), None)
        .await
        .unwrap();
    let err = hub
        .teams
        .move_item(&team_id, "a1", Some("a2"), 0)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_no_duplicate_ids_after_mixed_operations() {
    let hub = TestHub::new().await;
    let team_id = hub.create_team("Alpha").await;

    let outer = hub
        .teams
        .create_folder(&team_id, folder_request("Outer", None))
        .await
        .unwrap();
    let inner = hub
        .teams
        .create_folder(&team_id, folder_request("Inner", Some(outer.id())))
        .await
        .unwrap();
    for id in ["a1", "a2", "a3"] {
        hub.teams
            .add_item_to_team_structure(&team_id, TreeItem::analysis(id), None)
            .await
            .unwrap();
    }

    hub.teams
        .move_item(&team_id, "a1", Some(inner.id()), 0)
        .await
        .unwrap();
    hub.teams
        .move_item(&team_id, "a2", Some(outer.id()), 0)
        .await
        .unwrap();
    hub.teams
        .move_item(&team_id, inner.id(), None, 1)
        .await
        .unwrap();
    hub.teams.delete_folder(&team_id, outer.id()).await.unwrap();

    let ids = tree_ids(&hub, &team_id).await;
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len(), "duplicate ids in tree: {ids:?}");
    assert_eq!(unique.len(), 4); // inner, a1, a2, a3
}

#[tokio::test]
async fn test_remove_item_without_structure_is_noop() {
    let hub = TestHub::new().await;
    let team_id = hub.create_team("Alpha").await;

    let removed = hub
        .teams
        .remove_item_from_team_structure(&team_id, "a1")
        .await
        .unwrap();
    assert!(!removed);

    hub.teams
        .add_item_to_team_structure(&team_id, TreeItem::analysis("a1"), None)
        .await
        .unwrap();
    let removed = hub
        .teams
        .remove_item_from_team_structure(&team_id, "a1")
        .await
        .unwrap();
    assert!(removed);
    assert!(tree_ids(&hub, &team_id).await.is_empty());
}
