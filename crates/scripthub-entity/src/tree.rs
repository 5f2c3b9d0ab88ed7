//! Team structure tree: the tagged item union and the pure algorithms that
//! operate on it.
//!
//! A team's hierarchy is an ordered sequence of [`TreeItem`]s. Every item
//! belongs to exactly one container (the team root or one folder's `items`),
//! ids are unique within a team's tree, and no folder may directly or
//! transitively contain itself. The functions here take the tree as input
//! and return found nodes or mutate it in place; they keep no hidden state.
//! Persistence is the caller's concern.

use serde::{Deserialize, Serialize};

/// A node in a team's folder hierarchy.
///
/// Modeled as a tagged union discriminated by the serialized `type` field,
/// matching the on-disk shape:
/// `{"id": "...", "type": "analysis"}` or
/// `{"id": "...", "type": "folder", "name": "...", "expanded": false, "items": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeItem {
    /// Leaf referencing an analysis record by id.
    Analysis {
        /// The referenced analysis id.
        id: String,
    },
    /// A folder owning an ordered sequence of child items.
    Folder {
        /// Unique folder id.
        id: String,
        /// Folder display name.
        name: String,
        /// Whether the folder is expanded in the UI.
        #[serde(default)]
        expanded: bool,
        /// Child items, in display order.
        #[serde(default)]
        items: Vec<TreeItem>,
    },
}

impl TreeItem {
    /// Leaf reference to an analysis.
    pub fn analysis(id: impl Into<String>) -> Self {
        Self::Analysis { id: id.into() }
    }

    /// A new collapsed, empty folder.
    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Folder {
            id: id.into(),
            name: name.into(),
            expanded: false,
            items: Vec::new(),
        }
    }

    /// The item's id, regardless of variant.
    pub fn id(&self) -> &str {
        match self {
            Self::Analysis { id } | Self::Folder { id, .. } => id,
        }
    }

    /// Whether this item is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder { .. })
    }

    /// The folder's children, or an empty slice for an analysis leaf.
    pub fn children(&self) -> &[TreeItem] {
        match self {
            Self::Folder { items, .. } => items,
            Self::Analysis { .. } => &[],
        }
    }
}

/// A found item together with its immediate container.
///
/// `parent` is `None` for root items; `index` is the position within the
/// containing sequence, usable for splice-style mutation.
#[derive(Debug)]
pub struct FoundItem<'a> {
    /// The folder that directly contains the item, `None` at root.
    pub parent: Option<&'a TreeItem>,
    /// The item itself.
    pub item: &'a TreeItem,
    /// Position within the immediate container's sequence.
    pub index: usize,
}

/// Depth-first, pre-order traversal: a folder is visited before its
/// children. The visitor receives the item, its parent folder (`None` at
/// root), and its index within the immediate container. Traversal stops and
/// returns as soon as the visitor returns `Some`; returns `None` if nothing
/// matched or `items` is empty.
///
/// This is the single primitive all lookups build on.
pub fn traverse<'a, T>(
    items: &'a [TreeItem],
    visit: &mut dyn FnMut(&'a TreeItem, Option<&'a TreeItem>, usize) -> Option<T>,
) -> Option<T> {
    fn walk<'a, T>(
        items: &'a [TreeItem],
        parent: Option<&'a TreeItem>,
        visit: &mut dyn FnMut(&'a TreeItem, Option<&'a TreeItem>, usize) -> Option<T>,
    ) -> Option<T> {
        for (index, item) in items.iter().enumerate() {
            if let Some(found) = visit(item, parent, index) {
                return Some(found);
            }
            if let TreeItem::Folder { items: children, .. } = item {
                if let Some(found) = walk(children, Some(item), visit) {
                    return Some(found);
                }
            }
        }
        None
    }
    walk(items, None, visit)
}

/// Find an item anywhere in the tree by id.
pub fn find_item<'a>(items: &'a [TreeItem], id: &str) -> Option<&'a TreeItem> {
    traverse(items, &mut |item, _, _| (item.id() == id).then_some(item))
}

/// Find an item by id together with its immediate container and index.
pub fn find_item_with_parent<'a>(items: &'a [TreeItem], id: &str) -> Option<FoundItem<'a>> {
    traverse(items, &mut |item, parent, index| {
        (item.id() == id).then_some(FoundItem {
            parent,
            item,
            index,
        })
    })
}

/// Whether `id` appears among the descendants of `item` (the item itself is
/// not considered). Used to reject moving a folder into its own subtree.
pub fn subtree_contains(item: &TreeItem, id: &str) -> bool {
    find_item(item.children(), id).is_some()
}

/// Remove the item with the given id from wherever it sits in the tree and
/// return it. Returns `None` if the id is not present.
pub fn take_item(items: &mut Vec<TreeItem>, id: &str) -> Option<TreeItem> {
    if let Some(pos) = items.iter().position(|item| item.id() == id) {
        return Some(items.remove(pos));
    }
    for item in items.iter_mut() {
        if let TreeItem::Folder { items: children, .. } = item {
            if let Some(taken) = take_item(children, id) {
                return Some(taken);
            }
        }
    }
    None
}

/// Mutable access to an item anywhere in the tree by id.
pub fn find_item_mut<'a>(items: &'a mut Vec<TreeItem>, id: &str) -> Option<&'a mut TreeItem> {
    for item in items.iter_mut() {
        if item.id() == id {
            return Some(item);
        }
        if let TreeItem::Folder { items: children, .. } = item {
            if let Some(found) = find_item_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Mutable access to the child sequence of the folder with the given id.
pub fn folder_items_mut<'a>(
    items: &'a mut Vec<TreeItem>,
    folder_id: &str,
) -> Option<&'a mut Vec<TreeItem>> {
    for item in items.iter_mut() {
        if let TreeItem::Folder { id, items: children, .. } = item {
            if id == folder_id {
                return Some(children);
            }
            if let Some(found) = folder_items_mut(children, folder_id) {
                return Some(found);
            }
        }
    }
    None
}

/// Delete the folder with the given id, splicing its direct children into
/// the containing sequence at the folder's former position. Only one level
/// is promoted; grandchildren stay inside their own folders. Returns the
/// number of children moved, or `None` if no such folder exists.
pub fn promote_folder(items: &mut Vec<TreeItem>, folder_id: &str) -> Option<usize> {
    for index in 0..items.len() {
        let is_target = matches!(&items[index], TreeItem::Folder { id, .. } if id == folder_id);
        if is_target {
            let TreeItem::Folder { items: children, .. } = items.remove(index) else {
                return None;
            };
            let moved = children.len();
            items.splice(index..index, children);
            return Some(moved);
        }
    }
    for item in items.iter_mut() {
        if let TreeItem::Folder { items: children, .. } = item {
            if let Some(moved) = promote_folder(children, folder_id) {
                return Some(moved);
            }
        }
    }
    None
}

/// Ids of every analysis reference in the tree, in pre-order.
pub fn collect_analysis_ids(items: &[TreeItem]) -> Vec<String> {
    let mut ids = Vec::new();
    traverse::<()>(items, &mut |item, _, _| {
        if let TreeItem::Analysis { id } = item {
            ids.push(id.clone());
        }
        None
    });
    ids
}
