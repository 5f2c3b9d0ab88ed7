//! Team and organization records from the external membership directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel team id that analyses fall back to when their team is deleted
/// or was never assigned.
pub const UNCATEGORIZED_TEAM_ID: &str = "uncategorized";

/// An organization in the membership directory. ScriptHub operates within
/// a single "main" organization resolved at service initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Unique organization identifier.
    pub id: String,
    /// Organization display name.
    pub name: String,
    /// When the organization was created.
    pub created_at: DateTime<Utc>,
}

/// An organizational grouping of analyses and folders.
///
/// Exactly one team per organization has `is_system = true`; it represents
/// the "uncategorized" bucket and cannot be deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Unique team identifier.
    pub id: String,
    /// Team display name, unique within the organization.
    pub name: String,
    /// The organization this team belongs to.
    pub organization_id: String,
    /// Display color (hex string), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Dense 0-based display rank, renumbered on every reorder. The system
    /// team sits at 0 by construction.
    pub order_index: u32,
    /// Whether this is the permanent "uncategorized" system team.
    pub is_system: bool,
    /// When the team was created.
    pub created_at: DateTime<Utc>,
}
