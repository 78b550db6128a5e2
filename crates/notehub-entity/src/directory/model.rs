//! Directory entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use notehub_core::types::{DirectoryId, RuleId, UserId};

/// Store collection holding directory records.
pub const COLLECTION: &str = "directories";

/// A node in a user's directory hierarchy.
///
/// The tree is materialized through `path`: the `/`-joined names of every
/// ancestor ending in this node's own name. `level` always equals the
/// path's depth (0 for a root-level directory).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Directory {
    /// Unique directory identifier.
    pub id: DirectoryId,
    /// The directory owner.
    pub owner_id: UserId,
    /// Directory name (unique among siblings of the same owner).
    pub name: String,
    /// Parent directory ID (None for root-level directories).
    pub parent_id: Option<DirectoryId>,
    /// Full materialized path (e.g., `/Projects/Web`).
    pub path: String,
    /// Depth in the tree (0 for root-level).
    pub level: i32,
    /// Number of documents contained directly in this directory.
    /// Maintained by the document subsystem.
    pub document_count: i64,
    /// Number of direct child directories, maintained incrementally.
    pub child_count: i64,
    /// Rules attached directly to this directory. Set semantics:
    /// attach/detach keep entries unique, order carries no meaning.
    pub rule_ids: Vec<RuleId>,
    /// Optional display color.
    pub color: Option<String>,
    /// Optional display icon.
    pub icon: Option<String>,
    /// When the directory was created.
    pub created_at: DateTime<Utc>,
    /// When the directory was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Directory {
    /// Check if this is a root-level directory (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if this directory has the given rule attached directly.
    pub fn has_rule(&self, rule_id: RuleId) -> bool {
        self.rule_ids.contains(&rule_id)
    }
}
