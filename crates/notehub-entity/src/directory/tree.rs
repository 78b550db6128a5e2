//! Directory tree structures for hierarchical display.

use serde::{Deserialize, Serialize};

use notehub_core::types::DirectoryId;

/// A node in a rendered directory tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryNode {
    /// Directory ID.
    pub id: DirectoryId,
    /// Directory name.
    pub name: String,
    /// Full materialized path.
    pub path: String,
    /// Depth level.
    pub level: i32,
    /// Number of child directories.
    pub child_count: i64,
    /// Number of documents directly in this directory.
    pub document_count: i64,
    /// Number of rules attached directly to this directory.
    pub rule_count: usize,
    /// Optional display color.
    pub color: Option<String>,
    /// Optional display icon.
    pub icon: Option<String>,
    /// Child nodes, ordered by name.
    pub children: Vec<DirectoryNode>,
}

/// A complete directory forest for one owner.
///
/// Orphaned nodes (parent record missing, e.g. due to a concurrent
/// delete) are surfaced as additional roots rather than dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryForest {
    /// The root nodes of the forest.
    pub roots: Vec<DirectoryNode>,
    /// Total number of directories in the forest.
    pub total_directories: u64,
}

impl DirectoryForest {
    /// Create an empty forest.
    pub fn empty() -> Self {
        Self {
            roots: Vec::new(),
            total_directories: 0,
        }
    }
}
