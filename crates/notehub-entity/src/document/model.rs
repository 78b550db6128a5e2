//! Document entity model.
//!
//! Documents are managed by a separate subsystem; the engine only reads
//! them for directory listings and deletes them during cascade deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use notehub_core::types::{DirectoryId, DocumentId, UserId};

/// Store collection holding document records.
pub const COLLECTION: &str = "documents";

/// A document contained in a directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier.
    pub id: DocumentId,
    /// The document owner.
    pub owner_id: UserId,
    /// The containing directory (None for root-level documents).
    pub directory_id: Option<DirectoryId>,
    /// Document title.
    pub title: String,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last updated.
    pub updated_at: DateTime<Utc>,
}
