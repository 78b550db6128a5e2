//! Interface to the document subsystem.

use async_trait::async_trait;

use notehub_core::result::AppResult;
use notehub_core::types::{DirectoryId, DocumentId, UserId};

use super::model::Document;

/// The document subsystem operations the engine depends on.
///
/// Listing feeds directory content views; bulk deletion backs cascade
/// directory deletion. Everything else about documents is out of scope.
#[async_trait]
pub trait DocumentCatalog: Send + Sync + 'static {
    /// List an owner's documents contained directly in the given directory
    /// (None = root-level documents).
    async fn list_by_directory(
        &self,
        owner_id: UserId,
        directory_id: Option<DirectoryId>,
    ) -> AppResult<Vec<Document>>;

    /// Delete the given documents. Returns the number actually removed.
    async fn delete_many(&self, ids: &[DocumentId]) -> AppResult<u64>;
}
