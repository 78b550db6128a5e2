//! Store-backed document catalog.
//!
//! The document subsystem proper is a separate application area; this
//! adapter reads and deletes its records through the shared document
//! store, which is all the directory engine needs (content listings and
//! cascade deletion).

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use notehub_core::result::AppResult;
use notehub_core::traits::store::{BatchOp, DocumentStore, Filter, Query};
use notehub_core::types::{DirectoryId, DocumentId, UserId};
use notehub_entity::document::{self, Document, DocumentCatalog};

/// [`DocumentCatalog`] implementation over a [`DocumentStore`].
#[derive(Clone)]
pub struct StoreDocumentCatalog {
    store: Arc<dyn DocumentStore>,
}

impl StoreDocumentCatalog {
    /// Create a new catalog over the given store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DocumentCatalog for StoreDocumentCatalog {
    async fn list_by_directory(
        &self,
        owner_id: UserId,
        directory_id: Option<DirectoryId>,
    ) -> AppResult<Vec<Document>> {
        let directory_filter = match directory_id {
            Some(id) => Filter::eq("directory_id", id.to_string()),
            None => Filter::is_null("directory_id"),
        };
        let records = self
            .store
            .query(
                document::COLLECTION,
                Query::new()
                    .filter(Filter::eq("owner_id", owner_id.to_string()))
                    .filter(directory_filter)
                    .order_by("title"),
            )
            .await?;

        records
            .into_iter()
            .map(|r| serde_json::from_value(r).map_err(Into::into))
            .collect()
    }

    async fn delete_many(&self, ids: &[DocumentId]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let ops: Vec<BatchOp> = ids
            .iter()
            .map(|id| BatchOp::delete(document::COLLECTION, id.to_string()))
            .collect();
        self.store.batch(ops).await?;

        info!(count = ids.len(), "Documents deleted");
        Ok(ids.len() as u64)
    }
}
