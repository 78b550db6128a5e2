//! Directory tree building and ancestor walks.

use std::collections::HashSet;
use std::sync::Arc;

use notehub_core::result::AppResult;
use notehub_core::traits::store::{DocumentStore, Filter, Query};
use notehub_core::types::DirectoryId;

use notehub_entity::directory::{self, Directory, DirectoryForest, DirectoryNode};

use crate::context::RequestContext;
use crate::records;

/// Builds directory forests and resolves ancestor chains.
#[derive(Clone)]
pub struct TreeService {
    /// Document store handle.
    store: Arc<dyn DocumentStore>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Builds the owner's complete directory forest.
    ///
    /// Directories are loaded ordered by path, which places parents before
    /// their children; nodes whose parent record is missing (e.g. a
    /// concurrent delete) are surfaced as additional roots.
    pub async fn tree(&self, ctx: &RequestContext) -> AppResult<DirectoryForest> {
        let records = self
            .store
            .query(
                directory::COLLECTION,
                Query::new()
                    .filter(Filter::eq("owner_id", ctx.user_id.to_string()))
                    .order_by("path"),
            )
            .await?;
        let all: Vec<Directory> = records
            .into_iter()
            .map(records::decode)
            .collect::<AppResult<_>>()?;

        let known: HashSet<DirectoryId> = all.iter().map(|d| d.id).collect();
        let total = all.len() as u64;

        let roots = all
            .iter()
            .filter(|d| match d.parent_id {
                None => true,
                Some(parent_id) => !known.contains(&parent_id),
            })
            .map(|root| build_node(root, &all))
            .collect();

        Ok(DirectoryForest {
            roots,
            total_directories: total,
        })
    }

    /// Returns the ancestors of a directory, root-first, excluding the
    /// directory itself.
    pub async fn ancestors(
        &self,
        ctx: &RequestContext,
        directory_id: DirectoryId,
    ) -> AppResult<Vec<Directory>> {
        let dir = records::fetch_directory(self.store.as_ref(), ctx, directory_id).await?;
        records::ancestor_chain(self.store.as_ref(), ctx, &dir).await
    }
}

/// Build a tree node from the flat directory list.
fn build_node(dir: &Directory, all: &[Directory]) -> DirectoryNode {
    let mut children: Vec<DirectoryNode> = all
        .iter()
        .filter(|d| d.parent_id == Some(dir.id))
        .map(|child| build_node(child, all))
        .collect();
    children.sort_by(|a, b| a.name.cmp(&b.name));

    DirectoryNode {
        id: dir.id,
        name: dir.name.clone(),
        path: dir.path.clone(),
        level: dir.level,
        child_count: dir.child_count,
        document_count: dir.document_count,
        rule_count: dir.rule_ids.len(),
        color: dir.color.clone(),
        icon: dir.icon.clone(),
        children,
    }
}
