//! Directory CRUD operations with path-invariant maintenance.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use notehub_core::error::{AppError, ErrorKind};
use notehub_core::limits;
use notehub_core::result::AppResult;
use notehub_core::traits::clock::Clock;
use notehub_core::traits::store::{BatchOp, DocumentStore, Filter, Query};
use notehub_core::types::{DirectoryId, DocumentId};

use notehub_entity::directory::{self, Directory};
use notehub_entity::document::{Document, DocumentCatalog};
use notehub_entity::rule;

use crate::context::RequestContext;
use crate::records;

use super::path;

/// Manages directory CRUD and the materialized-path invariants.
#[derive(Clone)]
pub struct DirectoryService {
    /// Document store handle.
    store: Arc<dyn DocumentStore>,
    /// Document subsystem, used for listings and cascade deletion.
    documents: Arc<dyn DocumentCatalog>,
    /// Time source for created/updated stamps.
    clock: Arc<dyn Clock>,
}

/// Request to create a new directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDirectoryRequest {
    /// Directory name.
    pub name: String,
    /// Parent directory ID (None for root-level).
    pub parent_id: Option<DirectoryId>,
    /// Optional display color.
    pub color: Option<String>,
    /// Optional display icon.
    pub icon: Option<String>,
}

/// Request to update a directory. Only the provided fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDirectoryRequest {
    /// New name (triggers a descendant path rewrite).
    pub name: Option<String>,
    /// New display color.
    pub color: Option<String>,
    /// New display icon.
    pub icon: Option<String>,
}

/// Result of a cascade deletion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteOutcome {
    /// Directories removed, including the target itself.
    pub deleted_directory_count: u64,
    /// Documents removed across the whole subtree.
    pub deleted_document_count: u64,
}

/// Result of a move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// The moved directory with its new path and level.
    pub directory: Directory,
    /// Number of descendants whose paths were rewritten.
    pub affected_descendant_count: u64,
}

/// Listing of one directory's direct contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryContents {
    /// The listed directory; None when listing root-level contents
    /// (including the stale-reference fallback).
    pub directory: Option<Directory>,
    /// Direct child directories, ordered by name.
    pub directories: Vec<Directory>,
    /// Documents contained directly, ordered by title.
    pub documents: Vec<Document>,
}

/// Validate and normalize a directory name.
fn validate_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation("Directory name cannot be empty"));
    }
    if name.chars().count() > limits::MAX_DIRECTORY_NAME_LEN {
        return Err(AppError::validation(format!(
            "Directory name exceeds {} characters",
            limits::MAX_DIRECTORY_NAME_LEN
        )));
    }
    if limits::RESERVED_DIRECTORY_NAMES
        .iter()
        .any(|r| r.eq_ignore_ascii_case(name))
    {
        return Err(AppError::validation(format!(
            "'{name}' is a reserved directory name"
        )));
    }
    if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err(AppError::invalid_operation(
            "Directory name contains forbidden characters",
        ));
    }
    Ok(name.to_string())
}

impl DirectoryService {
    /// Creates a new directory service.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        documents: Arc<dyn DocumentCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            documents,
            clock,
        }
    }

    /// Creates a new directory under the given parent (or at root level).
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateDirectoryRequest,
    ) -> AppResult<Directory> {
        let name = validate_name(&req.name)?;

        let parent = match req.parent_id {
            Some(parent_id) => {
                let parent = records::fetch_directory(self.store.as_ref(), ctx, parent_id).await?;
                if parent.level >= limits::MAX_DEPTH - 1 {
                    return Err(AppError::depth_exceeded(format!(
                        "Maximum directory depth of {} reached",
                        limits::MAX_DEPTH
                    )));
                }
                Some(parent)
            }
            None => None,
        };

        if self
            .sibling_exists(ctx, req.parent_id, &name, None)
            .await?
        {
            return Err(AppError::conflict(format!(
                "A directory named '{name}' already exists here"
            )));
        }

        let (dir_path, level) =
            path::child_path(parent.as_ref().map(|p| (p.path.as_str(), p.level)), &name);

        let now = self.clock.now();
        let dir = Directory {
            id: DirectoryId::new(),
            owner_id: ctx.user_id,
            name,
            parent_id: req.parent_id,
            path: dir_path,
            level,
            document_count: 0,
            child_count: 0,
            rule_ids: Vec::new(),
            color: req.color,
            icon: req.icon,
            created_at: now,
            updated_at: now,
        };

        let mut ops = vec![BatchOp::put(
            directory::COLLECTION,
            dir.id.to_string(),
            records::encode(&dir)?,
        )];
        if let Some(parent) = &parent {
            ops.push(BatchOp::increment(
                directory::COLLECTION,
                parent.id.to_string(),
                "child_count",
                1,
            ));
        }
        self.store.batch(ops).await?;

        info!(
            user_id = %ctx.user_id,
            directory_id = %dir.id,
            path = %dir.path,
            "Directory created"
        );

        Ok(dir)
    }

    /// Gets a directory by ID.
    pub async fn get(&self, ctx: &RequestContext, id: DirectoryId) -> AppResult<Directory> {
        records::fetch_directory(self.store.as_ref(), ctx, id).await
    }

    /// Finds a directory by its exact materialized path.
    pub async fn by_path(
        &self,
        ctx: &RequestContext,
        literal_path: &str,
    ) -> AppResult<Option<Directory>> {
        let mut records = self
            .store
            .query(
                directory::COLLECTION,
                Query::new()
                    .filter(Filter::eq("owner_id", ctx.user_id.to_string()))
                    .filter(Filter::eq("path", literal_path))
                    .limit(1),
            )
            .await?;
        match records.pop() {
            Some(record) => Ok(Some(records::decode(record)?)),
            None => Ok(None),
        }
    }

    /// Renames a directory and/or updates its display fields.
    ///
    /// A rename rewrites the paths of every descendant in the same atomic
    /// batch.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: DirectoryId,
        req: UpdateDirectoryRequest,
    ) -> AppResult<Directory> {
        let mut dir = records::fetch_directory(self.store.as_ref(), ctx, id).await?;
        let now = self.clock.now();
        let mut ops: Vec<BatchOp> = Vec::new();

        if let Some(raw_name) = &req.name {
            let new_name = validate_name(raw_name)?;
            if new_name != dir.name {
                if self
                    .sibling_exists(ctx, dir.parent_id, &new_name, Some(dir.id))
                    .await?
                {
                    return Err(AppError::conflict(format!(
                        "A directory named '{new_name}' already exists here"
                    )));
                }

                let old_path = dir.path.clone();
                dir.name = new_name;
                dir.path = format!("{}/{}", path::parent_of(&old_path), dir.name);

                for mut descendant in self.load_descendants(ctx, &old_path).await? {
                    let (new_path, new_level) =
                        path::rewrite_descendant(&old_path, &dir.path, &descendant.path);
                    descendant.path = new_path;
                    descendant.level = new_level;
                    descendant.updated_at = now;
                    ops.push(BatchOp::put(
                        directory::COLLECTION,
                        descendant.id.to_string(),
                        records::encode(&descendant)?,
                    ));
                }
            }
        }

        if let Some(color) = req.color {
            dir.color = Some(color);
        }
        if let Some(icon) = req.icon {
            dir.icon = Some(icon);
        }
        dir.updated_at = now;

        ops.push(BatchOp::put(
            directory::COLLECTION,
            dir.id.to_string(),
            records::encode(&dir)?,
        ));
        self.store.batch(ops).await?;

        info!(
            user_id = %ctx.user_id,
            directory_id = %dir.id,
            path = %dir.path,
            "Directory updated"
        );

        Ok(dir)
    }

    /// Deletes a directory with all its descendants and their documents.
    pub async fn delete(&self, ctx: &RequestContext, id: DirectoryId) -> AppResult<DeleteOutcome> {
        let dir = records::fetch_directory(self.store.as_ref(), ctx, id).await?;
        let descendants = self.load_descendants(ctx, &dir.path).await?;

        let mut subtree = Vec::with_capacity(descendants.len() + 1);
        subtree.push(dir.clone());
        subtree.extend(descendants);

        // Contained documents go first, through the document collaborator.
        let mut document_ids: Vec<DocumentId> = Vec::new();
        for node in &subtree {
            let docs = self
                .documents
                .list_by_directory(ctx.user_id, Some(node.id))
                .await?;
            document_ids.extend(docs.into_iter().map(|d| d.id));
        }
        let deleted_document_count = self.documents.delete_many(&document_ids).await?;

        let mut ops: Vec<BatchOp> = subtree
            .iter()
            .map(|node| BatchOp::delete(directory::COLLECTION, node.id.to_string()))
            .collect();

        // Strip back-references from attached rules so the Rule↔Directory
        // symmetry invariant survives the deletion.
        ops.extend(self.rule_detach_ops(ctx, &subtree).await?);

        // Only the direct child relationship affects a surviving count.
        if let Some(parent_id) = dir.parent_id {
            ops.push(BatchOp::increment(
                directory::COLLECTION,
                parent_id.to_string(),
                "child_count",
                -1,
            ));
        }

        self.store.batch(ops).await?;

        info!(
            user_id = %ctx.user_id,
            directory_id = %dir.id,
            path = %dir.path,
            directories = subtree.len(),
            documents = deleted_document_count,
            "Directory deleted"
        );

        Ok(DeleteOutcome {
            deleted_directory_count: subtree.len() as u64,
            deleted_document_count,
        })
    }

    /// Moves a directory under a new parent (None = to root level),
    /// rewriting every descendant path in one atomic batch.
    pub async fn move_directory(
        &self,
        ctx: &RequestContext,
        id: DirectoryId,
        new_parent_id: Option<DirectoryId>,
    ) -> AppResult<MoveOutcome> {
        let mut dir = records::fetch_directory(self.store.as_ref(), ctx, id).await?;
        let descendants = self.load_descendants(ctx, &dir.path).await?;

        // Levels below the moved node itself; the deepest descendant
        // must also land under the depth limit.
        let subtree_height = descendants
            .iter()
            .map(|d| d.level - dir.level)
            .max()
            .unwrap_or(0);

        let target = match new_parent_id {
            Some(target_id) => {
                if target_id == id {
                    return Err(AppError::invalid_operation(
                        "Cannot move a directory into itself",
                    ));
                }
                let target = records::fetch_directory(self.store.as_ref(), ctx, target_id).await?;
                if target.path.starts_with(&format!("{}/", dir.path)) {
                    return Err(AppError::invalid_operation(
                        "Cannot move a directory into its own subtree",
                    ));
                }
                if target.level + 1 + subtree_height >= limits::MAX_DEPTH {
                    return Err(AppError::depth_exceeded(format!(
                        "Maximum directory depth of {} reached",
                        limits::MAX_DEPTH
                    )));
                }
                Some(target)
            }
            None => None,
        };

        if self
            .sibling_exists(ctx, new_parent_id, &dir.name, Some(dir.id))
            .await?
        {
            return Err(AppError::conflict(format!(
                "A directory named '{}' already exists at the destination",
                dir.name
            )));
        }

        let old_path = dir.path.clone();
        let old_parent_id = dir.parent_id;
        let parent_changed = old_parent_id != new_parent_id;

        // Recompute from the stored target values, post-validation.
        let (new_path, new_level) =
            path::child_path(target.as_ref().map(|t| (t.path.as_str(), t.level)), &dir.name);

        let now = self.clock.now();
        dir.parent_id = new_parent_id;
        dir.path = new_path;
        dir.level = new_level;
        dir.updated_at = now;

        let mut ops = vec![BatchOp::put(
            directory::COLLECTION,
            dir.id.to_string(),
            records::encode(&dir)?,
        )];

        let affected = descendants.len() as u64;
        for mut descendant in descendants {
            let (new_path, new_level) =
                path::rewrite_descendant(&old_path, &dir.path, &descendant.path);
            descendant.path = new_path;
            descendant.level = new_level;
            descendant.updated_at = now;
            ops.push(BatchOp::put(
                directory::COLLECTION,
                descendant.id.to_string(),
                records::encode(&descendant)?,
            ));
        }

        if parent_changed {
            if let Some(old_parent) = old_parent_id {
                ops.push(BatchOp::increment(
                    directory::COLLECTION,
                    old_parent.to_string(),
                    "child_count",
                    -1,
                ));
            }
            if let Some(new_parent) = new_parent_id {
                ops.push(BatchOp::increment(
                    directory::COLLECTION,
                    new_parent.to_string(),
                    "child_count",
                    1,
                ));
            }
        }

        self.store.batch(ops).await?;

        info!(
            user_id = %ctx.user_id,
            directory_id = %dir.id,
            path = %dir.path,
            affected_descendants = affected,
            "Directory moved"
        );

        Ok(MoveOutcome {
            directory: dir,
            affected_descendant_count: affected,
        })
    }

    /// Lists a directory's direct children and documents.
    ///
    /// A directory id that no longer resolves falls back to root-level
    /// contents instead of failing; stale references are treated as
    /// "moved to root".
    pub async fn contents(
        &self,
        ctx: &RequestContext,
        directory_id: Option<DirectoryId>,
    ) -> AppResult<DirectoryContents> {
        let resolved = match directory_id {
            Some(id) => match records::fetch_directory(self.store.as_ref(), ctx, id).await {
                Ok(dir) => Some(dir),
                Err(e) if e.is_kind(ErrorKind::NotFound) => {
                    debug!(
                        user_id = %ctx.user_id,
                        directory_id = %id,
                        "Stale directory reference, listing root contents"
                    );
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };

        let parent_filter = match resolved.as_ref() {
            Some(dir) => Filter::eq("parent_id", dir.id.to_string()),
            None => Filter::is_null("parent_id"),
        };
        let child_records = self
            .store
            .query(
                directory::COLLECTION,
                Query::new()
                    .filter(Filter::eq("owner_id", ctx.user_id.to_string()))
                    .filter(parent_filter)
                    .order_by("name"),
            )
            .await?;
        let directories = child_records
            .into_iter()
            .map(records::decode)
            .collect::<AppResult<Vec<Directory>>>()?;

        let documents = self
            .documents
            .list_by_directory(ctx.user_id, resolved.as_ref().map(|d| d.id))
            .await?;

        Ok(DirectoryContents {
            directory: resolved,
            directories,
            documents,
        })
    }

    /// Load and decode every descendant of the given path.
    async fn load_descendants(
        &self,
        ctx: &RequestContext,
        prefix: &str,
    ) -> AppResult<Vec<Directory>> {
        let records = self
            .store
            .find_by_path_prefix(
                directory::COLLECTION,
                "owner_id",
                &ctx.user_id.to_string(),
                prefix,
            )
            .await?;
        records.into_iter().map(records::decode).collect()
    }

    /// Check whether a sibling with the given name already exists.
    async fn sibling_exists(
        &self,
        ctx: &RequestContext,
        parent_id: Option<DirectoryId>,
        name: &str,
        exclude: Option<DirectoryId>,
    ) -> AppResult<bool> {
        let parent_filter = match parent_id {
            Some(id) => Filter::eq("parent_id", id.to_string()),
            None => Filter::is_null("parent_id"),
        };
        let siblings = self
            .store
            .query(
                directory::COLLECTION,
                Query::new()
                    .filter(Filter::eq("owner_id", ctx.user_id.to_string()))
                    .filter(parent_filter)
                    .filter(Filter::eq("name", name)),
            )
            .await?;

        for record in siblings {
            let sibling: Directory = records::decode(record)?;
            if Some(sibling.id) != exclude {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Build batch ops removing the given directories from every rule
    /// they are attached to.
    async fn rule_detach_ops(
        &self,
        ctx: &RequestContext,
        subtree: &[Directory],
    ) -> AppResult<Vec<BatchOp>> {
        let mut rule_ids = Vec::new();
        for node in subtree {
            for rule_id in &node.rule_ids {
                if !rule_ids.contains(rule_id) {
                    rule_ids.push(*rule_id);
                }
            }
        }
        if rule_ids.is_empty() {
            return Ok(Vec::new());
        }

        let now = self.clock.now();
        let mut ops = Vec::with_capacity(rule_ids.len());
        for mut attached in
            records::fetch_rules_chunked(self.store.as_ref(), ctx, &rule_ids).await?
        {
            attached
                .directory_ids
                .retain(|dir_id| !subtree.iter().any(|node| node.id == *dir_id));
            attached.updated_at = now;
            ops.push(BatchOp::put(
                rule::COLLECTION,
                attached.id.to_string(),
                records::encode(&attached)?,
            ));
        }
        Ok(ops)
    }
}
