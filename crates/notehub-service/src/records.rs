//! Crate-internal record access helpers shared by the services.
//!
//! Ownership checks live here: a record that exists but belongs to a
//! different user is reported as `NotFound`, indistinguishable from a
//! missing record, so callers cannot probe other users' data.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use notehub_core::error::AppError;
use notehub_core::result::AppResult;
use notehub_core::traits::store::DocumentStore;
use notehub_core::types::{DirectoryId, RuleId};

use notehub_entity::directory::{self, Directory};
use notehub_entity::rule::{self, Rule};

use crate::context::RequestContext;

/// Serialize an entity into its stored record shape.
pub(crate) fn encode<T: Serialize>(entity: &T) -> AppResult<Value> {
    serde_json::to_value(entity).map_err(Into::into)
}

/// Deserialize a stored record back into an entity.
pub(crate) fn decode<T: DeserializeOwned>(record: Value) -> AppResult<T> {
    serde_json::from_value(record).map_err(Into::into)
}

/// Load a directory, enforcing ownership.
pub(crate) async fn fetch_directory(
    store: &dyn DocumentStore,
    ctx: &RequestContext,
    id: DirectoryId,
) -> AppResult<Directory> {
    let record = store
        .get(directory::COLLECTION, &id.to_string())
        .await?
        .ok_or_else(|| AppError::not_found("Directory not found"))?;
    let dir: Directory = decode(record)?;
    if dir.owner_id != ctx.user_id {
        return Err(AppError::not_found("Directory not found"));
    }
    Ok(dir)
}

/// Load a rule, enforcing ownership.
pub(crate) async fn fetch_rule(
    store: &dyn DocumentStore,
    ctx: &RequestContext,
    id: RuleId,
) -> AppResult<Rule> {
    let record = store
        .get(rule::COLLECTION, &id.to_string())
        .await?
        .ok_or_else(|| AppError::not_found("Rule not found"))?;
    let rule: Rule = decode(record)?;
    if rule.owner_id != ctx.user_id {
        return Err(AppError::not_found("Rule not found"));
    }
    Ok(rule)
}

/// Batch-fetch rule bodies, transparently chunking to the store's
/// multi-get limit. Duplicate ids are fetched once; missing ids and rules
/// owned by other users are skipped. Result order is unspecified.
pub(crate) async fn fetch_rules_chunked(
    store: &dyn DocumentStore,
    ctx: &RequestContext,
    ids: &[RuleId],
) -> AppResult<Vec<Rule>> {
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let s = id.to_string();
        if !unique.contains(&s) {
            unique.push(s);
        }
    }

    let mut rules = Vec::with_capacity(unique.len());
    for chunk in unique.chunks(store.in_query_limit()) {
        for record in store.get_many(rule::COLLECTION, chunk).await? {
            let rule: Rule = decode(record)?;
            if rule.owner_id == ctx.user_id {
                rules.push(rule);
            }
        }
    }
    Ok(rules)
}

/// Walk `parent_id` links up to the root and return the ancestors
/// root-first, excluding `directory` itself.
///
/// A parent reference that fails to resolve ends the walk (treated as a
/// root); revisiting an id ends it too, so a corrupt parent link cannot
/// loop forever.
pub(crate) async fn ancestor_chain(
    store: &dyn DocumentStore,
    ctx: &RequestContext,
    directory: &Directory,
) -> AppResult<Vec<Directory>> {
    let mut ancestors: Vec<Directory> = Vec::new();
    let mut seen: Vec<DirectoryId> = vec![directory.id];
    let mut next = directory.parent_id;

    while let Some(parent_id) = next {
        if seen.contains(&parent_id) {
            break;
        }
        seen.push(parent_id);

        match fetch_directory(store, ctx, parent_id).await {
            Ok(parent) => {
                next = parent.parent_id;
                ancestors.push(parent);
            }
            Err(e) if e.is_kind(notehub_core::error::ErrorKind::NotFound) => break,
            Err(e) => return Err(e),
        }
    }

    ancestors.reverse();
    Ok(ancestors)
}
