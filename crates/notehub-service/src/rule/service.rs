//! Rule CRUD and directory attachment with bidirectional bookkeeping.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use notehub_core::error::AppError;
use notehub_core::limits;
use notehub_core::result::AppResult;
use notehub_core::traits::clock::Clock;
use notehub_core::traits::store::{BatchOp, DocumentStore, Filter, Query};
use notehub_core::types::{DirectoryId, RuleId};

use notehub_entity::directory;
use notehub_entity::rule::{self, OperationKind, Rule, RuleColor};

use crate::context::RequestContext;
use crate::records;

/// Manages rule CRUD and rule↔directory attachments.
#[derive(Clone)]
pub struct RuleService {
    /// Document store handle.
    store: Arc<dyn DocumentStore>,
    /// Time source for created/updated stamps.
    clock: Arc<dyn Clock>,
}

/// Request to create a new rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRuleRequest {
    /// Rule name.
    pub name: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// Instruction body.
    pub content: String,
    /// Display color.
    pub color: RuleColor,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Operation types the rule applies to. Must be non-empty.
    pub applicable_to: Vec<OperationKind>,
    /// Whether the rule is pre-selected in pickers.
    #[serde(default)]
    pub is_default: bool,
}

/// Request to update a rule. Only the provided fields change;
/// attachments are managed through attach/detach, never here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRuleRequest {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New content body.
    pub content: Option<String>,
    /// New display color.
    pub color: Option<RuleColor>,
    /// New tag set.
    pub tags: Option<Vec<String>>,
    /// New applicability set. Must be non-empty when provided.
    pub applicable_to: Option<Vec<OperationKind>>,
    /// New default flag.
    pub is_default: Option<bool>,
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Rule name cannot be empty"));
    }
    if name.chars().count() > limits::MAX_RULE_NAME_LEN {
        return Err(AppError::validation(format!(
            "Rule name exceeds {} characters",
            limits::MAX_RULE_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

fn validate_content(content: &str) -> AppResult<()> {
    if content.chars().count() > limits::MAX_RULE_CONTENT_LEN {
        return Err(AppError::validation(format!(
            "Rule content exceeds {} characters",
            limits::MAX_RULE_CONTENT_LEN
        )));
    }
    Ok(())
}

fn validate_applicability(applicable_to: &[OperationKind]) -> AppResult<()> {
    if applicable_to.is_empty() {
        return Err(AppError::validation(
            "A rule must apply to at least one operation type",
        ));
    }
    Ok(())
}

impl RuleService {
    /// Creates a new rule service.
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Creates a new rule, not yet attached to any directory.
    pub async fn create(&self, ctx: &RequestContext, req: CreateRuleRequest) -> AppResult<Rule> {
        let name = validate_name(&req.name)?;
        validate_content(&req.content)?;
        validate_applicability(&req.applicable_to)?;

        let now = self.clock.now();
        let new_rule = Rule {
            id: RuleId::new(),
            owner_id: ctx.user_id,
            name,
            description: req.description,
            content: req.content,
            color: req.color,
            tags: req.tags,
            applicable_to: req.applicable_to,
            is_default: req.is_default,
            directory_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.store
            .put(
                rule::COLLECTION,
                &new_rule.id.to_string(),
                records::encode(&new_rule)?,
            )
            .await?;

        info!(
            user_id = %ctx.user_id,
            rule_id = %new_rule.id,
            name = %new_rule.name,
            "Rule created"
        );

        Ok(new_rule)
    }

    /// Gets a rule by ID.
    pub async fn get(&self, ctx: &RequestContext, id: RuleId) -> AppResult<Rule> {
        records::fetch_rule(self.store.as_ref(), ctx, id).await
    }

    /// Lists all of the owner's rules, ordered by name.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<Rule>> {
        let records = self
            .store
            .query(
                rule::COLLECTION,
                Query::new()
                    .filter(Filter::eq("owner_id", ctx.user_id.to_string()))
                    .order_by("name"),
            )
            .await?;
        records.into_iter().map(records::decode).collect()
    }

    /// Batch-fetches rule bodies by id, chunked to the store's multi-get
    /// limit. Missing ids are skipped; result order is unspecified.
    pub async fn get_by_ids(&self, ctx: &RequestContext, ids: &[RuleId]) -> AppResult<Vec<Rule>> {
        records::fetch_rules_chunked(self.store.as_ref(), ctx, ids).await
    }

    /// Updates a rule's fields.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: RuleId,
        req: UpdateRuleRequest,
    ) -> AppResult<Rule> {
        let mut stored = records::fetch_rule(self.store.as_ref(), ctx, id).await?;

        if let Some(name) = &req.name {
            stored.name = validate_name(name)?;
        }
        if let Some(description) = req.description {
            stored.description = description;
        }
        if let Some(content) = req.content {
            validate_content(&content)?;
            stored.content = content;
        }
        if let Some(color) = req.color {
            stored.color = color;
        }
        if let Some(tags) = req.tags {
            stored.tags = tags;
        }
        if let Some(applicable_to) = req.applicable_to {
            validate_applicability(&applicable_to)?;
            stored.applicable_to = applicable_to;
        }
        if let Some(is_default) = req.is_default {
            stored.is_default = is_default;
        }
        stored.updated_at = self.clock.now();

        self.store
            .put(
                rule::COLLECTION,
                &stored.id.to_string(),
                records::encode(&stored)?,
            )
            .await?;

        info!(user_id = %ctx.user_id, rule_id = %stored.id, "Rule updated");

        Ok(stored)
    }

    /// Deletes a rule.
    ///
    /// Refused with a `Conflict` while the rule is still attached to any
    /// directory; the caller must detach first. This is a reported,
    /// recoverable condition.
    pub async fn delete(&self, ctx: &RequestContext, id: RuleId) -> AppResult<()> {
        let stored = records::fetch_rule(self.store.as_ref(), ctx, id).await?;

        if !stored.directory_ids.is_empty() {
            return Err(AppError::conflict(format!(
                "Rule is attached to {} directorie(s); detach it before deleting",
                stored.directory_ids.len()
            )));
        }

        self.store
            .delete(rule::COLLECTION, &stored.id.to_string())
            .await?;

        info!(user_id = %ctx.user_id, rule_id = %stored.id, "Rule deleted");

        Ok(())
    }

    /// Attaches a rule to a directory, updating both sides in one atomic
    /// batch. Idempotent.
    pub async fn attach_to_directory(
        &self,
        ctx: &RequestContext,
        rule_id: RuleId,
        directory_id: DirectoryId,
    ) -> AppResult<()> {
        let mut stored = records::fetch_rule(self.store.as_ref(), ctx, rule_id).await?;
        let mut dir = records::fetch_directory(self.store.as_ref(), ctx, directory_id).await?;

        if stored.is_attached_to(directory_id) && dir.has_rule(rule_id) {
            return Ok(());
        }

        let now = self.clock.now();
        if !stored.is_attached_to(directory_id) {
            stored.directory_ids.push(directory_id);
        }
        if !dir.has_rule(rule_id) {
            dir.rule_ids.push(rule_id);
        }
        stored.updated_at = now;
        dir.updated_at = now;

        self.store
            .batch(vec![
                BatchOp::put(
                    rule::COLLECTION,
                    stored.id.to_string(),
                    records::encode(&stored)?,
                ),
                BatchOp::put(
                    directory::COLLECTION,
                    dir.id.to_string(),
                    records::encode(&dir)?,
                ),
            ])
            .await?;

        info!(
            user_id = %ctx.user_id,
            rule_id = %rule_id,
            directory_id = %directory_id,
            "Rule attached to directory"
        );

        Ok(())
    }

    /// Detaches a rule from a directory, updating both sides in one
    /// atomic batch. Idempotent.
    pub async fn detach_from_directory(
        &self,
        ctx: &RequestContext,
        rule_id: RuleId,
        directory_id: DirectoryId,
    ) -> AppResult<()> {
        let mut stored = records::fetch_rule(self.store.as_ref(), ctx, rule_id).await?;
        let mut dir = records::fetch_directory(self.store.as_ref(), ctx, directory_id).await?;

        if !stored.is_attached_to(directory_id) && !dir.has_rule(rule_id) {
            return Ok(());
        }

        let now = self.clock.now();
        stored.directory_ids.retain(|d| *d != directory_id);
        dir.rule_ids.retain(|r| *r != rule_id);
        stored.updated_at = now;
        dir.updated_at = now;

        self.store
            .batch(vec![
                BatchOp::put(
                    rule::COLLECTION,
                    stored.id.to_string(),
                    records::encode(&stored)?,
                ),
                BatchOp::put(
                    directory::COLLECTION,
                    dir.id.to_string(),
                    records::encode(&dir)?,
                ),
            ])
            .await?;

        info!(
            user_id = %ctx.user_id,
            rule_id = %rule_id,
            directory_id = %directory_id,
            "Rule detached from directory"
        );

        Ok(())
    }

    /// Returns the sorted set of distinct tags across the owner's rules.
    pub async fn tags(&self, ctx: &RequestContext) -> AppResult<Vec<String>> {
        let rules = self.list(ctx).await?;
        let tags: BTreeSet<String> = rules.into_iter().flat_map(|r| r.tags).collect();
        Ok(tags.into_iter().collect())
    }
}
