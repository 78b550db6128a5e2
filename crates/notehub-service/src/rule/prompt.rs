//! Rendering of selected rules into a prompt-injectable text block.

use std::collections::HashMap;
use std::sync::Arc;

use notehub_core::error::ErrorKind;
use notehub_core::result::AppResult;
use notehub_core::traits::store::DocumentStore;
use notehub_core::types::RuleId;

use notehub_entity::rule::Rule;

use crate::context::RequestContext;
use crate::records;

const BANNER: &str = "==================================================";

/// Renders a caller-selected rule subset as numbered text blocks.
///
/// Ordering here is the caller's: the hierarchy sort happens inside
/// resolution, not formatting, so callers may reorder or subset freely.
#[derive(Clone)]
pub struct PromptFormatter {
    /// Document store handle.
    store: Arc<dyn DocumentStore>,
}

impl PromptFormatter {
    /// Creates a new prompt formatter.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Formats the given rules into a delimited text block.
    ///
    /// Returns an empty string (no banner) when `rule_ids` is empty or
    /// none of the ids resolve — callers treat that as "no rules to
    /// inject". Each block is numbered in input order and tagged with the
    /// rule's origin directory label.
    pub async fn format(&self, ctx: &RequestContext, rule_ids: &[RuleId]) -> AppResult<String> {
        if rule_ids.is_empty() {
            return Ok(String::new());
        }

        let fetched = records::fetch_rules_chunked(self.store.as_ref(), ctx, rule_ids).await?;
        let by_id: HashMap<RuleId, Rule> =
            fetched.into_iter().map(|r| (r.id, r)).collect();

        let mut blocks: Vec<String> = Vec::new();
        for rule_id in rule_ids {
            let Some(rule) = by_id.get(rule_id) else {
                continue;
            };
            let origin = self.origin_label(ctx, rule).await?;
            blocks.push(format!(
                "RULE #{} [{}] {}\n{}",
                blocks.len() + 1,
                origin,
                rule.name,
                rule.content
            ));
        }

        if blocks.is_empty() {
            return Ok(String::new());
        }

        let mut out = String::new();
        out.push_str(BANNER);
        out.push_str("\nCUSTOM RULES\n");
        out.push_str(BANNER);
        out.push_str("\n\n");
        out.push_str(&blocks.join("\n\n"));
        out.push_str("\n\n");
        out.push_str(BANNER);
        out.push_str("\nEND CUSTOM RULES\n");
        out.push_str(BANNER);
        out.push('\n');
        Ok(out)
    }

    /// The display path of the rule's first attached directory, or a
    /// placeholder when the rule is unattached or the reference is stale.
    async fn origin_label(&self, ctx: &RequestContext, rule: &Rule) -> AppResult<String> {
        let Some(directory_id) = rule.directory_ids.first() else {
            return Ok("(unattached)".to_string());
        };
        match records::fetch_directory(self.store.as_ref(), ctx, *directory_id).await {
            Ok(dir) => Ok(dir.path),
            Err(e) if e.is_kind(ErrorKind::NotFound) => Ok("(unattached)".to_string()),
            Err(e) => Err(e),
        }
    }
}
