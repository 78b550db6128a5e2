//! Rule cascade resolution.
//!
//! Given a directory, walks its ancestor chain, aggregates the rules
//! attached anywhere along it, and produces a deterministically ordered
//! result: ancestor-level rules come before directory-local ones, so
//! prompts see governance rules first.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use notehub_core::result::AppResult;
use notehub_core::traits::store::DocumentStore;
use notehub_core::types::{DirectoryId, RuleId};

use notehub_entity::directory::Directory;
use notehub_entity::rule::{ApplicableRules, OperationKind, ResolvedRule, ResolvedRules, Rule};

use crate::context::RequestContext;
use crate::records;

/// Resolves which rules apply to a directory, including inherited ones.
///
/// Read-only: never mutates directories or rules.
#[derive(Clone)]
pub struct ResolutionService {
    /// Document store handle.
    store: Arc<dyn DocumentStore>,
}

impl ResolutionService {
    /// Creates a new resolution service.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Resolves the rules applying to a directory.
    ///
    /// The result is sorted by `(hierarchy_level asc, name asc
    /// case-insensitive, id asc)`. `hierarchy_level` is the index in the
    /// root-first chain of the **shallowest** directory a rule is attached
    /// to, so a rule attached at the root keeps its root-level position
    /// even when it is also attached further down.
    pub async fn resolve_for_directory(
        &self,
        ctx: &RequestContext,
        directory_id: DirectoryId,
        operation: Option<OperationKind>,
    ) -> AppResult<ResolvedRules> {
        let target = records::fetch_directory(self.store.as_ref(), ctx, directory_id).await?;
        let mut chain = records::ancestor_chain(self.store.as_ref(), ctx, &target).await?;
        chain.push(target);

        // Union of directly attached rule ids across the chain,
        // first-seen order.
        let mut all_rule_ids: Vec<RuleId> = Vec::new();
        for dir in &chain {
            for rule_id in &dir.rule_ids {
                if !all_rule_ids.contains(rule_id) {
                    all_rule_ids.push(*rule_id);
                }
            }
        }

        if all_rule_ids.is_empty() {
            let mut result = ResolvedRules::empty();
            for dir in &chain {
                result.inheritance.insert(dir.id, Vec::new());
            }
            return Ok(result);
        }

        let mut rules =
            records::fetch_rules_chunked(self.store.as_ref(), ctx, &all_rule_ids).await?;
        if let Some(operation) = operation {
            rules.retain(|r| r.applies_to(operation));
        }

        // For each rule, the shallowest chain index it is attached at.
        // Scanning root-first means ties resolve toward the ancestor.
        let mut hierarchy: HashMap<RuleId, usize> = HashMap::new();
        for (idx, dir) in chain.iter().enumerate() {
            for rule_id in &dir.rule_ids {
                hierarchy.entry(*rule_id).or_insert(idx);
            }
        }

        rules.sort_by(|a, b| {
            let level_a = hierarchy.get(&a.id).copied().unwrap_or(0);
            let level_b = hierarchy.get(&b.id).copied().unwrap_or(0);
            level_a
                .cmp(&level_b)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                .then_with(|| a.id.cmp(&b.id))
        });

        let inheritance = inheritance_map(&chain, &rules);

        let resolved = rules
            .into_iter()
            .map(|rule| {
                let level = hierarchy.get(&rule.id).copied().unwrap_or(0);
                let source = &chain[level];
                ResolvedRule {
                    hierarchy_level: level,
                    source_directory_id: source.id,
                    source_path: source.path.clone(),
                    rule,
                }
            })
            .collect();

        debug!(
            user_id = %ctx.user_id,
            directory_id = %directory_id,
            chain_len = chain.len(),
            "Resolved rule cascade"
        );

        Ok(ResolvedRules {
            rules: resolved,
            inheritance,
        })
    }

    /// Resolves the rules applicable to an operation plus the ids of
    /// rules flagged as defaults (pre-selected in rule pickers).
    pub async fn applicable_rules(
        &self,
        ctx: &RequestContext,
        directory_id: DirectoryId,
        operation: OperationKind,
    ) -> AppResult<ApplicableRules> {
        let resolved = self
            .resolve_for_directory(ctx, directory_id, Some(operation))
            .await?;

        let default_rule_ids = resolved
            .rules
            .iter()
            .filter(|r| r.rule.is_default)
            .map(|r| r.rule.id)
            .collect();

        Ok(ApplicableRules {
            rules: resolved.rules,
            default_rule_ids,
        })
    }

    /// Non-cascading variant: only the directory's own rules, resolved to
    /// bodies and sorted by name then id.
    pub async fn direct_rules(
        &self,
        ctx: &RequestContext,
        directory_id: DirectoryId,
    ) -> AppResult<Vec<Rule>> {
        let dir = records::fetch_directory(self.store.as_ref(), ctx, directory_id).await?;
        let mut rules =
            records::fetch_rules_chunked(self.store.as_ref(), ctx, &dir.rule_ids).await?;
        rules.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(rules)
    }
}

/// For every chain directory, the resolved rules attached directly at it,
/// in final resolution order.
fn inheritance_map(
    chain: &[Directory],
    rules: &[Rule],
) -> HashMap<DirectoryId, Vec<RuleId>> {
    chain
        .iter()
        .map(|dir| {
            let attached: Vec<RuleId> = rules
                .iter()
                .filter(|r| dir.rule_ids.contains(&r.id))
                .map(|r| r.id)
                .collect();
            (dir.id, attached)
        })
        .collect()
}
