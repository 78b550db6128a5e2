//! Ephemeral results of rule cascade resolution. Never persisted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use notehub_core::types::{DirectoryId, RuleId};

use super::model::Rule;

/// A rule together with where in the ancestor chain it was picked up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedRule {
    /// The rule body.
    pub rule: Rule,
    /// Index in the root-first ancestor chain of the shallowest directory
    /// the rule is attached to (0 = chain root). Ties between an ancestor
    /// and a descendant attachment resolve toward the ancestor.
    pub hierarchy_level: usize,
    /// The directory the rule was inherited from.
    pub source_directory_id: DirectoryId,
    /// Display path of the source directory.
    pub source_path: String,
}

/// The full outcome of resolving rules for a directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedRules {
    /// Applicable rules, sorted ancestor-first then by name
    /// (case-insensitive) then by id.
    pub rules: Vec<ResolvedRule>,
    /// For every directory in the ancestor chain, the ids of the resolved
    /// rules attached directly at that directory. Lets a UI show where
    /// each inherited rule comes from.
    pub inheritance: HashMap<DirectoryId, Vec<RuleId>>,
}

impl ResolvedRules {
    /// An empty resolution (directory with no rules anywhere in its chain).
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            inheritance: HashMap::new(),
        }
    }
}

/// Resolution output for rule pickers: the applicable rules plus the ids
/// of rules flagged as defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicableRules {
    /// Applicable rules in resolution order.
    pub rules: Vec<ResolvedRule>,
    /// Ids of rules flagged `is_default`, in resolution order.
    pub default_rule_ids: Vec<RuleId>,
}
