//! Rule entity model and enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use notehub_core::types::{DirectoryId, RuleId, UserId};

/// Store collection holding rule records.
pub const COLLECTION: &str = "rules";

/// The operation types a rule can apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Web content scraping.
    Scraping,
    /// Document upload processing.
    Upload,
    /// Free-form AI prompting.
    Prompt,
    /// Quiz generation.
    Quiz,
    /// Follow-up question generation.
    Followup,
}

impl OperationKind {
    /// Return the operation kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scraping => "scraping",
            Self::Upload => "upload",
            Self::Prompt => "prompt",
            Self::Quiz => "quiz",
            Self::Followup => "followup",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Display color of a rule chip in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleColor {
    /// Blue.
    Blue,
    /// Green.
    Green,
    /// Red.
    Red,
    /// Yellow.
    Yellow,
    /// Purple.
    Purple,
    /// Orange.
    Orange,
    /// Pink.
    Pink,
    /// Gray.
    Gray,
}

impl RuleColor {
    /// Return the color as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Orange => "orange",
            Self::Pink => "pink",
            Self::Gray => "gray",
        }
    }
}

impl std::fmt::Display for RuleColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reusable instruction block injected into AI prompts.
///
/// Rules are created standalone and attached to directories afterwards;
/// `directory_ids` and each referenced directory's `rule_ids` are kept
/// symmetric by the service layer's atomic attach/detach batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule identifier.
    pub id: RuleId,
    /// The rule owner.
    pub owner_id: UserId,
    /// Rule name.
    pub name: String,
    /// Short human-readable description.
    pub description: String,
    /// The instruction body injected into prompts.
    pub content: String,
    /// Display color.
    pub color: RuleColor,
    /// Free-form tags for filtering.
    pub tags: Vec<String>,
    /// Operation types this rule applies to. Never empty.
    pub applicable_to: Vec<OperationKind>,
    /// Whether this rule is pre-selected in rule pickers.
    pub is_default: bool,
    /// Directories this rule is attached to (set semantics).
    pub directory_ids: Vec<DirectoryId>,
    /// When the rule was created.
    pub created_at: DateTime<Utc>,
    /// When the rule was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Rule {
    /// Check if this rule applies to the given operation.
    pub fn applies_to(&self, operation: OperationKind) -> bool {
        self.applicable_to.contains(&operation)
    }

    /// Check if this rule is attached to the given directory.
    pub fn is_attached_to(&self, directory_id: DirectoryId) -> bool {
        self.directory_ids.contains(&directory_id)
    }
}
