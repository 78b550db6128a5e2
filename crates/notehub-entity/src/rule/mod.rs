//! Rule domain entities.

pub mod model;
pub mod resolution;

pub use model::{COLLECTION, OperationKind, Rule, RuleColor};
pub use resolution::{ApplicableRules, ResolvedRule, ResolvedRules};
