//! Shared type definitions.

pub mod id;

pub use id::{DirectoryId, DocumentId, RuleId, UserId};
