//! # notehub-service
//!
//! Business logic service layer for NoteHub: directory tree maintenance
//! (materialized paths, cascade moves and deletes) and rule cascade
//! resolution (ancestor-inherited prompt rules).
//!
//! Services follow constructor injection — the document store, document
//! catalog, and clock are provided at construction time via `Arc`
//! references. No global state.

pub mod context;
pub mod directory;
pub mod rule;

mod records;

pub use context::RequestContext;
pub use directory::{DirectoryService, TreeService};
pub use rule::{PromptFormatter, ResolutionService, RuleService};
