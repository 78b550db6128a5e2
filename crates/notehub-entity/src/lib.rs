//! # notehub-entity
//!
//! Domain entity models for NoteHub. Every struct in this crate represents
//! a stored record or a domain value object. All entities derive `Debug`,
//! `Clone`, `Serialize`, and `Deserialize`; their serde output is exactly
//! the shape persisted in the document store.

pub mod directory;
pub mod document;
pub mod rule;
