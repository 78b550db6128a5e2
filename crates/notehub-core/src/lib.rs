//! # notehub-core
//!
//! Core crate for NoteHub. Contains the store abstraction traits,
//! configuration schemas, typed identifiers, domain limits, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other NoteHub crates.

pub mod config;
pub mod error;
pub mod limits;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
