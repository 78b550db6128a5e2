//! # notehub-store
//!
//! Concrete [`notehub_core::traits::DocumentStore`] backends:
//!
//! - [`MemoryStore`] — in-process store for tests and local development.
//! - [`PostgresStore`] — JSONB records table backed by sqlx/PostgreSQL.
//!
//! Plus schema setup and the store-backed document catalog used for
//! cascade deletion.

pub mod catalog;
pub mod memory;
pub mod postgres;
pub mod schema;

pub use catalog::StoreDocumentCatalog;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
