//! Document collaborator entities.

pub mod catalog;
pub mod model;

pub use catalog::DocumentCatalog;
pub use model::{COLLECTION, Document};
