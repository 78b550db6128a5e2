//! Directory domain entities.

pub mod model;
pub mod tree;

pub use model::{COLLECTION, Directory};
pub use tree::{DirectoryForest, DirectoryNode};
