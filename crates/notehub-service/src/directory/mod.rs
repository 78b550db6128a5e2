//! Directory tree maintenance services.

pub mod path;
pub mod service;
pub mod tree;

pub use service::{
    CreateDirectoryRequest, DeleteOutcome, DirectoryContents, DirectoryService, MoveOutcome,
    UpdateDirectoryRequest,
};
pub use tree::TreeService;
