mod manager;
mod storage;
mod types;

pub use manager::WorkspaceManager;
pub use storage::{read_registry, write_registry};
pub use types::{
    AccessDecision, AccessGrant, Workspace, WorkspaceRegistry, PROJECT_ROOT_ID, REGISTRY_VERSION,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Path contains a directory traversal sequence")]
    TraversalRejected,

    #[error("Path is inside the blocked system location {0}")]
    BlockedPath(String),

    #[error("Workspace limit reached ({0} allowed at the current security level)")]
    LimitReached(usize),

    #[error("Path does not exist or is not a directory: {0}")]
    NotADirectory(String),
}
