mod manager;
mod storage;
mod types;

pub use manager::TemplateManager;
pub use storage::{read_index, write_index};
pub use types::{
    CleanupReport, ImportFailure, ImportOptions, ImportReport, NewTemplate, RemoveRootReport,
    Template, TemplateIndex, TemplateUpdate,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Workspace error: {0}")]
    WorkspaceError(#[from] crate::workspace::WorkspaceError),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Template {0} not found")]
    TemplateNotFound(String),

    #[error("Template file not found: {0}")]
    FileNotFound(String),

    #[error("A template for {0} already exists")]
    DuplicateTemplate(String),

    #[error("Unsupported template extension: {0}")]
    UnsupportedExtension(String),

    #[error("Template file {path} exceeds the {limit} byte size limit")]
    FileTooLarge { path: String, limit: u64 },
}
