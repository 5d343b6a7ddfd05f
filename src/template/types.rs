use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata record describing one on-disk HTML template file.
///
/// The file itself is the source of truth for content and is never
/// embedded in the metadata document. `id` and `file_path` are immutable
/// after creation, and at most one record exists per distinct `file_path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,

    /// Normalized absolute path to the backing file
    pub file_path: String,

    pub name: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,

    /// Path relative to the imported folder, captured at import time so the
    /// original hierarchy survives moves of the absolute root.
    #[serde(default)]
    pub relative_path: String,

    /// Parent folder fragment of `relative_path`, used for UI grouping.
    #[serde(default)]
    pub folder_path: String,

    /// Snapshot of filesystem stat data, refreshed by sync
    pub file_size: u64,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_modified: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// The persisted template metadata document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateIndex {
    pub templates: Vec<Template>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
}

impl TemplateIndex {
    pub fn new() -> Self {
        Self {
            templates: Vec::new(),
            last_updated: Utc::now(),
        }
    }
}

impl Default for TemplateIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// User-supplied classification for a new template. Unset fields fall back
/// to values derived from the file path.
#[derive(Debug, Clone, Default)]
pub struct NewTemplate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
    /// Set by folder import to preserve the original hierarchy
    pub relative_path: Option<String>,
    pub folder_path: Option<String>,
}

/// Classification updates for an existing template. `id` and `file_path`
/// cannot be changed.
#[derive(Debug, Clone, Default)]
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub description: Option<String>,
}

/// Options for a folder import.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub recursive: bool,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            category: None,
            tags: Vec::new(),
        }
    }
}

/// A single file that could not be imported. Collected rather than
/// aborting the whole import.
#[derive(Debug, Clone)]
pub struct ImportFailure {
    pub path: String,
    pub error: String,
}

/// Outcome of a folder import; partial success is the expected result of
/// walking an arbitrary directory tree.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub imported: Vec<Template>,
    pub failed: Vec<ImportFailure>,
}

/// Records dropped because their backing file disappeared out-of-band.
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    pub removed: Vec<Template>,
}

/// Outcome of cascading removal of an allowed root.
#[derive(Debug, Clone)]
pub struct RemoveRootReport {
    pub workspace_removed: bool,
    pub templates_removed: usize,
}
