use crate::paths::is_within;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Conventional directories under the home directory that are considered
/// safe user territory.
const USER_WORKSPACE_DIRS: &[&str] = &["Documents", "Desktop", "Projects", "Workspace"];

/// Coarse trust classification for an approved directory.
///
/// The zone flags sensitive access for the caller; it never strictly gates
/// it. Restricted access is granted with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessZone {
    ProjectOnly,
    UserWorkspace,
    Restricted,
}

impl AccessZone {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessZone::ProjectOnly => "project-only",
            AccessZone::UserWorkspace => "user-workspace",
            AccessZone::Restricted => "restricted",
        }
    }
}

impl fmt::Display for AccessZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a normalized path against the project root and the user's
/// conventional directories. Pure string computation.
pub fn classify_zone(path: &Path, project_root: &Path, home: &Path) -> AccessZone {
    if is_within(path, project_root) {
        return AccessZone::ProjectOnly;
    }

    for dir in USER_WORKSPACE_DIRS {
        if is_within(path, &home.join(dir)) {
            return AccessZone::UserWorkspace;
        }
    }

    AccessZone::Restricted
}
