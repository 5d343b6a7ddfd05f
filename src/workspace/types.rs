use crate::security::AccessZone;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved id of the application's own project-root workspace. This
/// workspace is created at startup and can never be removed.
pub const PROJECT_ROOT_ID: &str = "project-root";

/// Schema version of the persisted registry document
pub const REGISTRY_VERSION: u32 = 1;

/// An approved root directory plus its security zone and access metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,

    /// Normalized absolute path; unique among workspaces.
    pub path: String,

    pub zone: AccessZone,

    /// Human-readable name shown in the UI
    pub label: String,

    /// Gate on write operations inside this workspace
    #[serde(default)]
    pub readonly: bool,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub added_at: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_access: DateTime<Utc>,

    #[serde(default)]
    pub access_count: u64,
}

/// The persisted workspace document, overwritten wholesale on every
/// mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceRegistry {
    pub version: u32,

    pub workspaces: Vec<Workspace>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl WorkspaceRegistry {
    pub fn new() -> Self {
        Self {
            version: REGISTRY_VERSION,
            workspaces: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

impl Default for WorkspaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of an access check. Always a plain value; a denial is an
/// expected outcome of normal use, never an error.
#[derive(Debug, Clone)]
pub struct AccessDecision {
    pub allowed: bool,
    pub zone: Option<AccessZone>,
    pub workspace_id: Option<String>,
    /// Set when denied
    pub reason: Option<String>,
}

impl AccessDecision {
    pub fn granted(workspace: &Workspace) -> Self {
        Self {
            allowed: true,
            zone: Some(workspace.zone),
            workspace_id: Some(workspace.id.clone()),
            reason: None,
        }
    }

    pub fn granted_zone(zone: AccessZone, workspace_id: Option<String>) -> Self {
        Self {
            allowed: true,
            zone: Some(zone),
            workspace_id,
            reason: None,
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            zone: None,
            workspace_id: None,
            reason: Some(reason.into()),
        }
    }
}

/// Result of a successful workspace access request.
#[derive(Debug, Clone)]
pub struct AccessGrant {
    pub workspace_id: String,
    pub zone: AccessZone,
    /// False when the path was already registered
    pub created: bool,
}
