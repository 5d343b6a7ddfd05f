use super::storage;
use super::types::{AccessDecision, AccessGrant, Workspace, WorkspaceRegistry, PROJECT_ROOT_ID};
use super::WorkspaceError;
use crate::config::CoreConfig;
use crate::paths::{self, contains_traversal, is_within, normalize_path};
use crate::security::{
    blocked_paths, classify_zone, find_blocked_root, AccessZone, SecurityPolicy,
};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Conventional project sub-directories registered at startup when present
const PROJECT_SUBDIRS: &[&str] = &["templates", "blocks"];

/// Owns the set of approved root directories and evaluates every
/// read/write request against the blocked-path lists and traversal checks.
///
/// Construct one instance per process and share it behind an `Arc`; the
/// in-memory registry is the operational source of truth, the persisted
/// document a best-effort durability mechanism.
pub struct WorkspaceManager {
    project_root: PathBuf,
    registry_path: PathBuf,
    policy: SecurityPolicy,
    home: PathBuf,
    blocked: Vec<PathBuf>,
    registry: RwLock<WorkspaceRegistry>,
}

impl WorkspaceManager {
    /// Load the persisted registry and seed the reserved project-root
    /// workspace, the conventional project sub-directories, and any
    /// configured extra template roots.
    ///
    /// Workspaces whose directory no longer exists are dropped on load.
    pub async fn init(config: &CoreConfig) -> Result<Self, WorkspaceError> {
        let project_root = normalize_path(&config.project_root.to_string_lossy());
        let home = paths::home_dir();
        let blocked = blocked_paths(&home);
        let policy = SecurityPolicy::for_level(config.security_level);

        let mut registry = storage::read_registry(&config.registry_path).await?;

        registry.workspaces.retain(|ws| {
            let present = Path::new(&ws.path).is_dir();
            if !present {
                debug!(
                    "Dropping workspace '{}' ({}): directory no longer exists",
                    ws.label, ws.path
                );
            }
            present
        });

        info!(
            "Workspace registry loaded: {} workspaces, security level {}",
            registry.workspaces.len(),
            policy.level.as_str()
        );

        let manager = Self {
            project_root,
            registry_path: config.registry_path.clone(),
            policy,
            home,
            blocked,
            registry: RwLock::new(registry),
        };

        manager.seed(&config.extra_template_roots).await;

        Ok(manager)
    }

    /// Request standing access to a directory, registering a workspace for
    /// it. Idempotent: re-requesting an already-registered path returns the
    /// existing id.
    ///
    /// Validation failures (traversal, blocked path, workspace limit,
    /// missing directory) come back as typed error values for the caller to
    /// surface as ordinary negative outcomes.
    pub async fn request_access(
        &self,
        raw_path: &str,
        label: Option<&str>,
        readonly: bool,
    ) -> Result<AccessGrant, WorkspaceError> {
        if contains_traversal(raw_path) {
            return Err(WorkspaceError::TraversalRejected);
        }

        let normalized = normalize_path(raw_path);
        if let Some(blocked) = find_blocked_root(&normalized, &self.blocked) {
            return Err(WorkspaceError::BlockedPath(blocked.display().to_string()));
        }

        let normalized_str = normalized.to_string_lossy().into_owned();
        let now = Utc::now();
        let mut registry = self.registry.write().await;

        let mut existing_grant = None;
        if let Some(existing) = registry
            .workspaces
            .iter_mut()
            .find(|ws| ws.path == normalized_str)
        {
            existing.access_count += 1;
            existing.last_access = now;
            existing_grant = Some(AccessGrant {
                workspace_id: existing.id.clone(),
                zone: existing.zone,
                created: false,
            });
        }
        if let Some(grant) = existing_grant {
            registry.updated_at = now;
            self.persist(&registry).await;
            return Ok(grant);
        }

        if registry.workspaces.len() >= self.policy.max_workspaces {
            return Err(WorkspaceError::LimitReached(self.policy.max_workspaces));
        }

        match tokio::fs::metadata(&normalized).await {
            Ok(meta) if meta.is_dir() => {}
            _ => return Err(WorkspaceError::NotADirectory(normalized_str)),
        }

        let zone = classify_zone(&normalized, &self.project_root, &self.home);
        if zone == AccessZone::Restricted {
            warn!(
                "Granting access to restricted path {}{}",
                normalized_str,
                if self.policy.require_confirmation {
                    " without upstream confirmation"
                } else {
                    ""
                }
            );
        }

        let workspace = Workspace {
            id: Uuid::new_v4().to_string(),
            path: normalized_str,
            zone,
            label: label
                .map(str::to_string)
                .unwrap_or_else(|| default_label(&normalized)),
            readonly,
            added_at: now,
            last_access: now,
            access_count: 0,
        };
        let grant = AccessGrant {
            workspace_id: workspace.id.clone(),
            zone,
            created: true,
        };

        info!(
            "Approved workspace '{}' at {} ({})",
            workspace.label, workspace.path, zone
        );
        registry.workspaces.push(workspace);
        registry.updated_at = now;
        self.persist(&registry).await;

        Ok(grant)
    }

    /// Decide whether a path may be accessed. Pure decision: no mutation,
    /// no side effects, safe to call speculatively.
    ///
    /// The checks run in a fixed order: raw-string traversal, blocked
    /// system paths, workspace membership, then the readonly gate for
    /// writes. Blocked-path membership dominates workspace membership.
    pub async fn can_access(&self, raw_path: &str, require_write: bool) -> AccessDecision {
        if contains_traversal(raw_path) {
            return AccessDecision::denied("path contains a directory traversal sequence");
        }

        let normalized = normalize_path(raw_path);
        if let Some(blocked) = find_blocked_root(&normalized, &self.blocked) {
            return AccessDecision::denied(format!(
                "path is inside the blocked system location {}",
                blocked.display()
            ));
        }

        let registry = self.registry.read().await;
        match covering_workspace(&registry.workspaces, &normalized) {
            Some(ws) => {
                if require_write && ws.readonly {
                    let mut decision =
                        AccessDecision::denied(format!("workspace '{}' is read-only", ws.label));
                    decision.zone = Some(ws.zone);
                    decision.workspace_id = Some(ws.id.clone());
                    decision
                } else {
                    AccessDecision::granted(ws)
                }
            }
            None => AccessDecision::denied("path is not inside any approved workspace"),
        }
    }

    /// Validate a directory before a folder import: traversal and blocked
    /// checks plus exists-and-is-a-directory. Does not require the path to
    /// already be covered by a workspace.
    pub async fn validate_directory(&self, raw_path: &str) -> AccessDecision {
        if contains_traversal(raw_path) {
            return AccessDecision::denied("path contains a directory traversal sequence");
        }

        let normalized = normalize_path(raw_path);
        if let Some(blocked) = find_blocked_root(&normalized, &self.blocked) {
            return AccessDecision::denied(format!(
                "path is inside the blocked system location {}",
                blocked.display()
            ));
        }

        match tokio::fs::metadata(&normalized).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return AccessDecision::denied(format!(
                    "not a directory: {}",
                    normalized.display()
                ))
            }
            Err(_) => {
                return AccessDecision::denied(format!(
                    "directory does not exist: {}",
                    normalized.display()
                ))
            }
        }

        let zone = classify_zone(&normalized, &self.project_root, &self.home);
        let registry = self.registry.read().await;
        let workspace_id =
            covering_workspace(&registry.workspaces, &normalized).map(|ws| ws.id.clone());
        AccessDecision::granted_zone(zone, workspace_id)
    }

    /// Record an access to a path inside an approved workspace, bumping its
    /// counters. Persistence is best-effort.
    pub async fn track_access(&self, raw_path: &str) {
        let normalized = normalize_path(raw_path);
        let now = Utc::now();
        let mut registry = self.registry.write().await;

        let mut hit = false;
        if let Some(ws) = covering_workspace_mut(&mut registry.workspaces, &normalized) {
            ws.access_count += 1;
            ws.last_access = now;
            hit = true;
        }

        if hit {
            registry.updated_at = now;
            self.persist(&registry).await;
        } else {
            debug!(
                "track_access: {} is not inside any approved workspace",
                normalized.display()
            );
        }
    }

    /// Remove a workspace by id. Always refuses for the reserved
    /// project-root workspace.
    pub async fn remove_workspace(&self, id: &str) -> bool {
        if id == PROJECT_ROOT_ID {
            warn!("Refusing to remove the reserved project root workspace");
            return false;
        }

        let mut registry = self.registry.write().await;
        let Some(pos) = registry.workspaces.iter().position(|ws| ws.id == id) else {
            return false;
        };

        let removed = registry.workspaces.remove(pos);
        registry.updated_at = Utc::now();
        self.persist(&registry).await;
        info!("Removed workspace '{}' ({})", removed.label, removed.path);
        true
    }

    /// Toggle the readonly gate on a workspace.
    pub async fn set_readonly(&self, id: &str, readonly: bool) -> bool {
        let mut registry = self.registry.write().await;

        let mut changed = false;
        if let Some(ws) = registry.workspaces.iter_mut().find(|ws| ws.id == id) {
            ws.readonly = readonly;
            changed = true;
        }

        if changed {
            registry.updated_at = Utc::now();
            self.persist(&registry).await;
        }
        changed
    }

    /// All workspaces, most recently accessed first.
    pub async fn list_workspaces(&self) -> Vec<Workspace> {
        let registry = self.registry.read().await;
        let mut workspaces = registry.workspaces.clone();
        workspaces.sort_by(|a, b| b.last_access.cmp(&a.last_access));
        workspaces
    }

    /// The workspace covering a path, if any.
    pub async fn workspace_for(&self, raw_path: &str) -> Option<Workspace> {
        let normalized = normalize_path(raw_path);
        let registry = self.registry.read().await;
        covering_workspace(&registry.workspaces, &normalized).cloned()
    }

    /// The workspace registered at exactly this path, if any.
    pub async fn workspace_at(&self, path: &Path) -> Option<Workspace> {
        let path_str = path.to_string_lossy();
        let registry = self.registry.read().await;
        registry
            .workspaces
            .iter()
            .find(|ws| ws.path == path_str)
            .cloned()
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn policy(&self) -> &SecurityPolicy {
        &self.policy
    }

    /// Register the reserved project-root workspace, the conventional
    /// sub-directories, and configured extra roots. Implicit process-start
    /// grants bypass the workspace ceiling; extra roots still go through
    /// the blocked-path and directory checks.
    async fn seed(&self, extra_roots: &[PathBuf]) {
        let mut registry = self.registry.write().await;

        let root_str = self.project_root.to_string_lossy().into_owned();
        if !registry.workspaces.iter().any(|ws| ws.id == PROJECT_ROOT_ID) {
            let now = Utc::now();
            registry.workspaces.push(Workspace {
                id: PROJECT_ROOT_ID.to_string(),
                path: root_str.clone(),
                zone: AccessZone::ProjectOnly,
                label: "Project".to_string(),
                readonly: false,
                added_at: now,
                last_access: now,
                access_count: 0,
            });
            info!("Registered project root workspace at {}", root_str);
        }

        for sub in PROJECT_SUBDIRS {
            let path = self.project_root.join(sub);
            if path.is_dir() {
                self.seed_entry(&mut registry, &path, sub);
            }
        }

        for root in extra_roots {
            let normalized = normalize_path(&root.to_string_lossy());
            if let Some(blocked) = find_blocked_root(&normalized, &self.blocked) {
                warn!(
                    "Ignoring configured template root {}: inside blocked location {}",
                    normalized.display(),
                    blocked.display()
                );
                continue;
            }
            if !normalized.is_dir() {
                warn!(
                    "Ignoring configured template root {}: not a directory",
                    normalized.display()
                );
                continue;
            }
            let label = default_label(&normalized);
            self.seed_entry(&mut registry, &normalized, &label);
        }

        registry.updated_at = Utc::now();
        self.persist(&registry).await;
    }

    fn seed_entry(&self, registry: &mut WorkspaceRegistry, path: &Path, label: &str) {
        let path_str = path.to_string_lossy().into_owned();
        if registry.workspaces.iter().any(|ws| ws.path == path_str) {
            return;
        }

        let zone = classify_zone(path, &self.project_root, &self.home);
        let now = Utc::now();
        registry.workspaces.push(Workspace {
            id: Uuid::new_v4().to_string(),
            path: path_str.clone(),
            zone,
            label: label.to_string(),
            readonly: false,
            added_at: now,
            last_access: now,
            access_count: 0,
        });
        info!("Registered workspace '{}' at {} ({})", label, path_str, zone);
    }

    /// Best-effort persistence: a write failure loses durability, not the
    /// in-memory mutation that already happened.
    async fn persist(&self, registry: &WorkspaceRegistry) {
        if let Err(e) = storage::write_registry(&self.registry_path, registry).await {
            warn!("Failed to persist workspace registry: {}", e);
        }
    }
}

/// Most specific workspace containing `path`.
fn covering_workspace<'a>(workspaces: &'a [Workspace], path: &Path) -> Option<&'a Workspace> {
    workspaces
        .iter()
        .filter(|ws| is_within(path, Path::new(&ws.path)))
        .max_by_key(|ws| ws.path.len())
}

fn covering_workspace_mut<'a>(
    workspaces: &'a mut [Workspace],
    path: &Path,
) -> Option<&'a mut Workspace> {
    workspaces
        .iter_mut()
        .filter(|ws| is_within(path, Path::new(&ws.path)))
        .max_by_key(|ws| ws.path.len())
}

fn default_label(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("workspace")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn workspace(id: &str, path: &str, readonly: bool) -> Workspace {
        let now = Utc::now();
        Workspace {
            id: id.to_string(),
            path: path.to_string(),
            zone: AccessZone::Restricted,
            label: id.to_string(),
            readonly,
            added_at: now,
            last_access: now,
            access_count: 0,
        }
    }

    #[test]
    fn test_covering_workspace_picks_most_specific() {
        let workspaces = vec![
            workspace("outer", "/srv/app", false),
            workspace("inner", "/srv/app/templates", true),
        ];

        let hit = covering_workspace(&workspaces, Path::new("/srv/app/templates/a.html"))
            .expect("covered");
        assert_eq!(hit.id, "inner");

        let hit = covering_workspace(&workspaces, Path::new("/srv/app/other.html")).expect("covered");
        assert_eq!(hit.id, "outer");

        assert!(covering_workspace(&workspaces, Path::new("/srv/elsewhere")).is_none());
    }

    #[test]
    fn test_default_label_uses_directory_name() {
        assert_eq!(default_label(Path::new("/srv/app/shared-templates")), "shared-templates");
    }
}
