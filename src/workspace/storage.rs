use super::types::WorkspaceRegistry;
use super::WorkspaceError;
use std::path::Path;
use tokio::fs;

/// Read the workspace registry from disk. A missing file yields an empty
/// registry.
pub async fn read_registry(path: &Path) -> Result<WorkspaceRegistry, WorkspaceError> {
    if !path.exists() {
        return Ok(WorkspaceRegistry::new());
    }

    let content = fs::read_to_string(path).await?;
    let registry: WorkspaceRegistry = serde_json::from_str(&content)?;
    Ok(registry)
}

/// Write the registry to disk atomically using temp file + rename.
pub async fn write_registry(
    path: &Path,
    registry: &WorkspaceRegistry,
) -> Result<(), WorkspaceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(registry)?;
    fs::write(&temp_path, &content).await?;
    fs::rename(&temp_path, &path).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::AccessZone;
    use crate::workspace::types::Workspace;
    use chrono::Utc;

    #[tokio::test]
    async fn test_missing_file_yields_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        let registry = read_registry(&dir.path().join("workspaces.json"))
            .await
            .unwrap();
        assert_eq!(registry.version, 1);
        assert!(registry.workspaces.is_empty());
    }

    #[tokio::test]
    async fn test_write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("workspaces.json");

        let mut registry = WorkspaceRegistry::new();
        let now = Utc::now();
        registry.workspaces.push(Workspace {
            id: "abc".to_string(),
            path: "/tmp/work".to_string(),
            zone: AccessZone::Restricted,
            label: "work".to_string(),
            readonly: true,
            added_at: now,
            last_access: now,
            access_count: 3,
        });

        write_registry(&path, &registry).await.unwrap();
        let loaded = read_registry(&path).await.unwrap();

        assert_eq!(loaded.workspaces.len(), 1);
        let ws = &loaded.workspaces[0];
        assert_eq!(ws.id, "abc");
        assert_eq!(ws.zone, AccessZone::Restricted);
        assert!(ws.readonly);
        assert_eq!(ws.access_count, 3);
    }

    #[tokio::test]
    async fn test_persisted_document_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspaces.json");

        write_registry(&path, &WorkspaceRegistry::new()).await.unwrap();
        let raw = tokio::fs::read_to_string(&path).await.unwrap();

        assert!(raw.contains("\"updatedAt\""));
        assert!(raw.contains("\"version\": 1"));
    }
}
