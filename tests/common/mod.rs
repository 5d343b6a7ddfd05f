use mailforge_core::{CoreConfig, SecurityLevel, TemplateManager, WorkspaceManager};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Create an isolated temporary directory
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Should create temp dir")
}

/// Build a config rooted at `project`, with both persisted documents under
/// `state`. Tests never touch the real platform config directory.
pub fn test_config(project: &TempDir, state: &TempDir) -> CoreConfig {
    CoreConfig {
        project_root: project.path().to_path_buf(),
        security_level: SecurityLevel::Balanced,
        extra_template_roots: Vec::new(),
        registry_path: state.path().join("workspaces.json"),
        index_path: state.path().join("templates.json"),
    }
}

/// Stand up both managers against the given config.
pub async fn init_managers(config: &CoreConfig) -> (Arc<WorkspaceManager>, TemplateManager) {
    let workspaces = Arc::new(
        WorkspaceManager::init(config)
            .await
            .expect("Should init workspace manager"),
    );
    let templates = TemplateManager::init(workspaces.clone(), config)
        .await
        .expect("Should init template manager");
    (workspaces, templates)
}

/// Write a template fixture file and return its path.
pub fn write_template(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Should create fixture dirs");
    }
    std::fs::write(&path, "<html><body>fixture</body></html>").expect("Should write fixture");
    path
}
