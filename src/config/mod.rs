use crate::paths::normalize_path;
use crate::security::SecurityLevel;
use std::path::PathBuf;
use tracing::warn;

/// Environment variable selecting the security level
/// (`strict` / `balanced` / `permissive`).
pub const SECURITY_LEVEL_ENV: &str = "MAILFORGE_SECURITY_LEVEL";

/// Environment variable listing extra allowed template root directories,
/// comma-separated.
pub const TEMPLATE_ROOTS_ENV: &str = "MAILFORGE_TEMPLATE_ROOTS";

/// Environment variable overriding the template metadata file path.
pub const TEMPLATE_INDEX_ENV: &str = "MAILFORGE_TEMPLATE_INDEX";

/// The name of the mailforge folder under the platform config directory
const APP_FOLDER: &str = "mailforge";

/// The name of the workspace registry file
pub const REGISTRY_FILE: &str = "workspaces.json";

/// The name of the template index file
pub const INDEX_FILE: &str = "templates.json";

/// Configuration consumed by the workspace and template managers.
///
/// Built explicitly in tests (with temp directories) or via [`from_env`]
/// in the embedding process.
///
/// [`from_env`]: CoreConfig::from_env
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// The application's own project root; becomes the reserved workspace.
    pub project_root: PathBuf,
    pub security_level: SecurityLevel,
    /// Extra allowed template roots registered at startup.
    pub extra_template_roots: Vec<PathBuf>,
    /// Location of the workspace registry document.
    pub registry_path: PathBuf,
    /// Location of the template metadata document.
    pub index_path: PathBuf,
}

impl CoreConfig {
    /// Default configuration rooted at `project_root`, with both persisted
    /// documents under the platform config directory.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let app_dir = app_config_dir();
        Self {
            project_root: project_root.into(),
            security_level: SecurityLevel::Balanced,
            extra_template_roots: Vec::new(),
            registry_path: app_dir.join(REGISTRY_FILE),
            index_path: app_dir.join(INDEX_FILE),
        }
    }

    /// Build the configuration from the process environment.
    pub fn from_env(project_root: impl Into<PathBuf>) -> Self {
        let mut config = Self::new(project_root);

        if let Ok(raw) = std::env::var(SECURITY_LEVEL_ENV) {
            match SecurityLevel::parse(&raw) {
                Some(level) => config.security_level = level,
                None => warn!(
                    "Unknown {} value '{}', using {}",
                    SECURITY_LEVEL_ENV,
                    raw,
                    config.security_level.as_str()
                ),
            }
        }

        if let Ok(raw) = std::env::var(TEMPLATE_ROOTS_ENV) {
            config.extra_template_roots = raw
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(normalize_path)
                .collect();
        }

        if let Ok(raw) = std::env::var(TEMPLATE_INDEX_ENV) {
            if !raw.trim().is_empty() {
                config.index_path = normalize_path(&raw);
            }
        }

        config
    }
}

/// The mailforge folder under the platform config directory, falling back
/// to `~/.config` and finally the current directory.
pub fn app_config_dir() -> PathBuf {
    dirs_next::config_dir()
        .or_else(|| dirs_next::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_FOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::new("/srv/app");
        assert_eq!(config.project_root, PathBuf::from("/srv/app"));
        assert_eq!(config.security_level, SecurityLevel::Balanced);
        assert!(config.extra_template_roots.is_empty());
        assert!(config.registry_path.ends_with(REGISTRY_FILE));
        assert!(config.index_path.ends_with(INDEX_FILE));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_security_level_and_roots() {
        std::env::set_var(SECURITY_LEVEL_ENV, "permissive");
        std::env::set_var(TEMPLATE_ROOTS_ENV, "/srv/shared , /srv/other,");
        std::env::set_var(TEMPLATE_INDEX_ENV, "/srv/state/index.json");

        let config = CoreConfig::from_env("/srv/app");
        assert_eq!(config.security_level, SecurityLevel::Permissive);
        assert_eq!(
            config.extra_template_roots,
            vec![PathBuf::from("/srv/shared"), PathBuf::from("/srv/other")]
        );
        assert_eq!(config.index_path, PathBuf::from("/srv/state/index.json"));

        std::env::remove_var(SECURITY_LEVEL_ENV);
        std::env::remove_var(TEMPLATE_ROOTS_ENV);
        std::env::remove_var(TEMPLATE_INDEX_ENV);
    }

    #[test]
    #[serial]
    fn test_from_env_unknown_level_falls_back() {
        std::env::set_var(SECURITY_LEVEL_ENV, "paranoid");
        let config = CoreConfig::from_env("/srv/app");
        assert_eq!(config.security_level, SecurityLevel::Balanced);
        std::env::remove_var(SECURITY_LEVEL_ENV);
    }
}
