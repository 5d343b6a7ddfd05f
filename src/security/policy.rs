use std::path::Path;

/// File extensions recognized as email templates.
pub const TEMPLATE_EXTENSIONS: &[&str] = &["html", "htm"];

/// Security level selected at startup. Controls the workspace ceiling and
/// the per-file limits below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityLevel {
    Strict,
    Balanced,
    Permissive,
}

impl SecurityLevel {
    /// Parse a level name, case-insensitively. Unknown values return None
    /// so the caller can fall back with a warning.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(SecurityLevel::Strict),
            "balanced" => Some(SecurityLevel::Balanced),
            "permissive" => Some(SecurityLevel::Permissive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityLevel::Strict => "strict",
            SecurityLevel::Balanced => "balanced",
            SecurityLevel::Permissive => "permissive",
        }
    }
}

/// Concrete limits derived from a [`SecurityLevel`].
///
/// `require_confirmation` is carried for the strict level but access to
/// restricted-zone directories is still granted, only flagged in the log.
#[derive(Debug, Clone, Copy)]
pub struct SecurityPolicy {
    pub level: SecurityLevel,
    pub max_workspaces: usize,
    pub max_file_size: u64,
    pub allowed_extensions: &'static [&'static str],
    pub require_confirmation: bool,
}

impl SecurityPolicy {
    pub fn for_level(level: SecurityLevel) -> Self {
        match level {
            SecurityLevel::Strict => Self {
                level,
                max_workspaces: 1,
                max_file_size: 5 * 1024 * 1024,
                allowed_extensions: TEMPLATE_EXTENSIONS,
                require_confirmation: true,
            },
            SecurityLevel::Balanced => Self {
                level,
                max_workspaces: 10,
                max_file_size: 10 * 1024 * 1024,
                allowed_extensions: TEMPLATE_EXTENSIONS,
                require_confirmation: false,
            },
            SecurityLevel::Permissive => Self {
                level,
                max_workspaces: 50,
                max_file_size: 50 * 1024 * 1024,
                allowed_extensions: TEMPLATE_EXTENSIONS,
                require_confirmation: false,
            },
        }
    }

    /// Check a path's extension against the allowed set, case-insensitively.
    pub fn allows_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let lowered = ext.to_ascii_lowercase();
                self.allowed_extensions.iter().any(|allowed| *allowed == lowered)
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!(SecurityLevel::parse("strict"), Some(SecurityLevel::Strict));
        assert_eq!(SecurityLevel::parse("Balanced"), Some(SecurityLevel::Balanced));
        assert_eq!(
            SecurityLevel::parse(" PERMISSIVE "),
            Some(SecurityLevel::Permissive)
        );
        assert_eq!(SecurityLevel::parse("paranoid"), None);
    }

    #[test]
    fn test_workspace_ceilings() {
        assert_eq!(SecurityPolicy::for_level(SecurityLevel::Strict).max_workspaces, 1);
        assert_eq!(SecurityPolicy::for_level(SecurityLevel::Balanced).max_workspaces, 10);
        assert_eq!(
            SecurityPolicy::for_level(SecurityLevel::Permissive).max_workspaces,
            50
        );
    }

    #[test]
    fn test_extension_check_is_case_insensitive() {
        let policy = SecurityPolicy::for_level(SecurityLevel::Balanced);
        assert!(policy.allows_extension(Path::new("/tmp/a.html")));
        assert!(policy.allows_extension(Path::new("/tmp/a.HTM")));
        assert!(!policy.allows_extension(Path::new("/tmp/a.txt")));
        assert!(!policy.allows_extension(Path::new("/tmp/noext")));
    }
}
