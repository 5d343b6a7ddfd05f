use crate::paths::is_within;
use std::path::{Path, PathBuf};

/// System locations that are never accessible, regardless of workspace
/// membership. Membership is a component-wise prefix test on normalized
/// paths and is checked before any workspace lookup.
#[cfg(target_os = "macos")]
pub fn blocked_paths(home: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = [
        "/System",
        "/Library",
        "/usr",
        "/bin",
        "/sbin",
        "/etc",
        "/private/etc",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();

    paths.push(home.join("Library"));
    paths.push(home.join(".Trash"));
    paths
}

#[cfg(target_os = "windows")]
pub fn blocked_paths(home: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = [
        "C:\\Windows",
        "C:\\Program Files",
        "C:\\Program Files (x86)",
        "C:\\ProgramData",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();

    paths.push(home.join("AppData").join("Local").join("Temp"));
    paths.push(home.join("AppData").join("Roaming").join("Microsoft"));
    paths
}

#[cfg(all(unix, not(target_os = "macos")))]
pub fn blocked_paths(home: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = [
        "/usr", "/etc", "/boot", "/root", "/proc", "/sys", "/bin", "/sbin", "/lib", "/lib64",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();

    paths.push(home.join(".local").join("share").join("Trash"));
    paths
}

/// Return the blocked root containing `path`, if any.
pub fn find_blocked_root<'a>(path: &Path, blocked: &'a [PathBuf]) -> Option<&'a PathBuf> {
    blocked.iter().find(|root| is_within(path, root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_roots_match_nested_paths() {
        let home = PathBuf::from("/home/user");
        let blocked = blocked_paths(&home);

        #[cfg(all(unix, not(target_os = "macos")))]
        {
            assert!(find_blocked_root(Path::new("/etc/passwd"), &blocked).is_some());
            assert!(find_blocked_root(Path::new("/usr/share/doc"), &blocked).is_some());
            assert!(find_blocked_root(Path::new("/etc"), &blocked).is_some());
        }

        #[cfg(target_os = "macos")]
        {
            assert!(find_blocked_root(Path::new("/System/Library"), &blocked).is_some());
            assert!(
                find_blocked_root(Path::new("/home/user/Library/Mail"), &blocked).is_some()
            );
        }
    }

    #[test]
    fn test_prefix_test_is_component_wise() {
        let home = PathBuf::from("/home/user");
        let blocked = blocked_paths(&home);

        #[cfg(all(unix, not(target_os = "macos")))]
        {
            // "/etcetera" shares a string prefix with "/etc" but is a
            // different component and must not match.
            assert!(find_blocked_root(Path::new("/etcetera/data"), &blocked).is_none());
        }

        assert!(find_blocked_root(Path::new("/home/user/work"), &blocked).is_none());
    }
}
