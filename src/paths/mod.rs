//! Path normalization for user-supplied and stored paths.
//!
//! Everything here is pure string/path computation. Nothing touches the
//! filesystem, resolves symlinks, or checks existence; validation happens
//! downstream in the workspace layer.

use std::path::{Component, Path, PathBuf};

/// Check the raw, unnormalized path string for a directory-traversal
/// sequence. Runs before normalization so that normalization cannot
/// launder an attack string.
pub fn contains_traversal(raw: &str) -> bool {
    raw == ".."
        || raw.contains("../")
        || raw.contains("..\\")
        || raw.ends_with("/..")
        || raw.ends_with("\\..")
}

/// Normalize a path string into a canonical absolute path.
///
/// Steps, in order: strip NUL and other control characters, expand a
/// leading `~` to the home directory, resolve relative paths against the
/// current working directory, then lexically resolve `.`/`..` segments.
/// Degenerate input still normalizes to some absolute path rather than
/// failing.
pub fn normalize_path(raw: &str) -> PathBuf {
    let cleaned: String = raw.chars().filter(|c| !c.is_control()).collect();
    let expanded = shellexpand::tilde(cleaned.trim()).into_owned();

    let path = PathBuf::from(expanded);
    let absolute = if path.is_absolute() {
        path
    } else {
        current_dir().join(path)
    };

    lexical_clean(&absolute)
}

/// String form of [`normalize_path`], used for storage and comparisons.
pub fn normalize_path_str(raw: &str) -> String {
    normalize_path(raw).to_string_lossy().into_owned()
}

/// Component-wise containment test. True when `child` equals `root` or is
/// nested anywhere under it.
pub fn is_within(child: &Path, root: &Path) -> bool {
    child.starts_with(root)
}

/// The user's home directory, falling back to the filesystem root when the
/// environment cannot tell us.
pub fn home_dir() -> PathBuf {
    dirs_next::home_dir().unwrap_or_else(|| PathBuf::from(root_str()))
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(root_str()))
}

fn root_str() -> String {
    std::path::MAIN_SEPARATOR.to_string()
}

/// Resolve `.` and `..` segments lexically. `..` at the root is dropped
/// rather than escaping it.
fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(segment) => out.push(segment),
        }
    }
    out
}
