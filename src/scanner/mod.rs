//! Recursive directory walker used during folder import.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect all files under `root` whose extension matches `extensions`
/// (case-insensitive). Non-recursive mode only looks at the root's direct
/// children. Unreadable entries are skipped; bulk discovery never fails
/// wholesale because of one bad entry.
pub fn scan_files(root: &Path, recursive: bool, extensions: &[&str]) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(root).min_depth(1);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_extension(entry.path(), extensions))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lowered = ext.to_ascii_lowercase();
            extensions.iter().any(|allowed| *allowed == lowered)
        })
        .unwrap_or(false)
}
