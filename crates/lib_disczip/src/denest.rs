//! Collapses redundant wrapper directories.
//!
//! Archives are often packed as `Game/Game/Game/<content>`. Denesting walks
//! down such chains so callers operate on the directory that actually holds
//! the content, without guessing at a fixed depth.

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

/// Descends from `dir` while the current directory holds no files and
/// exactly one subdirectory named `reference_name`.
///
/// Every descent moves strictly deeper into the tree, so the walk always
/// terminates. A directory that cannot be listed ends the walk at that
/// directory.
///
/// # Arguments
///
/// * `dir`: The directory to start from.
/// * `reference_name`: The wrapper name to look for. Comparison is exact.
///
/// # Returns
///
/// The innermost directory reached, which is `dir` itself when no
/// descent was possible.
pub fn denest(dir: &Path, reference_name: &str) -> PathBuf {
    let mut current = dir.to_path_buf();

    while let Some(child) = sole_subdirectory(&current) {
        if child.file_name() != Some(OsStr::new(reference_name)) {
            break;
        }
        debug!(
            "Directory {} has extra nested levels; descending one level.",
            current.display()
        );
        current = child;
    }

    current
}

/// Denests a directory using its own name as the wrapper name.
pub fn denest_self_named(dir: &Path) -> PathBuf {
    match dir.file_name().and_then(OsStr::to_str) {
        Some(name) => denest(dir, name),
        None => dir.to_path_buf(),
    }
}

/// Returns the only entry of `dir` if it has no files and exactly one
/// subdirectory.
fn sole_subdirectory(dir: &Path) -> Option<PathBuf> {
    let mut subdir = None;

    for entry in fs::read_dir(dir).ok()? {
        let entry = entry.ok()?;
        if !entry.file_type().ok()?.is_dir() || subdir.is_some() {
            return None;
        }
        subdir = Some(entry.path());
    }

    subdir
}
