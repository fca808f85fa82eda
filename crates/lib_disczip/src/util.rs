//! File name and file system helpers shared by the engine.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::lib_error_handling::DiscZipError;

/// Replaces the final extension of a file name.
///
/// The split happens on the last `.` in `file_name`. A name without a dot
/// gets `.{ext}` appended. Passing `None` (or an empty extension) removes
/// the extension instead.
pub fn replace_file_extension(file_name: &str, new_extension: Option<&str>) -> String {
    match (file_name.rfind('.'), new_extension) {
        (None, Some(ext)) if !ext.is_empty() => format!("{file_name}.{ext}"),
        (None, _) => file_name.to_string(),
        (Some(idx), Some(ext)) if !ext.is_empty() => {
            format!("{}.{}", &file_name[..idx], ext)
        }
        (Some(idx), _) => file_name[..idx].to_string(),
    }
}

/// Returns the final component of `path` as an owned UTF-8 string.
pub fn file_name_of(path: &Path) -> Result<String, DiscZipError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| DiscZipError::InvalidFileName(path.to_path_buf()))
}

/// Collects every regular file below `root`, in sorted path order.
pub fn collect_files(root: &Path) -> Result<Vec<PathBuf>, DiscZipError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Moves a file, falling back to copy and delete when a plain rename
/// cannot cross file systems.
pub fn move_file(source: &Path, target: &Path) -> io::Result<()> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            debug!(
                "Rename of {} failed ({rename_err}); copying instead.",
                source.display()
            );
            fs::copy(source, target)?;
            fs::remove_file(source)
        }
    }
}

/// Deletes a file if it exists. Failures are logged and swallowed.
pub fn try_force_delete_file(path: &Path) {
    if let Err(e) = fs::remove_file(path)
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!("Failed to delete file {}: {e}", path.display());
    }
}

/// Recursively deletes a directory if it exists. Failures are logged and
/// swallowed.
pub fn try_force_delete_dir(path: &Path) {
    if let Err(e) = fs::remove_dir_all(path)
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!("Failed to delete directory {}: {e}", path.display());
    }
}
