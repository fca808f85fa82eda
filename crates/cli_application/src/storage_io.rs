//! Provides the file system input/output operations of the application.
//!
//! This module loads the configuration, prunes old logs, resolves and
//! checks the directories a run depends on, and lists the direct children
//! of a batch input directory in a stable order.

use std::{
    env,
    fs::{self, metadata, read_dir, remove_file},
    path::{Path, PathBuf},
    time::SystemTime
};

use tracing::warn;

use crate::{
    cli_types::{APPIDENTIFIER, DiscZipConfig},
    error_handling::{CliError, LOG_FILE_NAME, log_dir}
};

/// A string literal representing the default, commented configuration file.
///
/// This constant holds the content that is written to `disczip-config.toml`
/// when the application is run for the first time and no existing
/// configuration is found.
const DEFAULT_CONFIG_WITH_COMMENTS: &str = r#"
# Directory containing the external tools (7za, UnRAR and unecm).
# Leave empty to use the "binaries" directory next to the disczip
# executable.
# Default = ""
binaries_dir = ""

# Sets the archiver compression level (0-9).
# Default = 9
compression_level = 9

# Used by compressfiles together with --delete. When the archive is larger
# than this fraction of the original file, the archive is discarded and the
# original kept.
# Default = 0.9
max_ratio = 0.9

# Activates verbose output for detailed diagnostic information, including
# the output of the external tools.
# Default = false
verbose = false

# Whether to print anything to console. True will disable printing to console
# and false will enable.
# Default = false
quiet_output = false

# Specifies the amount of days the application will retain log files. Any log
# file found to be older than the retention period, upon the application being
# run, will be removed. A value of 0 will keep logs forever.
# Default = 7
log_retention_days = 7

# Sets the log file verbosity level when enabled.
# - error will only log errors.
# - warning includes warning messages and the above messages (errors)
# - info includes info messages and the above messages (errors and warnings)
# - debug includes debug messages and the above messages
#   (errors, warnings and info)
# - off disables the creation of a log file and won't write any messages to one
#   if one exists
# Default = "error"
log_level = "error"
"#;

/// Checks if a given path points to a regular file without following
/// symbolic links.
fn is_regular_file(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_file())
        .unwrap_or(false)
}

/// Lists the regular files directly inside `dir`, sorted by path.
///
/// Symbolic links are skipped with a warning.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let mut file_paths = Vec::new();

    for entry in read_dir(dir)? {
        let path = entry?.path();
        if is_regular_file(&path) {
            file_paths.push(path);
        } else if !path.is_dir() {
            warn!("Ignoring symbolic link: {}", path.display());
        }
    }

    file_paths.sort();
    Ok(file_paths)
}

/// Lists the directories directly inside `dir`, sorted by path.
pub fn list_dirs(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let mut dir_paths = Vec::new();

    for entry in read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dir_paths.push(entry.path());
        }
    }

    dir_paths.sort();
    Ok(dir_paths)
}

/// Returns the size of a file in bytes.
pub fn file_size(path: &Path) -> Result<u64, CliError> {
    Ok(metadata(path)?.len())
}

/// Fails with a configuration error when `path` is not an existing
/// directory.
pub fn require_dir(path: &Path, what: &str) -> Result<(), CliError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(CliError::ConfigurationError(format!(
            "The {what} directory {} doesn't exist!",
            path.display()
        )))
    }
}

/// Resolves the directory holding the external tools.
///
/// Without a configured directory the `binaries` directory next to the
/// running executable is used.
pub fn resolve_binaries_dir(configured: Option<&Path>) -> Result<PathBuf, CliError> {
    if let Some(dir) = configured {
        return Ok(dir.to_path_buf());
    }

    let exe = env::current_exe()?;
    let exe_dir = exe.parent().ok_or_else(|| {
        CliError::ConfigurationError(format!(
            "Cannot determine the directory of {}",
            exe.display()
        ))
    })?;

    Ok(exe_dir.join("binaries"))
}

/// Returns the directory extraction workspaces are created in, creating it
/// if needed.
pub fn scratch_dir() -> Result<PathBuf, CliError> {
    let dir = env::temp_dir().join(APPIDENTIFIER.application);
    fs::create_dir_all(&dir)?;

    Ok(dir)
}

/// Loads the application configuration, writing a commented default file
/// first if none exists yet.
///
/// # Errors
///
/// Returns an error if the config directory cannot be created, the
/// default file cannot be written, or the existing file is not valid TOML.
pub fn load_config() -> Result<DiscZipConfig, CliError> {
    let app_name = APPIDENTIFIER.application;

    let config_path = confy::get_configuration_file_path(
        app_name,
        APPIDENTIFIER.config_name)?;

    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(config_path, DEFAULT_CONFIG_WITH_COMMENTS)?;
    }

    Ok(confy::load(app_name, APPIDENTIFIER.config_name)?)
}

/// Deletes log files older than `retention_days`. A value of 0 keeps every
/// log.
pub fn cleanup_old_logs(
    retention_days: u16
) -> Result<(), CliError> {
    if retention_days == 0 {
        return Ok(());
    }

    let log_dir = log_dir()?;
    if !log_dir.exists() {
        return Ok(());
    }

    let now = SystemTime::now();
    let retention_duration = std::time::Duration::from_secs(
        retention_days as u64 * 24 * 60 * 60
    );

    for log in read_dir(log_dir)? {
        let path = log?.path();

        if path.is_file() &&
            path.to_string_lossy().contains(LOG_FILE_NAME) &&
            let Ok(metadata) = metadata(&path) &&
            let Ok(modified) = metadata.modified() &&
            let Ok(age) = now.duration_since(modified) &&
            age > retention_duration {
                remove_file(&path)?;
            }
    }

    Ok(())
}
