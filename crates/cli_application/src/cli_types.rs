//! Defines core data structures for the CLI application.
//!
//! This module centralizes the configuration model, the application
//! identifier used to locate config and log directories, and the state
//! shared by every batch mode while it walks its input directory.

use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

use disczip::{ArchiveTools, ProcessRunner, ToolRunner};

/// Identifies the application to the platform directory lookups.
///
/// # Fields
///
/// * `qualifier`: Reverse domain qualifier, e.g. `com`.
/// * `organization`: Organization name used by `ProjectDirs`.
/// * `application`: Application name, also used by `confy`.
/// * `config_name`: Name of the TOML configuration file without extension.
pub struct AppIdentifier {
    pub qualifier: &'static str,
    pub organization: &'static str,
    pub application: &'static str,
    pub config_name: &'static str,
}

pub const APPIDENTIFIER: AppIdentifier = AppIdentifier {
    qualifier: "com",
    organization: "DiscZip",
    application: "disczip",
    config_name: "disczip-config",
};

/// On-disk configuration. Every field can be overridden from the command
/// line.
///
/// # Fields
///
/// * `binaries_dir`: Directory holding `7za`, `UnRAR` and `unecm`. Empty
///   means the `binaries` directory next to the executable.
/// * `compression_level`: Archiver `-mx` level.
/// * `max_ratio`: Compressed/original size ratio above which
///   `compressfiles --delete` keeps the original instead of the archive.
/// * `verbose`: Console logging at debug level.
/// * `quiet_output`: Suppress console output and progress bars.
/// * `log_retention_days`: Age in days after which log files are pruned;
///   0 keeps them forever.
/// * `log_level`: File log level (`error`, `warning`, `info`, `debug`,
///   `off`).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiscZipConfig {
    pub binaries_dir: String,
    pub compression_level: u8,
    pub max_ratio: f64,
    pub verbose: bool,
    pub quiet_output: bool,
    pub log_retention_days: u16,
    pub log_level: String,
}

impl Default for DiscZipConfig {
    fn default() -> Self {
        Self {
            binaries_dir: String::new(),
            compression_level: 9,
            max_ratio: 0.9,
            verbose: false,
            quiet_output: false,
            log_retention_days: 7,
            log_level: String::from("error"),
        }
    }
}

/// Lifecycle of one archive in the PSX extraction flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemStage {
    Pending,
    Extracting,
    Decoding,
    Denesting,
    Censusing,
    Repairing,
    Renaming,
    Relocating,
    Done,
    Aborted,
}

impl fmt::Display for ItemStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemStage::Pending => "pending",
            ItemStage::Extracting => "extracting",
            ItemStage::Decoding => "decoding",
            ItemStage::Denesting => "denesting",
            ItemStage::Censusing => "censusing",
            ItemStage::Repairing => "repairing",
            ItemStage::Renaming => "renaming",
            ItemStage::Relocating => "relocating",
            ItemStage::Done => "done",
            ItemStage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Everything a batch mode needs to process its input directory.
///
/// # Fields
///
/// * `tools`: Gateway to the external archiver tools.
/// * `input_dir`: Directory whose direct children are processed.
/// * `output_dir`: Directory receiving archives, extracted folders or
///   normalized disc files.
/// * `scratch_dir`: Directory the per-item extraction workspaces are
///   created in. Kept apart from `output_dir` so an aborted item leaves
///   nothing there.
/// * `delete`: Remove originals after a successful operation.
/// * `max_ratio`: Ratio threshold for `compressfiles --delete`.
/// * `quiet`: Hide progress bars.
pub struct BatchContext<R: ToolRunner = ProcessRunner> {
    pub tools: ArchiveTools<R>,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub scratch_dir: PathBuf,
    pub delete: bool,
    pub max_ratio: f64,
    pub quiet: bool,
}
