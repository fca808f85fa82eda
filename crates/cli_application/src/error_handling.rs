//! Declares the error handling types for the command-line application.
//!
//! This module defines the custom `CliError` enum, which encapsulates
//! every condition that ends a run early, and sets up the logging system
//! all other modules report through.

use std::{
    io,
    path::PathBuf
};

use directories::ProjectDirs;
use disczip::DiscZipError;
use thiserror::Error;
use tracing::{
    level_filters::LevelFilter,
    debug,
    warn
};
use tracing_appender::{
    rolling, non_blocking::WorkerGuard,
};
use tracing_subscriber::{
    prelude::*,
    registry,
    fmt,
};

use crate::cli_types::APPIDENTIFIER;

/// File name prefix of the rolling log files.
pub const LOG_FILE_NAME: &str = "disczip.log";

/// Represents all conditions that abort a run.
///
/// Per-item failures in the batch flows are logged and skipped; only the
/// variants below make the process exit with a failure code.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O Error {0}")]
    IoError(#[from] io::Error),

    #[error("Required flag missing. {0}")]
    MissingFlag(String),

    #[error("Configuration error. {0}")]
    ConfigurationError(String),

    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("{tool} failed on {} with exit code {code}", path.display())]
    ToolFailure {
        tool: String,
        path: PathBuf,
        code: i32,
    },

    #[error("Library error: {0}")]
    DiscZip(#[from] DiscZipError),

    #[error("Confy config error {0}")]
    ConfigError(#[from] confy::ConfyError),

    #[error("Argument parsing error: {0}")]
    ArgumentParsing(#[from] clap::Error),

    #[error("Failed to find a valid project directory.")]
    NoProjectDirectory,

    #[error("Progress bar template error {0}")]
    ProgressTemplate(#[from] indicatif::style::TemplateError),

    #[error("Logging Subscriber Error {0}")]
    LoggingSubscriberError(#[from] tracing_subscriber::util::TryInitError),
}

/// Returns the directory rolling log files are written to.
pub fn log_dir() -> Result<PathBuf, CliError> {
    let proj_dirs = ProjectDirs::from(
        APPIDENTIFIER.qualifier,
        APPIDENTIFIER.organization,
        APPIDENTIFIER.application)
    .ok_or(CliError::NoProjectDirectory)?;

    Ok(proj_dirs.data_local_dir().join("logs"))
}

fn parse_file_log_level(file_log_level: &str) -> Option<LevelFilter> {
    match file_log_level {
        "error" => Some(LevelFilter::ERROR),
        "warning" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "off" => Some(LevelFilter::OFF),
        _ => None,
    }
}

/// This function sets up a dual-layered logging system using the `tracing`
/// crate:
///
/// 1.  **Console Logging**: A layer that writes formatted log messages to
///     standard output. `verbose` raises it to `DEBUG`, `quiet` turns it
///     off, otherwise it prints at `INFO`.
/// 2.  **File Logging**: A layer that writes logs in JSON format to a
///     rolling daily log file (`disczip.log`) in the platform local data
///     directory, filtered by `file_log_level`.
///
/// The returned `WorkerGuard` must be kept alive until the program exits
/// so buffered log lines are flushed.
///
/// # Arguments
///
/// * `verbose`: Console level `DEBUG`.
/// * `quiet`: Console level `OFF`. Takes precedence over `verbose`.
/// * `file_log_level`: Level name from the config. `off` disables the log
///   file, unknown names fall back to `error` with a warning.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set or the
/// log directory cannot be determined.
pub fn initiate_logging(
    verbose: bool,
    quiet: bool,
    file_log_level: &str
) -> Result<Option<WorkerGuard>, CliError> {
    let console_level = if quiet {
        LevelFilter::OFF
    } else if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    if file_log_level == "off" {
        let console_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .without_time()
            .with_level(false)
            .with_target(false)
            .with_filter(console_level);

        registry()
            .with(console_layer)
            .try_init()?;

        debug!("Log file disabled.");
        return Ok(None);
    }

    let file_appender = rolling::daily(log_dir()?, LOG_FILE_NAME);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(
        file_appender
    );

    let parsed_level = parse_file_log_level(file_log_level);

    let file_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_writer)
        .with_filter(parsed_level.unwrap_or(LevelFilter::ERROR));

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_filter(console_level);

    registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    if parsed_level.is_none() {
        warn!("Invalid log level provided in config. \
            Defaulting level to ERROR.");
    } else {
        debug!("Log file enabled.");
    }

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_level_names_map_to_filters() {
        assert_eq!(parse_file_log_level("warning"), Some(LevelFilter::WARN));
        assert_eq!(parse_file_log_level("off"), Some(LevelFilter::OFF));
        assert_eq!(parse_file_log_level("verbose"), None);
    }

    #[test]
    fn console_only_logging_installs_a_single_subscriber() {
        assert!(initiate_logging(false, true, "off").unwrap().is_none());
        assert!(matches!(
            initiate_logging(true, false, "off"),
            Err(CliError::LoggingSubscriberError(_))
        ));
    }

    #[test]
    fn tool_failure_names_the_file() {
        let err = CliError::ToolFailure {
            tool: "unecm".to_string(),
            path: PathBuf::from("Game.bin.ecm"),
            code: 2,
        };

        assert_eq!(
            err.to_string(),
            "unecm failed on Game.bin.ecm with exit code 2"
        );
    }
}
