//! The primary entry point and dispatcher for the command-line interface.
//!
//! This module orchestrates the lifecycle of a run: it parses arguments,
//! merges them with the on-disk configuration, sets up logging, checks the
//! directories the run depends on and dispatches to the selected batch
//! mode. Per-item failures are logged by the modes themselves; only
//! configuration errors and fatal conditions make the process exit with a
//! failure code.

use clap::{CommandFactory, FromArgMatches};
use tracing::{
    debug,
    error,
};

use disczip::{ArchiveTools, ProcessRunner, ToolRunner};

mod modes;
use modes::{
    run_compress_dirs, run_compress_files, run_compress_psx, run_extract,
    run_extract_psx, run_fix_cue, run_transcode
};

mod arg_handling;
use arg_handling::{Args, Command, merge_config_and_args, validate_args};

mod cli_types;
use cli_types::{BatchContext, DiscZipConfig};

mod error_handling;
use error_handling::{CliError, initiate_logging};

mod storage_io;
use storage_io::{
    cleanup_old_logs, load_config, require_dir, resolve_binaries_dir, scratch_dir
};

/// Process exit code for configuration errors and fatal conditions.
const EXIT_FAILURE: i32 = -1;

/// Builds the batch context from validated arguments, checking that every
/// directory the run needs exists.
fn build_context(args: &Args) -> Result<BatchContext<ProcessRunner>, CliError> {
    let binaries_dir = resolve_binaries_dir(args.binaries_dir.as_deref())?;
    let input_dir = args.input.clone().ok_or_else(|| {
        CliError::MissingFlag("Input directory (--in) is required.".to_string())
    })?;
    let output_dir = args.output.clone().ok_or_else(|| {
        CliError::MissingFlag("Output directory (--out) is required.".to_string())
    })?;

    require_dir(&binaries_dir, "binaries")?;
    require_dir(&input_dir, "input")?;
    require_dir(&output_dir, "output")?;

    Ok(BatchContext {
        tools: ArchiveTools::new(binaries_dir, args.compression_level, ProcessRunner),
        input_dir,
        output_dir,
        scratch_dir: scratch_dir()?,
        delete: args.delete,
        max_ratio: args.max_ratio,
        quiet: args.quiet,
    })
}

/// Executes the selected batch mode.
fn run<R: ToolRunner>(command: Command, ctx: &BatchContext<R>) -> Result<(), CliError> {
    debug!("Mode: {:?}", command);

    match command {
        Command::CompressFiles => run_compress_files(ctx),
        Command::CompressDirs => run_compress_dirs(ctx),
        Command::Extract => run_extract(ctx),
        Command::ExtractPsx => run_extract_psx(ctx),
        Command::PsxFixCue => run_fix_cue(ctx),
        Command::CompressPsx => run_compress_psx(ctx),
        Command::Transcode => run_transcode(ctx),
    }
}

/// The main entry point for the command-line application.
///
/// Exits with `0` when the batch completes, even if individual items
/// failed and were logged, and with `-1` on a configuration error or a
/// fatal mid-run condition.
fn main() -> Result<(), CliError> {
    let matches = Args::command().get_matches();
    let args = Args::from_arg_matches(&matches)?;

    //Load config from disk if the ignore_config flag isn't provided.
    let file_cfg = if args.ignore_config {
        DiscZipConfig::default()
    } else {
        match load_config() {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Failed to load application configuration. {e}");
                std::process::exit(EXIT_FAILURE);
            }
        }
    };

    /*Command line flags supersede the values of the on disk config.*/
    let final_args = merge_config_and_args(&file_cfg, args, &matches);

    if let Err(e) = cleanup_old_logs(file_cfg.log_retention_days) {
        eprintln!("Failed to clean up old log files. Error: {e}");
    }

    let guard = initiate_logging(
        final_args.verbose,
        final_args.quiet,
        &file_cfg.log_level
    )?;

    if final_args.ignore_config {
        debug!("Ignoring config.");
    }

    let outcome = validate_args(&final_args, &matches)
        .and_then(|_| build_context(&final_args))
        .and_then(|ctx| run(final_args.command, &ctx));

    if let Err(e) = outcome {
        error!("Application encountered an error and has exited. \
            Error: {e}");
        //Flush the log file before exiting without unwinding.
        drop(guard);
        std::process::exit(EXIT_FAILURE);
    }

    debug!("Application completed task successfully.");
    Ok(())
}
