//! Manages command-line argument parsing and validation.
//!
//! This module defines the command-line interface for the application
//! using the `clap` crate. It includes the `Args` struct, which specifies
//! the batch command and every option, and the logic that validates user
//! input and merges it with the on-disk configuration.

use std::path::PathBuf;

use clap::{ArgMatches, Parser, ValueEnum};
use tracing::warn;

use crate::{
    cli_types::DiscZipConfig,
    error_handling::CliError,
};

const CUSTOM_HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

/// The batch operation to run over the input directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Command {
    /// Compress every non-archive file into its own 7z archive.
    #[value(name = "compressfiles")]
    CompressFiles,

    /// Compress the contents of every subdirectory into a 7z archive.
    #[value(name = "compressdirs")]
    CompressDirs,

    /// Extract every archive into a directory named after it.
    #[value(name = "extract")]
    Extract,

    /// Extract PSX disc archives and normalize their file names.
    #[value(name = "extract-psx")]
    ExtractPsx,

    /// Point every cue sheet at the bin file named after it.
    #[value(name = "psx-fix-cue")]
    PsxFixCue,

    /// Group normalized per-disc files by title into one 7z per game.
    #[value(name = "compress-psx")]
    CompressPsx,

    /// Re-archive every archive as 7z.
    #[value(name = "transcode")]
    Transcode,
}

impl Command {
    fn uses_delete(self) -> bool {
        matches!(
            self,
            Command::CompressFiles
                | Command::CompressDirs
                | Command::Extract
                | Command::Transcode
        )
    }
}

/// Defines the command-line arguments for the application.
#[derive(Clone, Parser, Debug)]
#[command(version, about, long_about = None,
    help_template = CUSTOM_HELP_TEMPLATE)]
pub struct Args {
    ///Batch command to run.
    #[arg(value_enum)]
    pub command: Command,

    ///Directory whose direct children are processed.
    #[arg(long = "in", value_name = "DIR", help_heading = "Primary Options")]
    pub input: Option<PathBuf>,

    ///Directory receiving the results.
    #[arg(long = "out", value_name = "DIR", help_heading = "Primary Options")]
    pub output: Option<PathBuf>,

    ///Remove originals after a successful operation. Used by
    ///compressfiles, compressdirs, extract and transcode.
    #[arg(long, help_heading = "Primary Options", default_value_t = false)]
    pub delete: bool,

    ///With compressfiles --delete, keep the original instead of the
    ///archive when archive size / original size exceeds this value.
    #[arg(long = "maxratio", value_name = "RATIO",
    help_heading = "Tuning Parameters", default_value_t = 0.9)]
    pub max_ratio: f64,

    ///Sets the archiver compression level (0-9).
    #[arg(long, help_heading = "Tuning Parameters", default_value_t = 9)]
    pub compression_level: u8,

    ///Directory containing 7za, UnRAR and unecm.
    #[arg(long = "binaries", value_name = "DIR",
    help_heading = "Behavior and Output Control")]
    pub binaries_dir: Option<PathBuf>,

    ///Ignore the configuration file and use built-in defaults.
    #[arg(long, help_heading = "Behavior and Output Control",
    default_value_t = false)]
    pub ignore_config: bool,

    ///Activates verbose output for detailed diagnostic information.
    #[arg(short, long, help_heading = "Behavior and Output Control",
    default_value_t = false)]
    pub verbose: bool,

    ///Activates quiet mode, suppressing all non-essential output.
    #[arg(short, long, help_heading = "Behavior and Output Control",
    default_value_t = false)]
    pub quiet: bool,
}

/// Validates the command-line arguments provided by the user.
///
/// # Errors
///
/// Returns an error in the following cases:
/// - `--in` or `--out` is missing.
/// - `--maxratio` is not a positive number.
/// - `--compression-level` is above 9.
pub fn validate_args(
    args: &Args,
    matches: &ArgMatches
) -> Result<(), CliError> {
    let arg_was_provided = |name: &str| {
        matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
    };

    if args.input.is_none() {
        return Err(CliError::MissingFlag(
            "Input directory (--in) is required.".to_string(),
        ));
    }
    if args.output.is_none() {
        return Err(CliError::MissingFlag(
            "Output directory (--out) is required.".to_string(),
        ));
    }

    if !(args.max_ratio.is_finite() && args.max_ratio > 0.0) {
        return Err(CliError::ConfigurationError(format!(
            "Invalid max ratio {}. Must be a positive number.",
            args.max_ratio
        )));
    }

    if args.compression_level > 9 {
        return Err(CliError::ConfigurationError(format!(
            "Invalid compression level {}. Must be between 0 and 9.",
            args.compression_level
        )));
    }

    if args.delete && !args.command.uses_delete() {
        warn!("--delete has no effect with {:?}.", args.command);
    }
    if arg_was_provided("max_ratio") && args.command != Command::CompressFiles {
        warn!("--maxratio only applies to compressfiles.");
    }

    Ok(())
}

/// Merges settings from a configuration file with command-line arguments.
///
/// Command-line arguments take precedence; every option the user did not
/// pass explicitly is taken from `config`.
pub fn merge_config_and_args (
    config: &DiscZipConfig,
    mut args: Args,
    matches: &ArgMatches,
) -> Args {
    let arg_was_present = |name: &str| {
        matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
    };

    if !arg_was_present("max_ratio") {
        args.max_ratio = config.max_ratio;
    }
    if !arg_was_present("compression_level") {
        args.compression_level = config.compression_level;
    }
    if !arg_was_present("binaries_dir") && !config.binaries_dir.is_empty() {
        args.binaries_dir = Some(PathBuf::from(&config.binaries_dir));
    }
    if !arg_was_present("verbose") {
        args.verbose = config.verbose;
    }
    if !arg_was_present("quiet") {
        args.quiet = config.quiet_output;
    }

    args
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, FromArgMatches};

    use super::*;

    fn parse(argv: &[&str]) -> (Args, ArgMatches) {
        let matches = Args::command().try_get_matches_from(argv).unwrap();
        let args = Args::from_arg_matches(&matches).unwrap();
        (args, matches)
    }

    #[test]
    fn batch_flags_parse() {
        let (args, matches) = parse(&[
            "disczip", "compressfiles", "--in", "/src", "--out", "/dst",
            "--maxratio", "0.75", "--delete",
        ]);

        assert_eq!(args.command, Command::CompressFiles);
        assert_eq!(args.input, Some(PathBuf::from("/src")));
        assert_eq!(args.output, Some(PathBuf::from("/dst")));
        assert_eq!(args.max_ratio, 0.75);
        assert!(args.delete);
        assert!(validate_args(&args, &matches).is_ok());
    }

    #[test]
    fn missing_output_is_reported() {
        let (args, matches) = parse(&["disczip", "extract-psx", "--in", "/src"]);

        assert!(matches!(
            validate_args(&args, &matches),
            Err(CliError::MissingFlag(_))
        ));
    }

    #[test]
    fn unknown_command_is_rejected_by_the_parser() {
        assert!(Args::command()
            .try_get_matches_from(["disczip", "shrink", "--in", "a", "--out", "b"])
            .is_err());
    }

    #[test]
    fn config_fills_only_flags_not_given() {
        let config = DiscZipConfig {
            binaries_dir: "/opt/tools".to_string(),
            compression_level: 5,
            max_ratio: 0.5,
            verbose: true,
            quiet_output: false,
            ..DiscZipConfig::default()
        };
        let (args, matches) = parse(&[
            "disczip", "transcode", "--in", "a", "--out", "b",
            "--compression-level", "7",
        ]);

        let merged = merge_config_and_args(&config, args, &matches);

        assert_eq!(merged.compression_level, 7);
        assert_eq!(merged.max_ratio, 0.5);
        assert_eq!(merged.binaries_dir, Some(PathBuf::from("/opt/tools")));
        assert!(merged.verbose);
        assert!(!merged.quiet);
    }
}
