//! Implements the `compressfiles` mode.
//!
//! Every file in the input directory that is not already an archive is
//! compressed into `<output>/<stem>.7z`. With `--delete` the smaller of
//! the two survives: the original is removed unless the archive is larger
//! than `max_ratio` of it, in which case the archive is discarded.

use std::path::Path;

use tracing::{debug, error, info};

use disczip::{
    ToolOutcome, ToolRunner,
    file_name_of, is_archive, replace_file_extension, try_force_delete_file
};

use crate::{
    cli_types::BatchContext,
    error_handling::CliError,
    modes::item_progress,
    storage_io::{file_size, list_files},
};

/// Size of the archive relative to the original. An empty original
/// counts as one byte.
fn compression_ratio(input: &Path, output: &Path) -> Result<f64, CliError> {
    let original = file_size(input)?.max(1);
    let compressed = file_size(output)?;

    Ok(compressed as f64 / original as f64)
}

pub fn run_compress_files<R: ToolRunner>(ctx: &BatchContext<R>) -> Result<(), CliError> {
    let files = list_files(&ctx.input_dir)?;
    let progress = item_progress(files.len(), ctx.quiet, "Compressing files...")?;

    for file in &files {
        if let Some(bar) = &progress {
            bar.inc(1);
        }

        if is_archive(file) {
            debug!("Skipping archive {}", file.display());
            continue;
        }

        let archive_name = replace_file_extension(&file_name_of(file)?, Some("7z"));
        let output = ctx.output_dir.join(archive_name);

        match ctx.tools.compress_file(file, &output) {
            ToolOutcome::Success => {
                if !ctx.delete {
                    continue;
                }

                let ratio = compression_ratio(file, &output)?;
                if ratio > ctx.max_ratio {
                    info!(
                        "Compression ratio {ratio:.3} of {} is above {}, \
                        keeping the original.",
                        file.display(),
                        ctx.max_ratio
                    );
                    try_force_delete_file(&output);
                } else {
                    debug!("Compression ratio {ratio:.3}, deleting {}", file.display());
                    try_force_delete_file(file);
                }
            }
            ToolOutcome::DestinationExists => {}
            ToolOutcome::ProgramError(code) => {
                error!("Failed to compress {} (exit code {code})", file.display());
                if ctx.delete {
                    try_force_delete_file(&output);
                }
            }
        }
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    Ok(())
}
