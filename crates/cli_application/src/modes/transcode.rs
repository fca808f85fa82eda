//! Implements the `transcode` mode: every archive is unpacked into a
//! scratch workspace and packed again as 7z.
//!
//! A failed extraction is logged and the mode still attempts compression
//! of whatever was unpacked; with `--delete` the partial content is
//! discarded first so the archiver reports the failure.

use tracing::{error, warn};

use disczip::{
    ExtractionWorkspace, ToolOutcome, ToolRunner,
    denest, file_name_of, is_archive, replace_file_extension,
    try_force_delete_dir, try_force_delete_file
};

use crate::{
    cli_types::BatchContext,
    error_handling::CliError,
    modes::item_progress,
    storage_io::list_files,
};

pub fn run_transcode<R: ToolRunner>(ctx: &BatchContext<R>) -> Result<(), CliError> {
    let files = list_files(&ctx.input_dir)?;
    let progress = item_progress(files.len(), ctx.quiet, "Transcoding archives...")?;

    for file in &files {
        if let Some(bar) = &progress {
            bar.inc(1);
        }

        if !is_archive(file) {
            continue;
        }

        let stem = replace_file_extension(&file_name_of(file)?, None);
        let output = ctx.output_dir.join(format!("{stem}.7z"));
        if output.exists() {
            warn!("Output archive {} already exists!", output.display());
            continue;
        }

        let workspace = ExtractionWorkspace::create_in(&ctx.scratch_dir)?;
        let content_dir = workspace.content_dir();

        match ctx.tools.extract(file, &content_dir)? {
            ToolOutcome::Success => {}
            ToolOutcome::DestinationExists => {
                warn!("Workspace {} was not empty.", content_dir.display());
            }
            ToolOutcome::ProgramError(code) => {
                error!("Failed to extract {} (exit code {code})", file.display());
                if ctx.delete {
                    try_force_delete_dir(&content_dir);
                }
            }
        }

        let source_dir = denest(&content_dir, &stem);
        match ctx.tools.compress_directory(&source_dir, &output) {
            ToolOutcome::Success => {
                if ctx.delete {
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

        workspace.release();
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    Ok(())
}
