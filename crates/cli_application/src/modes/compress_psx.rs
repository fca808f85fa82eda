//! Implements the `compress-psx` mode.
//!
//! Normalized per-disc files are grouped by game title and every group is
//! packed into one 7z archive named after its first disc with the disc
//! marker removed.

use tracing::{error, info};

use disczip::{ToolOutcome, ToolRunner, group_by_game};

use crate::{
    cli_types::BatchContext,
    error_handling::CliError,
    modes::item_progress,
    storage_io::list_files,
};

pub fn run_compress_psx<R: ToolRunner>(ctx: &BatchContext<R>) -> Result<(), CliError> {
    let files = list_files(&ctx.input_dir)?;
    let groups = group_by_game(&files, "7z");
    info!("Found {} games in {} files.", groups.len(), files.len());

    let progress = item_progress(groups.len(), ctx.quiet, "Compressing games...")?;

    for group in &groups {
        if let Some(bar) = &progress {
            bar.inc(1);
        }

        let output = group.archive_path(&ctx.output_dir);
        match ctx.tools.compress_files(&group.members, &output)? {
            ToolOutcome::Success | ToolOutcome::DestinationExists => {}
            ToolOutcome::ProgramError(code) => {
                error!(
                    "Failed to compress {} (exit code {code})",
                    group.game_key
                );
            }
        }
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    Ok(())
}
