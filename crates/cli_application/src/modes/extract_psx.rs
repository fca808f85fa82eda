//! Implements the `extract-psx` mode.
//!
//! Each disc archive in the input directory walks through a fixed series
//! of stages inside its own scratch workspace: extraction, ECM decoding,
//! removal of redundant wrapper directories, a census of the disc files,
//! cue sheet repair, canonical renaming after the archive name, and the
//! final move into the output directory. The workspace is discarded when
//! the item finishes or aborts. The one exception is a workspace holding
//! several discs, which is kept on disk for manual inspection.
//!
//! A failing ECM decode, an ambiguous disc set or an unexpected existing
//! destination aborts the whole run. A failed archive extraction does not:
//! it is logged and whatever was unpacked is still normalized.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use disczip::{
    DiscZipError, ECM_TOOL, ExtractionWorkspace, ToolOutcome, ToolRunner,
    checked_census, collect_files, denest, file_name_of, has_extension,
    is_archive, relocate_files, rename_disc_set, repair_cue,
    replace_file_extension, try_force_delete_file
};

use crate::{
    cli_types::{BatchContext, ItemStage},
    error_handling::CliError,
    modes::item_progress,
    storage_io::list_files,
};

/// One archive on its way through the stages.
///
/// # Fields
///
/// * `archive`: The source archive.
/// * `game_name`: Canonical name, the archive file name without its final
///   extension.
/// * `stage`: The stage currently being executed.
struct DiscItem<'a> {
    archive: &'a Path,
    game_name: String,
    stage: ItemStage,
}

impl<'a> DiscItem<'a> {
    fn new(archive: &'a Path) -> Result<Self, CliError> {
        Ok(Self {
            archive,
            game_name: replace_file_extension(&file_name_of(archive)?, None),
            stage: ItemStage::Pending,
        })
    }

    fn enter(&mut self, stage: ItemStage) {
        debug!("{}: {} -> {}", self.game_name, self.stage, stage);
        self.stage = stage;
    }

    /// Runs every stage against `workspace`.
    fn process<R: ToolRunner>(
        &mut self,
        ctx: &BatchContext<R>,
        workspace: &ExtractionWorkspace,
    ) -> Result<(), CliError> {
        let content_dir = workspace.content_dir();

        self.enter(ItemStage::Extracting);
        match ctx.tools.extract(self.archive, &content_dir)? {
            ToolOutcome::Success => {}
            ToolOutcome::DestinationExists => {
                return Err(CliError::DestinationExists(content_dir));
            }
            ToolOutcome::ProgramError(code) => {
                error!(
                    "Failed to extract {} (exit code {code}), continuing with \
                    the extracted files.",
                    self.archive.display()
                );
            }
        }

        self.enter(ItemStage::Decoding);
        decode_ecm_files(ctx, &content_dir)?;

        self.enter(ItemStage::Denesting);
        let root = denest(&content_dir, &self.game_name);

        self.enter(ItemStage::Censusing);
        let census = checked_census(&root)?;

        self.enter(ItemStage::Repairing);
        let bin_base_name = repair_cue(&root, &census, &self.game_name)?;

        self.enter(ItemStage::Renaming);
        rename_disc_set(&root, &self.game_name, &bin_base_name)?;

        self.enter(ItemStage::Relocating);
        let report = relocate_files(&root, &ctx.output_dir)?;
        if !report.skipped.is_empty() {
            warn!(
                "{}: {} file(s) left behind because the output already \
                holds them.",
                self.game_name,
                report.skipped.len()
            );
        }

        self.enter(ItemStage::Done);
        Ok(())
    }
}

/// Decodes every `.ecm` file below `dir` next to itself and deletes the
/// encoded file. An existing decoded file is kept as is.
fn decode_ecm_files<R: ToolRunner>(
    ctx: &BatchContext<R>,
    dir: &Path,
) -> Result<(), CliError> {
    let encoded: Vec<PathBuf> = collect_files(dir)?
        .into_iter()
        .filter(|path| has_extension(path, "ecm"))
        .collect();

    for ecm in encoded {
        let decoded = ecm.with_extension("");

        match ctx.tools.decode_ecm(&ecm, &decoded) {
            ToolOutcome::Success | ToolOutcome::DestinationExists => {}
            ToolOutcome::ProgramError(code) => {
                return Err(CliError::ToolFailure {
                    tool: ECM_TOOL.to_string(),
                    path: ecm,
                    code,
                });
            }
        }

        try_force_delete_file(&ecm);
    }

    Ok(())
}

/// Extracts and normalizes every disc archive in the input directory.
///
/// # Errors
///
/// Stops at the first item that aborts and returns its error. Items
/// processed before it keep their output.
pub fn run_extract_psx<R: ToolRunner>(ctx: &BatchContext<R>) -> Result<(), CliError> {
    let archives: Vec<PathBuf> = list_files(&ctx.input_dir)?
        .into_iter()
        .filter(|path| {
            let archive = is_archive(path);
            if !archive {
                warn!("Skipping {}: not an archive", path.display());
            }
            archive
        })
        .collect();
    let progress = item_progress(archives.len(), ctx.quiet, "Extracting discs...")?;

    for archive in &archives {
        if let Some(bar) = &progress {
            bar.inc(1);
        }

        let mut item = DiscItem::new(archive)?;
        let workspace = ExtractionWorkspace::create_in(&ctx.scratch_dir)?;

        match item.process(ctx, &workspace) {
            Ok(()) => {
                info!("Finished {}", item.game_name);
                workspace.release();
            }
            Err(e) => {
                let failed_stage = item.stage;
                item.enter(ItemStage::Aborted);

                if matches!(e, CliError::DiscZip(DiscZipError::AmbiguousDiscSet { .. })) {
                    let kept = workspace.preserve();
                    error!(
                        "{}: aborted while {failed_stage}. Workspace kept at {} \
                        for inspection.",
                        item.game_name,
                        kept.display()
                    );
                } else {
                    error!("{}: aborted while {failed_stage}.", item.game_name);
                    workspace.release();
                }

                if let Some(bar) = &progress {
                    bar.abandon();
                }
                return Err(e);
            }
        }
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    Ok(())
}
