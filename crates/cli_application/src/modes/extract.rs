//! Implements the `extract` mode: every archive in the input directory is
//! unpacked into `<output>/<stem>/`.

use tracing::{error, warn};

use disczip::{
    ToolOutcome, ToolRunner,
    file_name_of, is_archive, replace_file_extension, try_force_delete_file
};

use crate::{
    cli_types::BatchContext,
    error_handling::CliError,
    modes::item_progress,
    storage_io::list_files,
};

pub fn run_extract<R: ToolRunner>(ctx: &BatchContext<R>) -> Result<(), CliError> {
    let files = list_files(&ctx.input_dir)?;
    let progress = item_progress(files.len(), ctx.quiet, "Extracting archives...")?;

    for file in &files {
        if let Some(bar) = &progress {
            bar.inc(1);
        }

        if !is_archive(file) {
            warn!("Skipping {}: not an archive", file.display());
            continue;
        }

        let dest_dir = ctx
            .output_dir
            .join(replace_file_extension(&file_name_of(file)?, None));

        match ctx.tools.extract(file, &dest_dir)? {
            ToolOutcome::Success => {
                if ctx.delete {
                    try_force_delete_file(file);
                }
            }
            ToolOutcome::DestinationExists => {}
            ToolOutcome::ProgramError(code) => {
                error!("Failed to extract {} (exit code {code})", file.display());
            }
        }
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::modes::test_support::{ScriptedRunner, context, names};

    #[test]
    fn rar_and_zip_use_their_extractors() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(input.path().join("A.rar"), b"").unwrap();
        fs::write(input.path().join("B.zip"), b"").unwrap();
        let runner = ScriptedRunner::default()
            .with_archive("A.rar", &[("a.bin", "a")])
            .with_archive("B.zip", &[("b.bin", "b")]);
        let ctx = context(runner, input.path(), output.path(), true);

        run_extract(&ctx).unwrap();

        assert_eq!(names(output.path()), vec!["A", "B"]);
        assert!(output.path().join("A/a.bin").exists());
        assert!(output.path().join("B/b.bin").exists());
        assert_eq!(ctx.tools.runner().tool_calls("UnRAR").len(), 1);
        assert_eq!(ctx.tools.runner().tool_calls("7za").len(), 1);
        assert!(names(input.path()).is_empty());
    }

    #[test]
    fn existing_destination_is_skipped_and_input_kept() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(input.path().join("A.7z"), b"").unwrap();
        fs::create_dir(output.path().join("A")).unwrap();
        let ctx = context(ScriptedRunner::default(), input.path(), output.path(), true);

        run_extract(&ctx).unwrap();

        assert!(ctx.tools.runner().tool_calls("7za").is_empty());
        assert_eq!(names(input.path()), vec!["A.7z"]);
    }
}
