//! Implements the `compressdirs` mode.
//!
//! Each subdirectory of the input directory is unwrapped from any chain of
//! same-named wrapper directories and its contents are archived as
//! `<output>/<name>.7z`.

use tracing::error;

use disczip::{
    ToolOutcome, ToolRunner,
    denest_self_named, file_name_of, replace_file_extension,
    try_force_delete_dir, try_force_delete_file
};

use crate::{
    cli_types::BatchContext,
    error_handling::CliError,
    modes::item_progress,
    storage_io::list_dirs,
};

pub fn run_compress_dirs<R: ToolRunner>(ctx: &BatchContext<R>) -> Result<(), CliError> {
    let dirs = list_dirs(&ctx.input_dir)?;
    let progress = item_progress(dirs.len(), ctx.quiet, "Compressing directories...")?;

    for dir in &dirs {
        if let Some(bar) = &progress {
            bar.inc(1);
        }

        let content_dir = denest_self_named(dir);
        let archive_name = replace_file_extension(&file_name_of(&content_dir)?, Some("7z"));
        let output = ctx.output_dir.join(archive_name);

        match ctx.tools.compress_directory(&content_dir, &output) {
            ToolOutcome::Success => {
                if ctx.delete {
                    try_force_delete_dir(dir);
                }
            }
            ToolOutcome::DestinationExists => {}
            ToolOutcome::ProgramError(code) => {
                error!("Failed to compress {} (exit code {code})", dir.display());
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

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::modes::test_support::{ScriptedRunner, context, names};

    #[test]
    fn wrapped_directory_contents_are_archived() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let inner = input.path().join("Game v1.0").join("Game v1.0");
        fs::create_dir_all(&inner).unwrap();
        fs::write(inner.join("Game.bin"), b"data").unwrap();
        let ctx = context(ScriptedRunner::default(), input.path(), output.path(), true);

        run_compress_dirs(&ctx).unwrap();

        assert_eq!(names(output.path()), vec!["Game v1.7z"]);
        let calls = ctx.tools.runner().tool_calls("7za");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][5], inner.join("*").to_string_lossy());
        assert!(names(input.path()).is_empty());
    }

    #[test]
    fn existing_archive_is_left_alone() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::create_dir(input.path().join("Game")).unwrap();
        fs::write(output.path().join("Game.7z"), b"old").unwrap();
        let ctx = context(ScriptedRunner::default(), input.path(), output.path(), true);

        run_compress_dirs(&ctx).unwrap();

        assert!(ctx.tools.runner().tool_calls("7za").is_empty());
        assert_eq!(fs::read(output.path().join("Game.7z")).unwrap(), b"old");
        assert_eq!(names(input.path()), vec!["Game"]);
    }

    #[test]
    fn failed_compression_removes_partial_archive_with_delete() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::create_dir(input.path().join("Game")).unwrap();
        fs::write(input.path().join("Game").join("Game.bin"), b"data").unwrap();
        let ctx = context(
            ScriptedRunner::default().failing("7za", 2).leaving_partial_archives(),
            input.path(),
            output.path(),
            true,
        );

        run_compress_dirs(&ctx).unwrap();

        assert_eq!(ctx.tools.runner().tool_calls("7za").len(), 1);
        assert!(names(output.path()).is_empty());
        assert_eq!(names(input.path()), vec!["Game"]);
    }

    #[test]
    fn partial_archive_is_kept_without_delete() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::create_dir(input.path().join("Game")).unwrap();
        let ctx = context(
            ScriptedRunner::default().failing("7za", 2).leaving_partial_archives(),
            input.path(),
            output.path(),
            false,
        );

        run_compress_dirs(&ctx).unwrap();

        assert_eq!(names(output.path()), vec!["Game.7z"]);
    }
}
