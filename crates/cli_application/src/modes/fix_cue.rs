//! Implements the `psx-fix-cue` mode.
//!
//! Cue sheets whose `FILE` lines reference a bin under a different name
//! than the sheet itself are rewritten so every quoted `.bin` reference
//! becomes `<cue stem>.bin`. The repaired sheet is written to the output
//! directory under the original cue file name, which may be the input
//! directory itself.

use tracing::info;

use disczip::{
    CueSheet, ToolRunner,
    file_name_of, has_extension, replace_file_extension
};

use crate::{
    cli_types::BatchContext,
    error_handling::CliError,
    storage_io::list_files,
};

pub fn run_fix_cue<R: ToolRunner>(ctx: &BatchContext<R>) -> Result<(), CliError> {
    for file in list_files(&ctx.input_dir)? {
        if !has_extension(&file, "cue") {
            continue;
        }

        let cue_name = file_name_of(&file)?;
        let bin_name = replace_file_extension(&cue_name, Some("bin"));
        let target = ctx.output_dir.join(&cue_name);

        info!("Fixing {} to reference {bin_name}", file.display());
        CueSheet::read_from(&file)?
            .fix_bin_references(&bin_name)
            .write_to(&target)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::modes::test_support::{ScriptedRunner, context, names};

    #[test]
    fn references_follow_the_cue_name() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(
            input.path().join("Crash (USA).cue"),
            "FILE \"SCUS_949.00.BIN\" BINARY\n  TRACK 01 MODE2/2352\n",
        )
        .unwrap();
        fs::write(input.path().join("Crash (USA).bin"), b"").unwrap();
        let ctx = context(ScriptedRunner::default(), input.path(), output.path(), false);

        run_fix_cue(&ctx).unwrap();

        assert_eq!(names(output.path()), vec!["Crash (USA).cue"]);
        assert_eq!(
            fs::read_to_string(output.path().join("Crash (USA).cue")).unwrap(),
            "FILE \"Crash (USA).bin\" BINARY\n  TRACK 01 MODE2/2352\n"
        );
    }

    #[test]
    fn shift_jis_bin_names_are_replaced() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(
            input.path().join("Game.cue"),
            b"FILE \"\x83Q\x81[\x83\x80.bin\" BINARY\r\n  TRACK 01 MODE2/2352\r\n",
        )
        .unwrap();
        let ctx = context(ScriptedRunner::default(), input.path(), output.path(), false);

        run_fix_cue(&ctx).unwrap();

        assert_eq!(
            fs::read(output.path().join("Game.cue")).unwrap(),
            b"FILE \"Game.bin\" BINARY\n  TRACK 01 MODE2/2352\n"
        );
    }

    #[test]
    fn fixing_in_place_overwrites_the_sheet() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Game.cue"), "FILE \"track.bin\" BINARY\n").unwrap();
        let ctx = context(ScriptedRunner::default(), dir.path(), dir.path(), false);

        run_fix_cue(&ctx).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("Game.cue")).unwrap(),
            "FILE \"Game.bin\" BINARY\n"
        );
    }
}
