//! Canonical renaming of an extracted disc set.
//!
//! After a census has established the authoritative cue and bin names,
//! every disc file in the workspace is renamed after the game. Bin and wav
//! files keep whatever followed the original base name (track numbers,
//! disc markers), cue sheets are rewritten to point at the renamed bins,
//! and single-file image formats simply take the game name. Files that are
//! not part of a disc image are removed.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    census::checked_census,
    lib_error_handling::DiscZipError,
    lib_structs::{CueSheet, DiscFileRecord, DiscRole, DiscSetCensus},
    util::{collect_files, file_name_of, move_file, try_force_delete_file},
};

/// Summary of a relocation into the output directory.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RelocationReport {
    pub moved: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Writes a default cue sheet when the census found a bin without a cue,
/// and resolves the base name the renamer substitutes.
///
/// The synthesized sheet is written to `root` as `<bin base>.cue`. When a
/// cue exists but no bin was found, the cue base name stands in for the
/// bin base name. With neither, the returned name is empty and renaming
/// performs no substitution.
pub fn repair_cue(
    root: &Path,
    census: &DiscSetCensus,
    game_name: &str,
) -> Result<String, DiscZipError> {
    match (&census.cue_base_name, &census.bin_base_name) {
        (None, Some(bin)) => {
            warn!(
                "Found .bin file without corresponding .cue, generating \
                default cuesheet for {game_name}. Please check it for \
                correctness."
            );
            CueSheet::synthesize(bin).write_to(&root.join(format!("{bin}.cue")))?;
            Ok(bin.clone())
        }
        (Some(cue), None) => Ok(cue.clone()),
        (_, Some(bin)) => Ok(bin.clone()),
        (None, None) => Ok(String::new()),
    }
}

/// Renames every file below `root` after `game_name`.
///
/// # Arguments
///
/// * `root`: The workspace directory holding the disc set.
/// * `game_name`: The canonical name every disc file receives.
/// * `bin_base_name`: The substring of bin/wav names to replace and the
///   cue sheet reference to rewrite.
///
/// # Returns
///
/// The paths of the renamed disc files.
pub fn rename_disc_set(
    root: &Path,
    game_name: &str,
    bin_base_name: &str,
) -> Result<Vec<PathBuf>, DiscZipError> {
    let mut renamed = Vec::new();

    for path in collect_files(root)? {
        let record = DiscFileRecord::from_path(&path);
        let dir = path.parent().unwrap_or(root);

        match record.role {
            DiscRole::Foreign => {
                warn!("Deleting non-image file {}", path.display());
                try_force_delete_file(&path);
            }
            DiscRole::CueSheet => {
                let sheet = CueSheet::read_from(&path)?
                    .rewrite_references(bin_base_name, game_name);
                let target = dir.join(format!("{game_name}.cue"));

                fs::remove_file(&path)?;
                sheet.write_to(&target)?;
                renamed.push(target);
            }
            DiscRole::ImageBinary | DiscRole::AudioTrack => {
                let file_name = file_name_of(&path)?;
                let new_name = if bin_base_name.is_empty() {
                    file_name
                } else {
                    file_name.replace(bin_base_name, game_name)
                };
                renamed.push(rename_within(&path, &dir.join(new_name))?);
            }
            DiscRole::OtherImageArtifact => {
                let extension = path
                    .extension()
                    .map(|ext| format!(".{}", ext.to_string_lossy()))
                    .unwrap_or_default();
                let target = dir.join(format!("{game_name}{extension}"));
                renamed.push(rename_within(&path, &target)?);
            }
        }
    }

    Ok(renamed)
}

/// Renames `source` to `target` unless another file already holds the
/// target name, in which case the file keeps its original name.
fn rename_within(source: &Path, target: &Path) -> Result<PathBuf, DiscZipError> {
    if source == target {
        return Ok(source.to_path_buf());
    }
    if target.exists() {
        warn!(
            "Cannot rename {} to {}: target already exists",
            source.display(),
            target.display()
        );
        return Ok(source.to_path_buf());
    }

    debug!("Renaming {} to {}", source.display(), target.display());
    fs::rename(source, target)?;
    Ok(target.to_path_buf())
}

/// Runs census, cue repair and canonical renaming over one disc set.
///
/// # Errors
///
/// Returns `DiscZipError::AmbiguousDiscSet` when the workspace holds more
/// than one disc, leaving every file untouched. I/O failures while
/// rewriting or renaming are propagated.
pub fn normalize_disc_set(
    root: &Path,
    game_name: &str,
) -> Result<Vec<PathBuf>, DiscZipError> {
    let census = checked_census(root)?;
    let bin_base_name = repair_cue(root, &census, game_name)?;
    rename_disc_set(root, game_name, &bin_base_name)
}

/// Moves every file below `root` flat into `output_dir`.
///
/// Files whose name already exists in the output directory are left where
/// they are and reported as skipped.
pub fn relocate_files(
    root: &Path,
    output_dir: &Path,
) -> Result<RelocationReport, DiscZipError> {
    let mut report = RelocationReport::default();

    for path in collect_files(root)? {
        let target = output_dir.join(file_name_of(&path)?);

        if target.exists() {
            warn!("The target file {} already exists!", target.display());
            report.skipped.push(path);
            continue;
        }

        move_file(&path, &target)?;
        report.moved.push(target);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_rename_preserves_track_suffix() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("OldName (Track 2).bin"), b"t2").unwrap();

        let renamed = rename_disc_set(tmp.path(), "MyGame", "OldName").unwrap();

        assert_eq!(renamed, vec![tmp.path().join("MyGame (Track 2).bin")]);
        assert!(tmp.path().join("MyGame (Track 2).bin").exists());
    }

    #[test]
    fn cue_is_rewritten_and_renamed() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("SLUS-00001.cue"),
            "FILE \"OldName.bin\" BINARY\n  TRACK 01 MODE2/2352\n    INDEX 01 00:00:00\n",
        )
        .unwrap();
        fs::write(tmp.path().join("OldName.bin"), b"data").unwrap();

        rename_disc_set(tmp.path(), "MyGame", "OldName").unwrap();

        assert!(!tmp.path().join("SLUS-00001.cue").exists());
        let cue = fs::read_to_string(tmp.path().join("MyGame.cue")).unwrap();
        assert!(cue.contains("\"MyGame.bin\""));
        assert!(!cue.contains("OldName"));
        assert!(tmp.path().join("MyGame.bin").exists());
    }

    #[test]
    fn single_file_images_take_the_game_name() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("disc_image.ISO"), b"iso").unwrap();

        rename_disc_set(tmp.path(), "MyGame", "").unwrap();

        assert!(tmp.path().join("MyGame.ISO").exists());
    }

    #[test]
    fn foreign_files_are_deleted() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("readme.txt"), b"hello").unwrap();
        fs::write(tmp.path().join("Game.iso"), b"iso").unwrap();

        let renamed = rename_disc_set(tmp.path(), "Game", "").unwrap();

        assert_eq!(renamed, vec![tmp.path().join("Game.iso")]);
        assert!(!tmp.path().join("readme.txt").exists());
    }

    #[test]
    fn cue_without_bin_uses_cue_name_as_source() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("Orig.cue"),
            "FILE \"Orig.img\" BINARY\n",
        )
        .unwrap();
        fs::write(tmp.path().join("Orig.img"), b"img").unwrap();

        normalize_disc_set(tmp.path(), "New").unwrap();

        let cue = fs::read_to_string(tmp.path().join("New.cue")).unwrap();
        assert_eq!(cue, "FILE \"New.img\" BINARY\n");
        assert!(tmp.path().join("New.img").exists());
    }

    #[test]
    fn relocation_skips_existing_targets() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::create_dir_all(work.path().join("sub")).unwrap();
        fs::write(work.path().join("sub/Game.bin"), b"new").unwrap();
        fs::write(work.path().join("Game.cue"), b"new").unwrap();
        fs::write(out.path().join("Game.cue"), b"old").unwrap();

        let report = relocate_files(work.path(), out.path()).unwrap();

        assert_eq!(report.moved, vec![out.path().join("Game.bin")]);
        assert_eq!(report.skipped, vec![work.path().join("Game.cue")]);
        assert_eq!(fs::read(out.path().join("Game.cue")).unwrap(), b"old");
    }
}
