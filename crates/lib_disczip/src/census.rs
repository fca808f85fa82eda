//! Tallies the files of an extracted disc set.

use std::path::Path;

use tracing::debug;

use crate::{
    lib_error_handling::DiscZipError,
    lib_structs::{DiscFileRecord, DiscRole, DiscSetCensus},
    util::collect_files,
};

/// Scans every file below `root` and builds a `DiscSetCensus`.
///
/// Files are visited in sorted path order. The first cue sheet and the
/// first `.bin` encountered provide the authoritative base names, since
/// bin files are almost always named after their cue.
///
/// # Errors
///
/// Returns an error if the directory tree cannot be walked.
pub fn census(root: &Path) -> Result<DiscSetCensus, DiscZipError> {
    let mut result = DiscSetCensus::default();

    for path in collect_files(root)? {
        let record = DiscFileRecord::from_path(&path);

        *result
            .count_by_extension
            .entry(record.extension.clone())
            .or_insert(0) += 1;

        match record.role {
            DiscRole::CueSheet if result.cue_base_name.is_none() => {
                result.cue_base_name = Some(record.base_name());
            }
            DiscRole::ImageBinary
                if record.extension == ".bin" && result.bin_base_name.is_none() =>
            {
                result.bin_base_name = Some(record.base_name());
            }
            _ => {}
        }
    }

    debug!(
        "Census of {}: {:?}, cue = {:?}, bin = {:?}",
        root.display(),
        result.count_by_extension,
        result.cue_base_name,
        result.bin_base_name
    );

    Ok(result)
}

/// Runs a census and rejects disc sets that hold more than one disc.
///
/// # Errors
///
/// Returns `DiscZipError::AmbiguousDiscSet` when any single-disc format
/// occurs more than once, or any error from `census`.
pub fn checked_census(root: &Path) -> Result<DiscSetCensus, DiscZipError> {
    let result = census(root)?;
    let ambiguous = result.ambiguous_extensions();

    if !ambiguous.is_empty() {
        return Err(DiscZipError::AmbiguousDiscSet {
            workspace: root.to_path_buf(),
            extensions: ambiguous.join(", "),
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn two_cue_sheets_are_ambiguous() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Disc1.cue"), b"").unwrap();
        fs::write(tmp.path().join("Disc2.cue"), b"").unwrap();
        fs::write(tmp.path().join("Disc1.bin"), b"").unwrap();

        let result = census(tmp.path()).unwrap();

        assert!(result.is_ambiguous());
        assert_eq!(result.ambiguous_extensions(), vec![".cue"]);
        assert!(matches!(
            checked_census(tmp.path()),
            Err(DiscZipError::AmbiguousDiscSet { .. })
        ));
    }

    #[test]
    fn single_pair_populates_base_names() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Some Game.CUE"), b"").unwrap();
        fs::write(tmp.path().join("Some Game (Track 1).bin"), b"").unwrap();

        let result = checked_census(tmp.path()).unwrap();

        assert_eq!(result.count(".cue"), 1);
        assert_eq!(result.count(".bin"), 1);
        assert_eq!(result.cue_base_name.as_deref(), Some("Some Game"));
        assert_eq!(result.bin_base_name.as_deref(), Some("Some Game (Track 1)"));
    }

    #[test]
    fn first_bin_in_sorted_order_wins() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Game (Track 2).bin"), b"").unwrap();
        fs::write(tmp.path().join("Game (Track 1).bin"), b"").unwrap();

        let result = census(tmp.path()).unwrap();

        assert_eq!(result.bin_base_name.as_deref(), Some("Game (Track 1)"));
        assert!(!result.is_ambiguous());
    }

    #[test]
    fn wav_never_provides_the_bin_base_name() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Audio.wav"), b"").unwrap();

        let result = census(tmp.path()).unwrap();

        assert_eq!(result.bin_base_name, None);
        assert_eq!(result.count(".wav"), 1);
    }

    #[test]
    fn nested_files_are_counted() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        fs::write(tmp.path().join("a/b/One.iso"), b"").unwrap();
        fs::write(tmp.path().join("Two.iso"), b"").unwrap();

        let result = census(tmp.path()).unwrap();

        assert_eq!(result.count(".iso"), 2);
        assert!(result.is_ambiguous());
    }
}
