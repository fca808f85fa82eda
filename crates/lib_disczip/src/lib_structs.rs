//! Core data types shared by the disc-set normalization engine.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// The role a file plays inside an extracted disc set, derived purely
/// from its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiscRole {
    CueSheet,
    ImageBinary,
    AudioTrack,
    OtherImageArtifact,
    Foreign,
}

/// A single classified file found below an extraction workspace.
///
/// # Fields
///
/// * `path`: Full path of the file.
/// * `extension`: Lowercased extension including the leading dot
///   (e.g. `".bin"`), or an empty string when the file has none.
/// * `role`: The role assigned by the classifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscFileRecord {
    pub path: PathBuf,
    pub extension: String,
    pub role: DiscRole,
}

impl DiscFileRecord {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        let role = crate::classify::classify(&extension);

        Self {
            path: path.to_path_buf(),
            extension,
            role,
        }
    }

    /// The file name with its final extension removed.
    pub fn base_name(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        crate::util::replace_file_extension(&name, None)
    }
}

/// Extensions of single-disc formats. Seeing more than one of any of
/// them in a single archive means the archive holds several discs.
pub const AMBIGUITY_EXTENSIONS: [&str; 5] = [".cue", ".iso", ".mdf", ".ccd", ".img"];

/// Tally of the files found in one extracted disc set.
///
/// # Fields
///
/// * `count_by_extension`: Number of files seen per lowercased extension.
/// * `cue_base_name`: De-extensioned name of the first cue sheet found.
/// * `bin_base_name`: De-extensioned name of the first `.bin` found.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiscSetCensus {
    pub count_by_extension: BTreeMap<String, usize>,
    pub cue_base_name: Option<String>,
    pub bin_base_name: Option<String>,
}

impl DiscSetCensus {
    pub fn count(&self, extension: &str) -> usize {
        self.count_by_extension.get(extension).copied().unwrap_or(0)
    }

    /// The single-disc extensions that occur more than once.
    pub fn ambiguous_extensions(&self) -> Vec<&'static str> {
        AMBIGUITY_EXTENSIONS
            .iter()
            .copied()
            .filter(|ext| self.count(ext) > 1)
            .collect()
    }

    pub fn is_ambiguous(&self) -> bool {
        !self.ambiguous_extensions().is_empty()
    }
}

/// A cue sheet held as its ordered lines.
///
/// Lines are raw bytes without their terminator. Cue sheets from Japanese
/// releases often name their files in Shift-JIS, so nothing here assumes
/// UTF-8.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CueSheet {
    pub lines: Vec<Vec<u8>>,
}

/// A set of loose disc files that belong to the same title.
///
/// # Fields
///
/// * `game_key`: The title parsed from the release file names.
/// * `members`: Member files sorted ascending by full path.
/// * `archive_name`: File name of the archive the group is written to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameGroup {
    pub game_key: String,
    pub members: Vec<PathBuf>,
    pub archive_name: String,
}

/// Result of asking an external tool to produce an output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolOutcome {
    Success,
    /// The requested output already existed, so the tool was not run.
    DestinationExists,
    /// The tool failed to start or exited with the given non-zero code.
    ProgramError(i32),
}
