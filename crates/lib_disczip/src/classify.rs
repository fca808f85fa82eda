//! Extension based classification of extracted files.

use std::path::Path;

use crate::lib_structs::DiscRole;

/// Extensions of container formats the external archiver can open.
const ARCHIVE_EXTENSIONS: [&str; 8] = [
    "7z", "zip", "rar", "gzip", "bz2", "cab", "arc", "gz",
];

/// Maps a file extension to the role it plays in a disc set.
///
/// The lookup is case-insensitive and accepts the extension with or
/// without its leading dot. Anything outside the fixed disc-image table is
/// `Foreign` and gets discarded during normalization.
pub fn classify(extension: &str) -> DiscRole {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();

    match ext.as_str() {
        "cue" => DiscRole::CueSheet,
        "bin" | "wav" => DiscRole::ImageBinary,
        "iso" | "img" | "ccd" | "mdf" | "mds" | "ecm" | "cdi" | "sub" => {
            DiscRole::OtherImageArtifact
        }
        _ => DiscRole::Foreign,
    }
}

/// Checks whether the file at `path` is an archive the tools can extract.
pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            ARCHIVE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Case-insensitive check of a path's final extension.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
