//! Groups loose per-disc release files into titles for re-archiving.
//!
//! Release names of a multi-disc title usually differ only in a
//! `(Disc N of M)` marker, e.g. `Foo (Disc 1 of 2) [Source].bin` and
//! `Foo (Disc 2 of 2) [Source].bin`. The leading title before the first
//! qualifier is the game key; stripping the disc marker from the first
//! member yields one stable archive name for the whole group.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::{lib_structs::GameGroup, util::replace_file_extension};

/// The shortest leading run followed by a space and a `.`, `[` or `(`.
static RE_GAME_KEY: Lazy<Regex> = Lazy::new(
    || Regex::new(r"^(.+?) [.\[(]").unwrap()
);
static RE_DISC_MARKER: Lazy<Regex> = Lazy::new(
    || Regex::new(r"(?i) \(Disc \d+ of \d+\)").unwrap()
);

/// Parses the game key out of a release file name.
///
/// Returns `None` when the name has no qualifier after the title.
pub fn parse_game_key(file_name: &str) -> Option<String> {
    RE_GAME_KEY
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|key| !key.is_empty())
}

/// Derives the archive file name for a group from its first member.
///
/// Every disc marker is removed and the final extension is replaced by
/// `archive_extension`.
pub fn derive_archive_name(first_member_name: &str, archive_extension: &str) -> String {
    let stripped = RE_DISC_MARKER.replace_all(first_member_name, "");
    replace_file_extension(&stripped, Some(archive_extension))
}

/// Groups files by their parsed game key.
///
/// Files whose names cannot be parsed are skipped with a warning. Groups
/// are returned in key order and each group's members are sorted by full
/// path, which puts `Disc 1` before `Disc 2` for naturally ordered names.
pub fn group_by_game(files: &[PathBuf], archive_extension: &str) -> Vec<GameGroup> {
    let mut by_key: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    for path in files {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            continue;
        };

        match parse_game_key(&name) {
            Some(key) => by_key.entry(key).or_default().push(path.clone()),
            None => warn!("Can't parse game name {name}"),
        }
    }

    by_key
        .into_iter()
        .map(|(game_key, mut members)| {
            members.sort();
            let first_name = members
                .first()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| game_key.clone());

            GameGroup {
                archive_name: derive_archive_name(&first_name, archive_extension),
                game_key,
                members,
            }
        })
        .collect()
}

impl GameGroup {
    /// Full output path of the group's archive inside `output_dir`.
    pub fn archive_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.archive_name)
    }
}
