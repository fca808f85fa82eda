//! Synthesis and repair of cue sheets.

use std::{fs, path::Path};

use once_cell::sync::Lazy;
use regex::bytes::{NoExpand, Regex};

use crate::{lib_error_handling::DiscZipError, lib_structs::CueSheet};

/// Matches a quoted `.bin` file reference, e.g. `"Some Game (USA).BIN"`.
/// Unicode mode is off so names in any encoding match.
static RE_QUOTED_BIN: Lazy<Regex> = Lazy::new(
    || Regex::new(r#"(?i-u)".+?\.BIN""#).unwrap()
);

impl CueSheet {
    /// Builds a single-track default cue sheet for a lone bin file.
    ///
    /// No attempt is made to infer the real track layout; the result is a
    /// `MODE2/2352` data track starting at `00:00:00`.
    pub fn synthesize(bin_base_name: &str) -> Self {
        Self {
            lines: vec![
                format!("FILE \"{bin_base_name}.bin\" BINARY").into_bytes(),
                b"  TRACK 01 MODE2/2352".to_vec(),
                b"    INDEX 01 00:00:00".to_vec(),
            ],
        }
    }

    /// Splits raw cue sheet content into lines. Both `\n` and `\r\n`
    /// terminate a line.
    pub fn parse(content: &[u8]) -> Self {
        let mut lines: Vec<Vec<u8>> = content
            .split(|b| *b == b'\n')
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line).to_vec())
            .collect();
        if content.is_empty() || content.ends_with(b"\n") {
            lines.pop();
        }

        Self { lines }
    }

    pub fn read_from(path: &Path) -> Result<Self, DiscZipError> {
        Ok(Self::parse(&fs::read(path)?))
    }

    /// The sheet as file content, every line terminated by `\n`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut content = Vec::new();
        for line in &self.lines {
            content.extend_from_slice(line);
            content.push(b'\n');
        }
        content
    }

    pub fn write_to(&self, path: &Path) -> Result<(), DiscZipError> {
        fs::write(path, self.to_bytes())?;
        Ok(())
    }

    /// Replaces every literal occurrence of `old_base_name` with
    /// `new_base_name` on every line.
    ///
    /// The match is case-sensitive. An empty `old_base_name` leaves the
    /// sheet untouched.
    pub fn rewrite_references(&self, old_base_name: &str, new_base_name: &str) -> Self {
        if old_base_name.is_empty() {
            return self.clone();
        }

        Self {
            lines: self
                .lines
                .iter()
                .map(|line| {
                    replace_bytes(line, old_base_name.as_bytes(), new_base_name.as_bytes())
                })
                .collect(),
        }
    }

    /// Points every quoted `.bin` reference at `bin_file_name`.
    pub fn fix_bin_references(&self, bin_file_name: &str) -> Self {
        Self {
            lines: self
                .lines
                .iter()
                .map(|line| fix_bin_reference(line, bin_file_name))
                .collect(),
        }
    }
}

/// Replaces each quoted `.bin` file name on `line` with `bin_file_name`.
pub fn fix_bin_reference(line: &[u8], bin_file_name: &str) -> Vec<u8> {
    let replacement = format!("\"{bin_file_name}\"");
    RE_QUOTED_BIN
        .replace_all(line, NoExpand(replacement.as_bytes()))
        .into_owned()
}

/// Replaces every occurrence of the non-empty `from` in `line`.
fn replace_bytes(line: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    let mut replaced = Vec::with_capacity(line.len());
    let mut rest = line;

    while let Some(pos) = rest.windows(from.len()).position(|window| window == from) {
        replaced.extend_from_slice(&rest[..pos]);
        replaced.extend_from_slice(to);
        rest = &rest[pos + from.len()..];
    }
    replaced.extend_from_slice(rest);

    replaced
}
