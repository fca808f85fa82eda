//! Scripted stand-in for the external tools used by the mode tests.

use std::{
    cell::RefCell,
    collections::HashMap,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use disczip::{ArchiveTools, DiscZipError, ToolRunner};

use crate::cli_types::BatchContext;

/// Emulates `7za`, `UnRAR` and `unecm` on the file system.
///
/// * `x` writes the scripted content of the archive into the destination.
/// * `a` writes an archive of `archive_size` bytes.
/// * `unecm` copies its input to its output.
///
/// A tool listed in `exit_codes` returns that code without touching disk,
/// except that a failing `a` leaves a partial archive behind when
/// `partial_archives` is set.
#[derive(Default)]
pub struct ScriptedRunner {
    pub archives: HashMap<String, Vec<(String, Vec<u8>)>>,
    pub exit_codes: HashMap<&'static str, i32>,
    pub partial_archives: bool,
    pub archive_size: usize,
    pub calls: RefCell<Vec<(String, Vec<String>)>>,
}

impl ScriptedRunner {
    pub fn with_archive(mut self, name: &str, files: &[(&str, &str)]) -> Self {
        self.archives.insert(
            name.to_string(),
            files.iter().map(|(p, d)| (p.to_string(), d.as_bytes().to_vec())).collect(),
        );
        self
    }

    /// Adds a file with arbitrary bytes to the scripted archive `name`.
    pub fn with_raw_file(mut self, name: &str, path: &str, data: &[u8]) -> Self {
        self.archives
            .entry(name.to_string())
            .or_default()
            .push((path.to_string(), data.to_vec()));
        self
    }

    pub fn failing(mut self, tool: &'static str, code: i32) -> Self {
        self.exit_codes.insert(tool, code);
        self
    }

    pub fn leaving_partial_archives(mut self) -> Self {
        self.partial_archives = true;
        self
    }

    pub fn tool_calls(&self, tool: &str) -> Vec<Vec<String>> {
        self.calls
            .borrow()
            .iter()
            .filter(|(t, _)| t == tool)
            .map(|(_, args)| args.clone())
            .collect()
    }
}

impl ToolRunner for ScriptedRunner {
    fn invoke(&self, executable: &Path, args: &[OsString]) -> Result<i32, DiscZipError> {
        let tool = executable
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        self.calls.borrow_mut().push((tool.clone(), args.clone()));

        if let Some(code) = self.exit_codes.get(tool.as_str()) {
            if self.partial_archives && args.first().map(String::as_str) == Some("a") {
                fs::write(&args[4], b"partial")?;
            }
            return Ok(*code);
        }

        match (tool.as_str(), args.first().map(String::as_str)) {
            (_, Some("x")) => {
                let archive = PathBuf::from(&args[1]);
                let dest = match args[2].strip_prefix("-o") {
                    Some(dir) => PathBuf::from(dir),
                    None => PathBuf::from(&args[2]),
                };
                let name = archive.file_name().unwrap().to_string_lossy().into_owned();
                for (relative, data) in self.archives.get(&name).into_iter().flatten() {
                    let target = dest.join(relative);
                    fs::create_dir_all(target.parent().unwrap())?;
                    fs::write(target, data)?;
                }
            }
            (_, Some("a")) => {
                fs::write(&args[4], vec![0u8; self.archive_size])?;
            }
            ("unecm", _) => {
                fs::copy(&args[0], &args[1])?;
            }
            _ => {}
        }

        Ok(0)
    }
}

pub fn context(
    runner: ScriptedRunner,
    input_dir: &Path,
    output_dir: &Path,
    delete: bool,
) -> BatchContext<ScriptedRunner> {
    BatchContext {
        tools: ArchiveTools::new(PathBuf::from("binaries"), 9, runner),
        input_dir: input_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        scratch_dir: std::env::temp_dir(),
        delete,
        max_ratio: 0.9,
        quiet: true,
    }
}

/// Sorted names of the direct children of `dir`.
pub fn names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
