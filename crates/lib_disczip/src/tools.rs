//! Gateway to the external archiver, RAR extractor and ECM decoder.
//!
//! All compression, extraction and decoding is delegated to native
//! executables living in a `binaries` directory. Each call blocks until
//! the child exits. Its stdout and stderr are drained continuously by two
//! reader threads that feed a channel, and the lines are forwarded to the
//! debug log.

use std::{
    ffi::OsString,
    fs,
    io::{BufRead, BufReader, Read, Write},
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
    thread::{self, JoinHandle},
    time::Duration,
};

use flume::{RecvTimeoutError, Sender};
use tracing::{debug, error, info, warn};

use crate::{
    classify::has_extension,
    lib_error_handling::DiscZipError,
    lib_structs::ToolOutcome,
};

/// How long to wait for tool output before polling the child again.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub const ARCHIVER_TOOL: &str = "7za";
pub const RAR_TOOL: &str = "UnRAR";
pub const ECM_TOOL: &str = "unecm";

/// Runs an external executable to completion.
///
/// The production implementation is `ProcessRunner`; tests substitute a
/// scripted runner that emulates the tools on the file system.
pub trait ToolRunner {
    /// Invokes `executable` with `args`, blocks until it exits and
    /// returns its exit code.
    ///
    /// # Errors
    ///
    /// Returns `DiscZipError::ToolLaunch` when the process cannot be
    /// started, or an I/O error while waiting on it.
    fn invoke(&self, executable: &Path, args: &[OsString]) -> Result<i32, DiscZipError>;
}

/// Spawns real child processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

/// Kills the child if the invocation unwinds before it has exited.
struct ChildGuard {
    child: Child,
    exited: bool,
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.exited {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

fn spawn_line_reader<R>(stream: Option<R>, sender: Sender<String>) -> Option<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    let stream = stream?;
    Some(thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            match reader.read_until(b'\n', &mut buffer) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buffer).trim_end().to_string();
                    if !line.is_empty() && sender.send(line).is_err() {
                        break;
                    }
                }
            }
        }
    }))
}

impl ToolRunner for ProcessRunner {
    fn invoke(&self, executable: &Path, args: &[OsString]) -> Result<i32, DiscZipError> {
        debug!("Running {} {:?}", executable.display(), args);

        let mut child = Command::new(executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| DiscZipError::ToolLaunch {
                tool: executable.to_path_buf(),
                source,
            })?;

        let (tx, rx) = flume::unbounded::<String>();
        let readers = [
            spawn_line_reader(child.stdout.take(), tx.clone()),
            spawn_line_reader(child.stderr.take(), tx),
        ];
        let mut guard = ChildGuard { child, exited: false };

        let status = loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(line) => debug!(target: "disczip::tool", "{line}"),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => thread::sleep(POLL_INTERVAL),
            }

            if let Some(status) = guard.child.try_wait()? {
                break status;
            }
        };
        guard.exited = true;

        //Collect trailing output once both streams have closed.
        for reader in readers.into_iter().flatten() {
            let _ = reader.join();
        }
        for line in rx.drain() {
            debug!(target: "disczip::tool", "{line}");
        }

        Ok(status.code().unwrap_or(-1))
    }
}

/// Typed front end for the three external tools.
///
/// # Fields
///
/// * `binaries_dir`: Directory holding the tool executables.
/// * `compression_level`: Value passed to the archiver's `-mx` switch.
/// * `runner`: The process runner used for every invocation.
#[derive(Debug)]
pub struct ArchiveTools<R: ToolRunner = ProcessRunner> {
    binaries_dir: PathBuf,
    compression_level: u8,
    runner: R,
}

impl<R: ToolRunner> ArchiveTools<R> {
    pub fn new(binaries_dir: PathBuf, compression_level: u8, runner: R) -> Self {
        Self {
            binaries_dir,
            compression_level,
            runner,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Resolves a tool name to its executable inside the binaries
    /// directory.
    pub fn executable(&self, tool: &str) -> PathBuf {
        if cfg!(windows) {
            self.binaries_dir.join(format!("{tool}.exe"))
        } else {
            self.binaries_dir.join(tool)
        }
    }

    fn run(&self, tool: &str, args: Vec<OsString>) -> ToolOutcome {
        let executable = self.executable(tool);

        match self.runner.invoke(&executable, &args) {
            Ok(0) => ToolOutcome::Success,
            Ok(code) => {
                debug!("{tool} exited with code {code}");
                ToolOutcome::ProgramError(code)
            }
            Err(e) => {
                error!("{e}");
                ToolOutcome::ProgramError(-1)
            }
        }
    }

    fn add_args(&self, output: &Path) -> Vec<OsString> {
        vec![
            "a".into(),
            "-y".into(),
            "-t7z".into(),
            format!("-mx{}", self.compression_level).into(),
            output.into(),
        ]
    }

    /// Compresses a single file into a new 7z archive.
    pub fn compress_file(&self, input: &Path, output: &Path) -> ToolOutcome {
        info!("Compressing file {} to {}...", input.display(), output.display());

        if output.exists() {
            warn!("Output archive {} already exists!", output.display());
            return ToolOutcome::DestinationExists;
        }

        let mut args = self.add_args(output);
        args.push(input.into());
        self.run(ARCHIVER_TOOL, args)
    }

    /// Compresses several files into one archive through a list file.
    ///
    /// The list file holds one path per line and is removed once the
    /// archiver returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary list file cannot be written.
    pub fn compress_files(
        &self,
        inputs: &[PathBuf],
        output: &Path,
    ) -> Result<ToolOutcome, DiscZipError> {
        info!("Compressing {} files to {}...", inputs.len(), output.display());

        if output.exists() {
            warn!("Output archive {} already exists!", output.display());
            return Ok(ToolOutcome::DestinationExists);
        }

        let mut list_file = tempfile::Builder::new()
            .prefix("disczip-list-")
            .suffix(".txt")
            .tempfile()?;
        for input in inputs {
            writeln!(list_file, "{}", input.display())?;
        }
        list_file.flush()?;
        let list_path = list_file.into_temp_path();

        let mut args = self.add_args(output);
        let mut list_arg = OsString::from("@");
        list_arg.push(list_path.as_os_str());
        args.push(list_arg);

        Ok(self.run(ARCHIVER_TOOL, args))
    }

    /// Compresses the contents of a directory, without the directory
    /// itself, into a new archive.
    pub fn compress_directory(&self, dir: &Path, output: &Path) -> ToolOutcome {
        info!("Compressing directory {} to {}...", dir.display(), output.display());

        if output.exists() {
            warn!("Output archive {} already exists!", output.display());
            return ToolOutcome::DestinationExists;
        }

        let mut args = self.add_args(output);
        args.push(dir.join("*").into());
        self.run(ARCHIVER_TOOL, args)
    }

    /// Extracts an archive into `dest_dir`, which must not exist yet.
    ///
    /// RAR archives go through the dedicated extractor; everything else
    /// through the archiver.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination directory cannot be created.
    pub fn extract(&self, archive: &Path, dest_dir: &Path) -> Result<ToolOutcome, DiscZipError> {
        info!("Extracting {} to {}...", archive.display(), dest_dir.display());

        if dest_dir.exists() {
            warn!("Output directory {} already exists!", dest_dir.display());
            return Ok(ToolOutcome::DestinationExists);
        }
        fs::create_dir_all(dest_dir)?;

        let outcome = if has_extension(archive, "rar") {
            let mut dest = dest_dir.as_os_str().to_os_string();
            dest.push(std::path::MAIN_SEPARATOR_STR);
            self.run(RAR_TOOL, vec!["x".into(), archive.into(), dest])
        } else {
            let mut dest = OsString::from("-o");
            dest.push(dest_dir.as_os_str());
            self.run(ARCHIVER_TOOL, vec!["x".into(), archive.into(), dest])
        };

        Ok(outcome)
    }

    /// Decodes an ECM file into `output`.
    pub fn decode_ecm(&self, input: &Path, output: &Path) -> ToolOutcome {
        info!("Decoding {} to {}...", input.display(), output.display());

        if output.exists() {
            warn!("Output file {} already exists!", output.display());
            return ToolOutcome::DestinationExists;
        }

        self.run(ECM_TOOL, vec![input.into(), output.into()])
    }
}
