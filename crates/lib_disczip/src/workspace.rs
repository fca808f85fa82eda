//! Scoped extraction workspace.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::lib_error_handling::DiscZipError;

/// A uniquely named scratch directory owned by a single batch item.
///
/// The directory and everything below it is removed when the workspace is
/// dropped, whichever way the item ends. `preserve` is the only way to
/// keep it on disk, used when a disc set needs manual inspection.
#[derive(Debug)]
pub struct ExtractionWorkspace {
    dir: TempDir,
}

impl ExtractionWorkspace {
    /// Creates a fresh workspace inside `base_dir`.
    pub fn create_in(base_dir: &Path) -> Result<Self, DiscZipError> {
        let dir = tempfile::Builder::new()
            .prefix(".disczip-")
            .tempdir_in(base_dir)?;
        debug!("Created workspace {}", dir.path().display());

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The directory archives are extracted into. It is not created here
    /// so the extractor can refuse a destination that already exists.
    pub fn content_dir(&self) -> PathBuf {
        self.dir.path().join("content")
    }

    /// Keeps the workspace on disk and returns its path.
    pub fn preserve(self) -> PathBuf {
        self.dir.keep()
    }

    /// Removes the workspace now. Failures are logged and ignored.
    pub fn release(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            debug!("Failed to remove workspace {}: {e}", path.display());
        }
    }
}
