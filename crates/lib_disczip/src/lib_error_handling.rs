//! Declares the error handling types for the disczip library.
//!
//! This module defines the `DiscZipError` enum, which encapsulates the
//! failure conditions that can occur while normalizing an extracted disc
//! set or talking to the external archiver tools. Per-item outcomes that
//! the batch flows tolerate (a destination that already exists, a tool
//! that exits non-zero) are reported through `ToolOutcome` instead and
//! never surface here.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Represents all possible errors that can occur within the library.
#[derive(Error, Debug)]
pub enum DiscZipError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to walk directory tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Found multiple disc images in one archive and don't know how \
        to handle them ({extensions}) in {}", workspace.display())]
    AmbiguousDiscSet {
        workspace: PathBuf,
        extensions: String,
    },

    #[error("Failed to start external tool {}", tool.display())]
    ToolLaunch {
        tool: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File name is not valid UTF-8: {}", .0.display())]
    InvalidFileName(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_keep_their_cause() {
        let err = DiscZipError::from(io::Error::new(
            io::ErrorKind::InvalidData,
            "stream did not contain valid UTF-8",
        ));

        assert_eq!(err.to_string(), "I/O error: stream did not contain valid UTF-8");
    }
}
