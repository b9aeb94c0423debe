//! Typed errors for configuration and per-file conversion.
//!
//! Conversion errors never leave the per-task boundary: the scheduler turns
//! them into `Outcome::Failure` results.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Invalid run configuration, reported once when settings are resolved.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("source directory does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("source path is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    #[error("cannot determine working directory")]
    WorkingDir(#[source] io::Error),
}

/// Failure converting a single file.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The external converter could not be started (missing binary, permissions).
    #[error("failed to launch `{program}`")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The external converter ran but reported failure.
    #[error("`{program}` exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The converter claimed success but no output file was produced.
    #[error("conversion produced no output at {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("conversion timed out after {0:?}")]
    TimedOut(Duration),

    /// The converter panicked; the payload message is kept when it is a string.
    #[error("converter panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}
