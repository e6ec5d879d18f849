//! Error types for the track library.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while managing the on-disk library.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Library JSON error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Library document at {} is not a JSON object", .0.display())]
    MalformedDocument(PathBuf),

    #[error("No platform data directory available and no data_dir configured")]
    NoDataDir,

    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),
}

impl LibraryError {
    /// Wrap an I/O error together with the path it occurred on.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// The underlying I/O error kind, if this is an I/O failure.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

pub type Result<T, E = LibraryError> = std::result::Result<T, E>;
