use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a directory listing could not be produced.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("invalid path segment: {0:?}")]
    InvalidPath(String),

    #[error("directory not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ListingError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => ListingError::NotFound(path),
            _ => ListingError::Io { path, source },
        }
    }

    /// HTTP status this error should be answered with
    pub fn status_code(&self) -> u16 {
        match self {
            ListingError::InvalidPath(_) => 400,
            ListingError::NotFound(_) | ListingError::NotADirectory(_) => 404,
            ListingError::Io { .. } => 500,
        }
    }
}
