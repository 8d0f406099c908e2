//! Error types for extraction runs

use oleharvest_archive::ArchiveError;
use oleharvest_compound::CompoundError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by an extraction run
///
/// Only failures on the root input abort a run. Failures on discovered
/// entries are caught per entry and recorded in the
/// [`ExtractionReport`](crate::ExtractionReport) instead.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Bad magic number or unparseable container
    #[error("Invalid container format: {0}")]
    Format(String),

    /// Requested structural path is absent
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// Archive member needs a password and none is supplied
    #[error("Archive member '{0}' is encrypted and no password was supplied")]
    EncryptedArchive(String),

    /// Root input is neither a .doc/.docx by name nor by signature
    #[error("Unsupported input format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Filesystem read, write or delete failure
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Container nesting exceeds the configured limit
    #[error("Container nesting too deep (depth {depth}, max {max})")]
    TooDeep {
        /// Depth of the rejected container
        depth: usize,
        /// Configured maximum
        max: usize,
    },
}

impl ExtractError {
    /// Attach a path to an IO error
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ArchiveError> for ExtractError {
    fn from(e: ArchiveError) -> Self {
        match e {
            ArchiveError::PasswordProtected { name } => Self::EncryptedArchive(name),
            ArchiveError::NotFound(name) => Self::NotFound(name),
            // Archives are read from memory: IO errors there mean corrupt data
            other => Self::Format(other.to_string()),
        }
    }
}

impl From<CompoundError> for ExtractError {
    fn from(e: CompoundError) -> Self {
        match e {
            CompoundError::NotFound(path) => Self::NotFound(path),
            other => Self::Format(other.to_string()),
        }
    }
}

/// Result alias for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;
