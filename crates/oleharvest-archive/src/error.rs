//! Error types for archive operations

use thiserror::Error;

/// Errors that can occur while reading a zip-family container
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// IO error during archive operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Leading bytes are not a zip local file header
    #[error("Not a ZIP archive: expected signature {expected:02X?}, got {actual:02X?}")]
    BadSignature {
        /// Expected magic bytes
        expected: [u8; 4],
        /// Bytes actually found (may be shorter than 4)
        actual: Vec<u8>,
    },

    /// Invalid ZIP archive format
    #[error("Invalid ZIP archive: {0}")]
    InvalidZip(#[from] zip::result::ZipError),

    /// Member is encrypted and no password is available
    #[error("Archive member '{name}' is password-protected")]
    PasswordProtected {
        /// Name of the encrypted member
        name: String,
    },

    /// Requested member does not exist
    #[error("Archive member not found: {0}")]
    NotFound(String),

    /// File within archive exceeds size limit
    #[error("File '{name}' is too large ({size} bytes, max {max} bytes)")]
    FileTooLarge {
        /// Name of the file that exceeded the limit
        name: String,
        /// Actual file size in bytes
        size: u64,
        /// Maximum allowed file size in bytes
        max: u64,
    },
}

impl ArchiveError {
    /// Map a `ZipError` raised while opening `name`, recognising the
    /// password-required case the zip crate reports as an unsupported archive.
    pub(crate) fn from_member_error(name: &str, err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::UnsupportedArchive(msg)
                if msg.to_ascii_lowercase().contains("password") =>
            {
                Self::PasswordProtected {
                    name: name.to_string(),
                }
            }
            zip::result::ZipError::InvalidPassword => Self::PasswordProtected {
                name: name.to_string(),
            },
            other => Self::InvalidZip(other),
        }
    }
}
