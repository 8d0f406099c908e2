//! Error types for compound file operations

use thiserror::Error;

/// Errors that can occur while reading a Compound File Binary container
#[derive(Error, Debug)]
pub enum CompoundError {
    /// IO error while reading a stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input is shorter than the 8-byte signature
    #[error("Data too small to be a compound file ({len} bytes, need at least 8)")]
    TooSmall {
        /// Length of the rejected input
        len: usize,
    },

    /// Leading bytes are not the CFB signature
    #[error(
        "Invalid compound file signature. Expected {expected:02X?}, got {actual:02X?}",
        expected = crate::CFB_MAGIC_SIGNATURE
    )]
    BadSignature {
        /// First 8 bytes actually found
        actual: [u8; 8],
    },

    /// Signature matched but the header, FAT or directory is unusable
    #[error("Failed to parse as OLE Compound Document: {0}")]
    Corrupted(#[source] std::io::Error),

    /// Requested stream is not present
    #[error("Stream not found: {0}")]
    NotFound(String),
}
