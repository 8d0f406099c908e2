//! Zip-family container support for oleharvest
//!
//! This crate reads zip archives held in memory: the outer envelope of a
//! .docx package as well as any zip (xlsx, pptx, plain .zip) discovered as a
//! nested payload inside another container.
//!
//! # Features
//!
//! - **Member enumeration**: flat member names in central-directory order
//! - **Lazy reads**: members are decompressed only when requested
//! - **Bulk extraction**: materialize every member with path sanitization
//! - **Error handling**: encrypted members and oversized members are refused
//!
//! # Usage
//!
//! ```no_run
//! use oleharvest_archive::ArchiveContainer;
//! use std::path::Path;
//!
//! let mut archive = ArchiveContainer::open_path(Path::new("report.docx")).unwrap();
//! for name in archive.list_entries() {
//!     if name.contains("/embeddings/") {
//!         let bytes = archive.read_entry(&name).unwrap();
//!         println!("{name}: {} bytes", bytes.len());
//!     }
//! }
//! ```

pub mod error;
pub mod zip;

/// Maximum size for a single member within an archive (100 MB).
///
/// Members exceeding this limit are refused to prevent memory exhaustion
/// from zip bombs or excessively large files.
pub const MAX_FILE_SIZE: u64 = 100_000_000;

/// Zip local file header signature `PK\x03\x04`
pub const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

pub use crate::error::ArchiveError;
pub use crate::zip::{ArchiveContainer, FileInfo};
