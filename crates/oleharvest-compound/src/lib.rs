//! Compound File Binary (OLE2) container support for oleharvest
//!
//! Legacy Office documents (.doc, .xls, .ppt) and every OLE object embedded
//! in a modern package are Compound Files: a sector-based filesystem of
//! storages and streams. This crate opens them from memory on top of the
//! `cfb` crate and exposes:
//!
//! - [`CompoundContainer`]: stream enumeration and reads by [`EntryPath`]
//! - [`metadata`]: title/subject/author/keywords from `\u{5}SummaryInformation`
//!
//! Bookkeeping streams (`\u{1}CompObj`, `\u{3}ObjInfo`, property sets) are
//! listed like any other stream; deciding what counts as payload is left to
//! the caller.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use oleharvest_compound::CompoundContainer;
//!
//! let bytes = std::fs::read("legacy.doc")?;
//! let mut container = CompoundContainer::open(bytes)?;
//! for path in container.list_entries() {
//!     let data = container.read_entry(&path)?;
//!     println!("{path}: {} bytes", data.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod container;
pub mod error;
pub mod metadata;

#[cfg(test)]
pub(crate) mod test_support;

/// CFB (Compound File Binary) / OLE2 magic signature
///
/// All OLE-based Microsoft Office formats (DOC, XLS, PPT) start with these 8 bytes.
/// The signature is `D0 CF 11 E0 A1 B1 1A E1` - a mnemonic for "DOC FILE".
pub const CFB_MAGIC_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

pub use container::{has_cfb_signature, CompoundContainer, EntryPath};
pub use error::CompoundError;
pub use metadata::{read_metadata, DocumentMetadata};
