//! Compound File Binary container walking
//!
//! A compound file is a little FAT filesystem: storages (directories) holding
//! streams (files). [`CompoundContainer`] opens one held in memory, walks its
//! directory once, and serves stream contents by [`EntryPath`].

use crate::error::CompoundError;
use crate::CFB_MAGIC_SIGNATURE;
use log::debug;
use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};

/// Structural path of a stream inside a compound file
///
/// `["ObjectPool", "_1584722410", "Package"]` addresses the `Package` stream
/// of one embedded object. Segment names are kept verbatim, including the
/// leading control characters of property streams (`\u{5}SummaryInformation`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct EntryPath(Vec<String>);

impl EntryPath {
    /// Build a path from its segments, outermost storage first
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Path segments, outermost storage first
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Name of the stream itself (last segment)
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Nesting depth in storages (a top-level stream has depth 1)
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    fn from_cfb_path(path: &Path) -> Self {
        Self(
            path.components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect(),
        )
    }

    fn to_cfb_path(&self) -> PathBuf {
        let mut path = PathBuf::from("/");
        for segment in &self.0 {
            path.push(segment);
        }
        path
    }
}

impl fmt::Display for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            for ch in segment.chars() {
                if ch.is_control() {
                    write!(f, "\\x{:02X}", u32::from(ch))?;
                } else {
                    write!(f, "{ch}")?;
                }
            }
        }
        Ok(())
    }
}

/// Check for the CFB signature `D0 CF 11 E0 A1 B1 1A E1`
#[inline]
#[must_use]
pub fn has_cfb_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(&CFB_MAGIC_SIGNATURE)
}

/// An opened compound file held in memory
///
/// Only streams are listed as entries; storages are structure. The listing
/// follows the directory walk order (depth-first, siblings in directory
/// order) and is fixed at open time.
pub struct CompoundContainer {
    comp: cfb::CompoundFile<Cursor<Vec<u8>>>,
    entries: Vec<(EntryPath, u64)>,
}

impl fmt::Debug for CompoundContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompoundContainer")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl CompoundContainer {
    /// Open a compound file from raw bytes
    ///
    /// # Errors
    ///
    /// - [`CompoundError::TooSmall`] / [`CompoundError::BadSignature`] if the
    ///   leading magic number does not match
    /// - [`CompoundError::Corrupted`] if the header or directory is unusable
    #[must_use = "this function returns an opened container that should be used"]
    pub fn open(bytes: Vec<u8>) -> Result<Self, CompoundError> {
        if bytes.len() < CFB_MAGIC_SIGNATURE.len() {
            return Err(CompoundError::TooSmall { len: bytes.len() });
        }
        if !has_cfb_signature(&bytes) {
            let mut actual = [0u8; 8];
            actual.copy_from_slice(&bytes[..8]);
            return Err(CompoundError::BadSignature { actual });
        }

        let comp = cfb::CompoundFile::open(Cursor::new(bytes)).map_err(CompoundError::Corrupted)?;

        let entries: Vec<(EntryPath, u64)> = comp
            .walk()
            .filter(cfb::Entry::is_stream)
            .map(|entry| (EntryPath::from_cfb_path(entry.path()), entry.len()))
            .collect();

        debug!("Opened compound file with {} streams", entries.len());
        Ok(Self { comp, entries })
    }

    /// All stream paths in walk order, bookkeeping streams included
    #[must_use]
    pub fn list_entries(&self) -> Vec<EntryPath> {
        self.entries.iter().map(|(path, _)| path.clone()).collect()
    }

    /// Declared on-disk size of a stream
    #[must_use]
    pub fn entry_size(&self, path: &EntryPath) -> Option<u64> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == path)
            .map(|(_, size)| *size)
    }

    /// Whether a stream with this path exists
    #[must_use]
    pub fn contains(&self, path: &EntryPath) -> bool {
        self.entry_size(path).is_some()
    }

    /// Read the full contents of one stream
    ///
    /// # Errors
    ///
    /// Returns [`CompoundError::NotFound`] if no stream has this path, or
    /// [`CompoundError::Io`] if the stream's sector chain is broken.
    #[must_use = "this function returns stream contents that should be processed"]
    pub fn read_entry(&mut self, path: &EntryPath) -> Result<Vec<u8>, CompoundError> {
        let size = self
            .entry_size(path)
            .ok_or_else(|| CompoundError::NotFound(path.to_string()))?;

        let mut stream = self.comp.open_stream(path.to_cfb_path())?;
        let mut buf = Vec::with_capacity(usize::try_from(size).unwrap_or_default());
        stream.read_to_end(&mut buf)?;
        Ok(buf)
    }
}
