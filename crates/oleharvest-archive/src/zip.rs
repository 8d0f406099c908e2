//! ZIP container reading
//!
//! [`ArchiveContainer`] owns the bytes of one zip-family archive (a .docx
//! envelope, an embedded .xlsx, or any nested zip) and hands out member
//! contents by name.

use crate::error::ArchiveError;
use crate::{MAX_FILE_SIZE, ZIP_MAGIC};
use log::{debug, warn};
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use zip::ZipArchive;

/// OOXML packages always carry this part at the archive root
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Sanitize a path to prevent path traversal attacks (e.g., ../../../etc/passwd)
///
/// This function removes:
/// - Parent directory references (..)
/// - Current directory references (.)
/// - Absolute path prefixes (/)
/// - Drive letters (C:\)
///
/// Returns None if the path is entirely invalid (e.g., just "..")
#[inline]
fn sanitize_path(path: &str) -> Option<PathBuf> {
    let path = Path::new(path);
    let mut sanitized = PathBuf::new();

    for component in path.components() {
        if let Component::Normal(part) = component {
            sanitized.push(part);
        }
    }

    if sanitized.as_os_str().is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

/// Information about a member of a ZIP archive (without extracting contents)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FileInfo {
    /// Member name within the archive
    pub name: String,
    /// Uncompressed file size
    pub size: u64,
    /// Compressed file size
    pub compressed_size: u64,
    /// Whether the member is encrypted
    pub is_encrypted: bool,
}

/// An opened zip-family archive held in memory
///
/// The container is read-only. Member contents are decompressed lazily on
/// [`ArchiveContainer::read_entry`].
pub struct ArchiveContainer {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl std::fmt::Debug for ArchiveContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveContainer")
            .field("members", &self.archive.len())
            .finish()
    }
}

impl ArchiveContainer {
    /// Open an archive from raw bytes
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::BadSignature`] if the bytes do not start with a
    /// zip local file header, or [`ArchiveError::InvalidZip`] if the central
    /// directory cannot be parsed.
    #[must_use = "this function returns an opened archive that should be used"]
    pub fn open(bytes: Vec<u8>) -> Result<Self, ArchiveError> {
        if !bytes.starts_with(&ZIP_MAGIC) {
            return Err(ArchiveError::BadSignature {
                expected: ZIP_MAGIC,
                actual: bytes.iter().take(ZIP_MAGIC.len()).copied().collect(),
            });
        }

        let archive = ZipArchive::new(Cursor::new(bytes))?;
        debug!("Opened ZIP archive with {} members", archive.len());
        Ok(Self { archive })
    }

    /// Read a file from disk and open it as an archive
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`ArchiveContainer::open`].
    #[must_use = "this function returns an opened archive that should be used"]
    pub fn open_path(path: &Path) -> Result<Self, ArchiveError> {
        let bytes = fs::read(path)?;
        Self::open(bytes)
    }

    /// Flat member names in central-directory order, directories omitted
    #[must_use]
    pub fn list_entries(&self) -> Vec<String> {
        (0..self.archive.len())
            .filter_map(|i| self.archive.name_for_index(i))
            .filter(|name| !name.ends_with('/'))
            .map(str::to_string)
            .collect()
    }

    /// Whether this archive is an OOXML package (.docx, .xlsx, .pptx)
    #[must_use]
    pub fn is_ooxml_package(&self) -> bool {
        self.archive.index_for_name(CONTENT_TYPES_PART).is_some()
    }

    /// List members with sizes and encryption flags, without decompressing
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidZip`] if a local header is corrupted.
    #[must_use = "this function returns archive file listing that should be processed"]
    pub fn list_entry_info(&mut self) -> Result<Vec<FileInfo>, ArchiveError> {
        let mut files = Vec::new();

        for i in 0..self.archive.len() {
            let zip_file = self.archive.by_index_raw(i)?;

            if zip_file.is_dir() {
                continue;
            }

            files.push(FileInfo {
                name: zip_file.name().to_string(),
                size: zip_file.size(),
                compressed_size: zip_file.compressed_size(),
                is_encrypted: zip_file.encrypted(),
            });
        }

        Ok(files)
    }

    /// Read one member's decompressed bytes
    ///
    /// # Errors
    ///
    /// - [`ArchiveError::NotFound`] if no member has this name
    /// - [`ArchiveError::PasswordProtected`] if the member is encrypted
    /// - [`ArchiveError::FileTooLarge`] if it exceeds [`MAX_FILE_SIZE`]
    #[must_use = "this function returns member contents that should be processed"]
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        let index = self
            .archive
            .index_for_name(name)
            .ok_or_else(|| ArchiveError::NotFound(name.to_string()))?;
        self.read_index(index, name)
    }

    fn read_index(&mut self, index: usize, name: &str) -> Result<Vec<u8>, ArchiveError> {
        let size = {
            let raw = self.archive.by_index_raw(index)?;
            if raw.encrypted() {
                return Err(ArchiveError::PasswordProtected {
                    name: name.to_string(),
                });
            }
            raw.size()
        };

        if size > MAX_FILE_SIZE {
            return Err(ArchiveError::FileTooLarge {
                name: name.to_string(),
                size,
                max: MAX_FILE_SIZE,
            });
        }

        let mut zip_file = self
            .archive
            .by_index(index)
            .map_err(|e| ArchiveError::from_member_error(name, e))?;

        // size <= MAX_FILE_SIZE, so the capacity hint always fits
        let mut contents = Vec::with_capacity(usize::try_from(size).unwrap_or_default());
        zip_file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Materialize every member under `destination`, preserving the
    /// (sanitized) member paths
    ///
    /// Members whose path sanitizes to nothing are skipped with a warning.
    /// Returns the paths written.
    ///
    /// # Errors
    ///
    /// Fails on the first member that cannot be read or written, including
    /// encrypted members.
    #[must_use = "this function returns the written paths that should be checked"]
    pub fn extract_all(&mut self, destination: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
        fs::create_dir_all(destination)?;
        let mut written = Vec::new();

        for i in 0..self.archive.len() {
            let Some(raw_name) = self.archive.name_for_index(i).map(str::to_string) else {
                continue;
            };
            if raw_name.ends_with('/') {
                continue;
            }

            // SECURITY: Malicious archives can contain entries like "../../../etc/passwd"
            let Some(relative) = sanitize_path(&raw_name) else {
                warn!("Skipping invalid path: {raw_name} (path traversal attempt or empty)");
                continue;
            };

            let contents = self.read_index(i, &raw_name)?;
            let target = destination.join(&relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, contents)?;
            written.push(target);
        }

        debug!(
            "Extracted {} members to {}",
            written.len(),
            destination.display()
        );
        Ok(written)
    }
}
