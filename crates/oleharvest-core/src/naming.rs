//! Artifact naming and collision-free persistence
//!
//! Every artifact gets `{parent}_{n}.{ext}` (children of the root input) or
//! `{parent}_nested_doc_{n}.{ext}` (children of a nested container), where
//! `n` comes from one [`NameSequence`] shared by the whole run. If the name
//! is already taken in the output directory, the next sequence value is
//! appended until it is free. Files are created with `create_new`, so an
//! existing file is never overwritten.

use crate::error::{ExtractError, Result};
use log::warn;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Run-wide monotonically increasing counter for artifact names
///
/// Starts at 1 and is never reset between nesting levels, so names stay
/// unique across the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSequence {
    next: u64,
}

impl Default for NameSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl NameSequence {
    /// Counter starting at 1
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Take the next index
    pub fn next_index(&mut self) -> u64 {
        let index = self.next;
        self.next += 1;
        index
    }

    /// The index the next call to [`NameSequence::next_index`] returns
    #[must_use]
    pub const fn peek(&self) -> u64 {
        self.next
    }
}

/// Where an artifact sits relative to the root input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameScope {
    /// Direct child of the root document
    Root,
    /// Recovered from a container that was itself extracted
    Nested,
}

/// Derive the file stem for an artifact
#[must_use]
pub fn artifact_stem(parent: &str, scope: NameScope, index: u64) -> String {
    match scope {
        NameScope::Root => format!("{parent}_{index}"),
        NameScope::Nested => format!("{parent}_nested_doc_{index}"),
    }
}

/// Write `contents` to `{dir}/{stem}.{ext}`, or to `{stem}_{n}.{ext}` with
/// successive sequence values while the name is taken
///
/// # Errors
///
/// Returns [`ExtractError::Io`] if the file cannot be created or written.
pub fn persist_unique(
    dir: &Path,
    stem: &str,
    ext: &str,
    contents: &[u8],
    sequence: &mut NameSequence,
) -> Result<PathBuf> {
    let mut candidate = dir.join(format!("{stem}.{ext}"));

    loop {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => {
                write_or_discard(&candidate, file, contents)?;
                return Ok(candidate);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let index = sequence.next_index();
                candidate = dir.join(format!("{stem}_{index}.{ext}"));
            }
            Err(e) => return Err(ExtractError::io(&candidate, e)),
        }
    }
}

/// Write a freshly created file, removing it again if the write fails so no
/// partial artifact is left behind
fn write_or_discard(path: &Path, mut writer: impl Write, contents: &[u8]) -> Result<()> {
    let written = writer.write_all(contents).and_then(|()| writer.flush());
    drop(writer);

    if let Err(e) = written {
        if let Err(remove) = fs::remove_file(path) {
            warn!("Failed to remove partial file {}: {remove}", path.display());
        }
        return Err(ExtractError::io(path, e));
    }
    Ok(())
}

/// File stem of a path as an identifier, `"document"` if it has none
#[must_use]
pub fn identifier_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string())
}
