//! Results of an extraction run

use crate::signature::ContentKind;
use serde::Serialize;
use std::path::PathBuf;

/// A file written to the output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedArtifact {
    /// Full path of the written file
    pub path: PathBuf,
    /// File name within the output directory
    pub file_name: String,
    /// Classification of the content
    pub kind: ContentKind,
    /// Extension the file was written with
    pub extension: String,
    /// Size in bytes
    pub size: u64,
    /// Nesting depth (1 for children of the root input)
    pub depth: usize,
    /// Identifier of the container the entry came from
    pub parent: String,
    /// Structural path of the entry inside its container
    pub entry: String,
    /// Display name recorded by an OLE package, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ExtractedArtifact {
    /// File stem, used as the identifier of this artifact's own children
    #[must_use]
    pub fn identifier(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map_or(self.file_name.as_str(), |(stem, _)| stem)
    }
}

/// A discovered entry that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFailure {
    /// Identifier of the container being processed
    pub parent: String,
    /// Structural path of the failing entry, or the artifact that failed to open
    pub entry: String,
    /// Human-readable cause
    pub message: String,
}

/// One entry of a root container as seen by the classifier, without
/// anything being written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryListing {
    /// Structural path of the entry
    pub entry: String,
    /// Declared or decompressed size in bytes
    pub size: u64,
    /// Classification the entry would get
    pub kind: ContentKind,
    /// Whether extraction would consider the entry at all
    pub candidate: bool,
}

/// Everything produced by one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    /// Identifier of the root input
    pub identifier: String,
    /// Output directory
    pub output_dir: PathBuf,
    /// Artifacts in the order they were written
    pub artifacts: Vec<ExtractedArtifact>,
    /// Per-entry failures that did not abort the run
    pub failures: Vec<EntryFailure>,
}

impl ExtractionReport {
    /// Empty report for a run
    #[must_use]
    pub fn new(identifier: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            identifier: identifier.into(),
            output_dir: output_dir.into(),
            artifacts: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Whether any entry failed
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Artifacts of one kind
    pub fn artifacts_of(&self, kind: ContentKind) -> impl Iterator<Item = &ExtractedArtifact> {
        self.artifacts.iter().filter(move |a| a.kind == kind)
    }

    /// Total bytes written
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.artifacts.iter().map(|a| a.size).sum()
    }
}
