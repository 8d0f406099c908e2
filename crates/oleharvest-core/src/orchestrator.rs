//! Depth-first extraction over an explicit worklist
//!
//! A run starts from one root container. Expanding a frame opens its
//! container, classifies the entries, persists the recognized ones and turns
//! every persisted container into a new frame. Frames wait on a stack, so
//! nested containers are expanded depth-first in enumeration order.
//!
//! Only failures opening the root abort a run. Anything that goes wrong with
//! a discovered entry, including writing it out, is logged and recorded in
//! the [`ExtractionReport`], and the loop moves on to the next sibling.

use crate::error::{ExtractError, Result};
use crate::naming::{artifact_stem, identifier_for, persist_unique, NameScope, NameSequence};
use crate::ole_native;
use crate::options::ExtractOptions;
use crate::report::{EntryFailure, EntryListing, ExtractedArtifact, ExtractionReport};
use crate::signature::{classify, classify_package, sniff_payload, stream_base_name, ContentKind};
use log::{debug, info, warn};
use oleharvest_archive::{ArchiveContainer, ZIP_MAGIC};
use oleharvest_compound::{has_cfb_signature, read_metadata, CompoundContainer};
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Compound-file streams that describe an embedded object rather than hold it
const BOOKKEEPING_STREAMS: &[&str] = &[
    "CompObj",
    "ObjInfo",
    "DocumentSummaryInformation",
    "SummaryInformation",
];

/// Stream holding a complete spreadsheet file
const PACKAGE_STREAM: &str = "Package";

/// How a root input is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    /// Zip-family archive (`.docx` and other OOXML packages)
    Archive,
    /// Compound file (`.doc`)
    Compound,
}

/// Decide how to open a root input
///
/// A `.docx` or `.doc` suffix (any case) decides. Without one, the magic
/// bytes do. Returns `None` when neither gives an answer.
#[must_use]
pub fn detect_envelope(path: &Path, prefix: &[u8]) -> Option<EnvelopeKind> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("docx") => Some(EnvelopeKind::Archive),
        Some("doc") => Some(EnvelopeKind::Compound),
        _ => detect_bytes(prefix),
    }
}

fn detect_bytes(bytes: &[u8]) -> Option<EnvelopeKind> {
    if has_cfb_signature(bytes) {
        Some(EnvelopeKind::Compound)
    } else if bytes.starts_with(&ZIP_MAGIC) {
        Some(EnvelopeKind::Archive)
    } else {
        None
    }
}

fn fingerprint(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

fn is_bookkeeping(name: &str) -> bool {
    BOOKKEEPING_STREAMS.contains(&stream_base_name(name))
}

fn member_base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn entry_kind(name: &str, data: &[u8]) -> ContentKind {
    if stream_base_name(name) == PACKAGE_STREAM {
        classify_package(data).map_or(ContentKind::Unknown, |(kind, _)| kind)
    } else {
        classify(Some(name), data)
    }
}

/// A persisted container waiting to be expanded
#[derive(Debug)]
struct Frame {
    bytes: Vec<u8>,
    /// Stem of the artifact, parent identifier for everything found inside
    identifier: String,
    file_name: String,
    kind: ContentKind,
    depth: usize,
    /// Fingerprints of this frame and every enclosing one
    lineage: Vec<u64>,
}

/// The container whose entries are being dispatched
struct Parent<'a> {
    identifier: &'a str,
    depth: usize,
    lineage: &'a [u64],
}

impl Parent<'_> {
    const fn scope(&self) -> NameScope {
        if self.depth == 0 {
            NameScope::Root
        } else {
            NameScope::Nested
        }
    }
}

/// State shared by every frame of one run
struct Run<'a> {
    output_dir: &'a Path,
    options: &'a ExtractOptions,
    sequence: &'a mut NameSequence,
    report: ExtractionReport,
}

impl Run<'_> {
    /// Expand frames until the worklist is empty
    fn drain(&mut self, children: Vec<Frame>) {
        let mut stack: Vec<Frame> = children.into_iter().rev().collect();

        while let Some(frame) = stack.pop() {
            let identifier = frame.identifier.clone();
            let file_name = frame.file_name.clone();

            match self.expand_nested(frame) {
                Ok(children) => stack.extend(children.into_iter().rev()),
                Err(e) => self.fail(&identifier, &file_name, &e),
            }
        }
    }

    fn expand_nested(&mut self, frame: Frame) -> Result<Vec<Frame>> {
        let Frame {
            bytes,
            identifier,
            file_name,
            kind,
            depth,
            lineage,
        } = frame;
        let parent = Parent {
            identifier: &identifier,
            depth,
            lineage: &lineage,
        };

        debug!("Expanding {file_name} ({kind}, depth {depth})");
        match detect_bytes(&bytes) {
            Some(EnvelopeKind::Archive) => self.expand_archive(&parent, bytes),
            Some(EnvelopeKind::Compound) => self.expand_compound(&parent, bytes),
            None if kind == ContentKind::OlePackage => {
                self.unwrap_native(&parent, &file_name, &bytes)
            }
            None => Err(ExtractError::Format(format!(
                "{file_name} is not a container"
            ))),
        }
    }

    fn expand_archive(&mut self, parent: &Parent<'_>, bytes: Vec<u8>) -> Result<Vec<Frame>> {
        let mut archive = ArchiveContainer::open(bytes)?;

        // OOXML parts are document structure; only embeddings are payloads
        let ooxml = archive.is_ooxml_package();
        let members: Vec<String> = archive
            .list_entries()
            .into_iter()
            .filter(|name| !ooxml || self.options.is_package_candidate(name))
            .collect();
        debug!(
            "{}: {} candidate members (ooxml: {ooxml})",
            parent.identifier,
            members.len()
        );

        let mut children = Vec::new();
        for name in &members {
            match archive.read_entry(name) {
                Ok(data) => {
                    self.dispatch(parent, name, member_base_name(name), data, &mut children);
                }
                Err(e) => self.fail(parent.identifier, name, &ExtractError::from(e)),
            }
        }

        Ok(children)
    }

    fn expand_compound(&mut self, parent: &Parent<'_>, bytes: Vec<u8>) -> Result<Vec<Frame>> {
        let mut container = CompoundContainer::open(bytes)?;

        if parent.depth == 0 {
            if let Some(metadata) = read_metadata(&mut container) {
                debug!(
                    "{}: title={:?} subject={:?} author={:?} keywords={:?}",
                    parent.identifier,
                    metadata.title,
                    metadata.subject,
                    metadata.author,
                    metadata.keywords
                );
            }
        }

        let mut children = Vec::new();
        for path in container.list_entries() {
            let Some(name) = path.name().map(str::to_string) else {
                continue;
            };
            if is_bookkeeping(&name) {
                continue;
            }

            let entry = path.to_string();
            match container.read_entry(&path) {
                Ok(data) => self.dispatch(parent, &entry, &name, data, &mut children),
                Err(e) => self.fail(parent.identifier, &entry, &ExtractError::from(e)),
            }
        }

        Ok(children)
    }

    /// Recover the file wrapped by an `Ole10Native` stream
    fn unwrap_native(
        &mut self,
        parent: &Parent<'_>,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Vec<Frame>> {
        let package = ole_native::parse(bytes)
            .ok_or_else(|| ExtractError::Format(format!("{file_name} is not a container")))?;

        let Some((kind, extension)) = sniff_payload(package.payload)
            .and_then(|kind| kind.extension().map(|extension| (kind, extension)))
        else {
            return Err(ExtractError::Format(format!(
                "{file_name} is not a container: embedded file '{}' is not a recognized document",
                package.label
            )));
        };

        debug!(
            "{file_name}: package '{}' from {} ({kind})",
            package.label, package.source_path
        );
        let artifact = self.persist(
            parent,
            &package.label,
            package.payload,
            kind,
            extension,
            Some(package.label.clone()),
        )?;

        let mut children = Vec::new();
        if kind.is_container() {
            self.schedule(parent, &artifact, package.payload.to_vec(), &mut children);
        }
        Ok(children)
    }

    /// Classify one entry, persist it if recognized and schedule it if it is
    /// a container. Failures are recorded against the entry.
    fn dispatch(
        &mut self,
        parent: &Parent<'_>,
        entry: &str,
        name: &str,
        data: Vec<u8>,
        children: &mut Vec<Frame>,
    ) {
        if let Err(e) = self.try_dispatch(parent, entry, name, data, children) {
            self.fail(parent.identifier, entry, &e);
        }
    }

    fn try_dispatch(
        &mut self,
        parent: &Parent<'_>,
        entry: &str,
        name: &str,
        data: Vec<u8>,
        children: &mut Vec<Frame>,
    ) -> Result<()> {
        if stream_base_name(name) == PACKAGE_STREAM {
            match classify_package(&data) {
                Some((kind, extension)) => {
                    self.persist(parent, entry, &data, kind, extension, None)?;
                }
                None => debug!("{}: skipping unrecognized {entry}", parent.identifier),
            }
            return Ok(());
        }

        let kind = classify(Some(name), &data);
        let Some(extension) = kind.extension() else {
            debug!("{}: skipping {entry} ({kind})", parent.identifier);
            return Ok(());
        };

        let artifact = self.persist(parent, entry, &data, kind, extension, None)?;
        if kind.is_container() {
            self.schedule(parent, &artifact, data, children);
        }
        Ok(())
    }

    fn persist(
        &mut self,
        parent: &Parent<'_>,
        entry: &str,
        data: &[u8],
        kind: ContentKind,
        extension: &str,
        label: Option<String>,
    ) -> Result<ExtractedArtifact> {
        let index = self.sequence.next_index();
        let stem = artifact_stem(parent.identifier, parent.scope(), index);
        let path = persist_unique(self.output_dir, &stem, extension, data, &mut *self.sequence)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let artifact = ExtractedArtifact {
            path,
            file_name,
            kind,
            extension: extension.to_string(),
            size: data.len() as u64,
            depth: parent.depth + 1,
            parent: parent.identifier.to_string(),
            entry: entry.to_string(),
            label,
        };
        info!(
            "Extracted {} ({kind}, {} bytes) from {}",
            artifact.file_name, artifact.size, parent.identifier
        );

        self.report.artifacts.push(artifact.clone());
        Ok(artifact)
    }

    fn schedule(
        &mut self,
        parent: &Parent<'_>,
        artifact: &ExtractedArtifact,
        data: Vec<u8>,
        children: &mut Vec<Frame>,
    ) {
        let max = self.options.max_depth;
        if artifact.depth > max {
            let error = ExtractError::TooDeep {
                depth: artifact.depth,
                max,
            };
            self.fail(parent.identifier, &artifact.file_name, &error);
            return;
        }

        let print = fingerprint(&data);
        if parent.lineage.contains(&print) {
            let error = ExtractError::Format(format!(
                "{} repeats an enclosing container",
                artifact.file_name
            ));
            self.fail(parent.identifier, &artifact.file_name, &error);
            return;
        }

        let mut lineage = parent.lineage.to_vec();
        lineage.push(print);
        children.push(Frame {
            bytes: data,
            identifier: artifact.identifier().to_string(),
            file_name: artifact.file_name.clone(),
            kind: artifact.kind,
            depth: artifact.depth,
            lineage,
        });
    }

    fn fail(&mut self, parent: &str, entry: &str, error: &ExtractError) {
        warn!("{parent}: failed to process {entry}: {error}");
        self.report.failures.push(EntryFailure {
            parent: parent.to_string(),
            entry: entry.to_string(),
            message: error.to_string(),
        });
    }

    fn finish(self) -> ExtractionReport {
        info!(
            "{}: {} artifacts, {} failures",
            self.report.identifier,
            self.report.artifacts.len(),
            self.report.failures.len()
        );
        self.report
    }
}

/// Extracts embedded objects from documents into one output directory
///
/// # Examples
///
/// ```rust,ignore
/// use oleharvest_core::Extractor;
/// use std::path::Path;
///
/// let extractor = Extractor::new("extracted");
/// let report = extractor.extract_path(Path::new("plan.docx"))?;
/// for artifact in &report.artifacts {
///     println!("{} ({})", artifact.file_name, artifact.kind);
/// }
/// # Ok::<(), oleharvest_core::ExtractError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    output_dir: PathBuf,
    options: ExtractOptions,
}

impl Extractor {
    /// Extractor with default options
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_options(output_dir, ExtractOptions::default())
    }

    /// Extractor with explicit options
    #[must_use]
    pub fn with_options(output_dir: impl Into<PathBuf>, options: ExtractOptions) -> Self {
        Self {
            output_dir: output_dir.into(),
            options,
        }
    }

    /// Directory artifacts are written to
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract everything embedded in the document at `path`
    ///
    /// # Errors
    ///
    /// - [`ExtractError::Io`] if the input cannot be read or the output
    ///   directory cannot be created
    /// - [`ExtractError::UnsupportedFormat`] if the input is neither a
    ///   `.doc`/`.docx` by name nor a compound file or zip by signature
    /// - [`ExtractError::Format`] if the root container cannot be opened
    #[must_use = "this function returns the extraction report"]
    pub fn extract_path(&self, path: &Path) -> Result<ExtractionReport> {
        let mut sequence = NameSequence::new();
        self.extract_path_with(path, &mut sequence)
    }

    /// Like [`Extractor::extract_path`], drawing artifact indices from a
    /// caller-owned sequence so several inputs can share one directory
    ///
    /// # Errors
    ///
    /// Same as [`Extractor::extract_path`].
    #[must_use = "this function returns the extraction report"]
    pub fn extract_path_with(
        &self,
        path: &Path,
        sequence: &mut NameSequence,
    ) -> Result<ExtractionReport> {
        let bytes = fs::read(path).map_err(|e| ExtractError::io(path, e))?;
        let envelope = detect_envelope(path, &bytes)
            .ok_or_else(|| ExtractError::UnsupportedFormat(path.to_path_buf()))?;

        info!("Extracting {} ({envelope:?})", path.display());
        self.run_root(&identifier_for(path), bytes, envelope, sequence)
    }

    /// Extract from an in-memory document, detected on its bytes only
    ///
    /// # Errors
    ///
    /// Same as [`Extractor::extract_path`]; `UnsupportedFormat` carries the
    /// identifier.
    #[must_use = "this function returns the extraction report"]
    pub fn extract_bytes(&self, identifier: &str, bytes: Vec<u8>) -> Result<ExtractionReport> {
        let envelope = detect_bytes(&bytes)
            .ok_or_else(|| ExtractError::UnsupportedFormat(PathBuf::from(identifier)))?;
        let mut sequence = NameSequence::new();
        self.run_root(identifier, bytes, envelope, &mut sequence)
    }

    /// Run the classify/persist/recurse loop over entries an outer reader
    /// already produced
    ///
    /// Entries are treated as children of a root document named
    /// `identifier`; no candidate filtering is applied.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Io`] if the output directory cannot be
    /// created. Failures on individual entries end up in the report.
    #[must_use = "this function returns the extraction report"]
    pub fn extract_entries<I, S>(&self, identifier: &str, entries: I) -> Result<ExtractionReport>
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        let mut sequence = NameSequence::new();
        let mut run = self.start(identifier, &mut sequence)?;
        let root = Parent {
            identifier,
            depth: 0,
            lineage: &[],
        };

        let mut children = Vec::new();
        for (name, data) in entries {
            let name = name.as_ref();
            run.dispatch(&root, name, member_base_name(name), data, &mut children);
        }

        run.drain(children);
        Ok(run.finish())
    }

    fn start<'a>(&'a self, identifier: &str, sequence: &'a mut NameSequence) -> Result<Run<'a>> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| ExtractError::io(&self.output_dir, e))?;

        Ok(Run {
            output_dir: &self.output_dir,
            options: &self.options,
            sequence,
            report: ExtractionReport::new(identifier, &self.output_dir),
        })
    }

    fn run_root(
        &self,
        identifier: &str,
        bytes: Vec<u8>,
        envelope: EnvelopeKind,
        sequence: &mut NameSequence,
    ) -> Result<ExtractionReport> {
        let mut run = self.start(identifier, sequence)?;
        let lineage = [fingerprint(&bytes)];
        let root = Parent {
            identifier,
            depth: 0,
            lineage: &lineage,
        };

        let children = match envelope {
            EnvelopeKind::Archive => run.expand_archive(&root, bytes)?,
            EnvelopeKind::Compound => run.expand_compound(&root, bytes)?,
        };

        run.drain(children);
        Ok(run.finish())
    }
}

/// List the entries of a root document with the classification each would
/// get, without writing anything
///
/// # Errors
///
/// Same root failures as [`Extractor::extract_path`]. Entries that cannot be
/// read are listed as `unknown`.
#[must_use = "this function returns the entry listing"]
pub fn inspect_path(path: &Path, options: &ExtractOptions) -> Result<Vec<EntryListing>> {
    let bytes = fs::read(path).map_err(|e| ExtractError::io(path, e))?;
    let envelope = detect_envelope(path, &bytes)
        .ok_or_else(|| ExtractError::UnsupportedFormat(path.to_path_buf()))?;

    let mut listing = Vec::new();
    match envelope {
        EnvelopeKind::Archive => {
            let mut archive = ArchiveContainer::open(bytes)?;
            let ooxml = archive.is_ooxml_package();

            for info in archive.list_entry_info()? {
                let kind = archive
                    .read_entry(&info.name)
                    .map_or(ContentKind::Unknown, |data| {
                        entry_kind(member_base_name(&info.name), &data)
                    });
                listing.push(EntryListing {
                    candidate: !ooxml || options.is_package_candidate(&info.name),
                    entry: info.name,
                    size: info.size,
                    kind,
                });
            }
        }
        EnvelopeKind::Compound => {
            let mut container = CompoundContainer::open(bytes)?;

            for path in container.list_entries() {
                let name = path.name().unwrap_or_default().to_string();
                let kind = container
                    .read_entry(&path)
                    .map_or(ContentKind::Unknown, |data| entry_kind(&name, &data));
                listing.push(EntryListing {
                    entry: path.to_string(),
                    size: container.entry_size(&path).unwrap_or_default(),
                    kind,
                    candidate: !is_bookkeeping(&name),
                });
            }
        }
    }

    Ok(listing)
}
