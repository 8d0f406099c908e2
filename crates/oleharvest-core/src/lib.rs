//! oleharvest-core - recover embedded objects from Office documents
//!
//! Office documents carry other documents inside them: a `.docx` keeps OLE
//! objects under `word/embeddings/`, each OLE object is a Compound File that
//! may hold a legacy Word stream, a PDF, an `Ole10Native` package wrapping an
//! arbitrary file, or yet another zip. This crate walks that tree and writes
//! every recognized payload to a flat output directory.
//!
//! ## Pipeline
//!
//! ```text
//! root path → envelope (zip / compound) → entries → classify → persist
//!                  ↑                                              │
//!                  └──────────── container artifacts ─────────────┘
//! ```
//!
//! - [`signature`]: ordered name and magic-byte rules producing a [`ContentKind`]
//! - [`orchestrator`]: the [`Extractor`] worklist
//! - [`naming`]: `{parent}_{n}.{ext}` names from a run-wide [`NameSequence`]
//! - [`housekeeping`]: removal of transient artifacts after a run
//! - [`ole_native`]: unwrapping of `\u{1}Ole10Native` package streams
//!
//! ## Usage
//!
//! ```rust,no_run
//! use oleharvest_core::{cleanup, Extractor};
//! use std::path::Path;
//!
//! let extractor = Extractor::new("extracted");
//! let report = extractor.extract_path(Path::new("TS Plan.docx"))?;
//! println!("{} artifacts, {} failures", report.artifacts.len(), report.failures.len());
//!
//! // Drop the intermediate OLE containers, keep the documents
//! cleanup(Path::new("extracted"), &["bin"]);
//! # Ok::<(), oleharvest_core::ExtractError>(())
//! ```

pub mod error;
pub mod housekeeping;
pub mod naming;
pub mod ole_native;
pub mod options;
pub mod orchestrator;
pub mod report;
pub mod signature;

pub use error::{ExtractError, Result};
pub use housekeeping::{cleanup, CleanupReport};
pub use naming::NameSequence;
pub use options::ExtractOptions;
pub use orchestrator::{detect_envelope, inspect_path, EnvelopeKind, Extractor};
pub use report::{EntryFailure, EntryListing, ExtractedArtifact, ExtractionReport};
pub use signature::{classify, ContentKind};

pub use oleharvest_compound::{read_metadata, CompoundContainer, DocumentMetadata};
