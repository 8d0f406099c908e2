//! Content classification by structural name and magic bytes
//!
//! Classification is a fixed, ordered rule table: name rules are tried first
//! (first match wins), then the byte signature table. A compound-file stream
//! name is defined by the format that wrote it, so when it matches it is
//! trusted over the bytes.

use oleharvest_archive::ZIP_MAGIC;
use oleharvest_compound::CFB_MAGIC_SIGNATURE;
use std::fmt;

/// PDF header `%PDF-`
pub const PDF_MAGIC: [u8; 5] = *b"%PDF-";

/// Content-type tag for an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Word 97-2003 document
    LegacyWord,
    /// Excel 97-2003 workbook
    LegacyExcel,
    /// PowerPoint 97-2003 presentation
    LegacyPowerpoint,
    /// PDF document
    Pdf,
    /// Zip archive, including OOXML packages
    Zip,
    /// Compound file or OLE package holding a further embedded object
    OlePackage,
    /// Nothing recognized
    Unknown,
}

impl ContentKind {
    /// Snake-case tag
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LegacyWord => "legacy_word",
            Self::LegacyExcel => "legacy_excel",
            Self::LegacyPowerpoint => "legacy_powerpoint",
            Self::Pdf => "pdf",
            Self::Zip => "zip",
            Self::OlePackage => "ole_package",
            Self::Unknown => "unknown",
        }
    }

    /// File extension for persisted artifacts of this kind
    ///
    /// `Unknown` entries are never persisted and have no extension.
    #[must_use]
    pub const fn extension(self) -> Option<&'static str> {
        match self {
            Self::LegacyWord => Some("doc"),
            Self::LegacyExcel => Some("xls"),
            Self::LegacyPowerpoint => Some("ppt"),
            Self::Pdf => Some("pdf"),
            Self::Zip => Some("zip"),
            Self::OlePackage => Some("bin"),
            Self::Unknown => None,
        }
    }

    /// Whether artifacts of this kind are expanded further
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Zip | Self::OlePackage)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
enum NameMatch {
    Exact(&'static str),
    Contains(&'static str),
}

impl NameMatch {
    fn matches(self, name: &str) -> bool {
        match self {
            Self::Exact(pattern) => name == pattern,
            Self::Contains(pattern) => name.contains(pattern),
        }
    }
}

/// Name rules in priority order. The versioned `Word.Document` ProgIDs must
/// stay ahead of the generic one.
const NAME_RULES: &[(NameMatch, ContentKind)] = &[
    (NameMatch::Contains("Word.Document.8"), ContentKind::LegacyWord),
    (NameMatch::Contains("Word.Document.97"), ContentKind::LegacyWord),
    (NameMatch::Contains("Word.Document"), ContentKind::Zip),
    (NameMatch::Exact("WordDocument"), ContentKind::LegacyWord),
    (NameMatch::Exact("Workbook"), ContentKind::LegacyExcel),
    (NameMatch::Exact("PowerPoint Document"), ContentKind::LegacyPowerpoint),
    (NameMatch::Exact("CONTENTS"), ContentKind::Pdf),
    (NameMatch::Contains("Ole10Native"), ContentKind::OlePackage),
];

const SIGNATURE_RULES: &[(&[u8], ContentKind)] = &[
    (&CFB_MAGIC_SIGNATURE, ContentKind::OlePackage),
    (&ZIP_MAGIC, ContentKind::Zip),
];

/// Strip the control-character prefix compound files put on reserved
/// stream names (`\u{1}Ole10Native`, `\u{5}SummaryInformation`)
#[must_use]
pub fn stream_base_name(name: &str) -> &str {
    name.trim_start_matches(|c: char| c.is_control())
}

/// Classify by structural name alone
#[must_use]
pub fn classify_name(name: &str) -> Option<ContentKind> {
    let name = stream_base_name(name);
    NAME_RULES
        .iter()
        .find(|(rule, _)| rule.matches(name))
        .map(|(_, kind)| *kind)
}

/// Classify by leading bytes alone
#[must_use]
pub fn classify_signature(prefix: &[u8]) -> ContentKind {
    SIGNATURE_RULES
        .iter()
        .find(|(magic, _)| prefix.starts_with(magic))
        .map_or(ContentKind::Unknown, |(_, kind)| *kind)
}

/// Classify an entry: name rules first, then the byte signature
#[must_use]
pub fn classify(name: Option<&str>, prefix: &[u8]) -> ContentKind {
    name.and_then(classify_name)
        .unwrap_or_else(|| classify_signature(prefix))
}

/// Identify a raw document payload unwrapped from an OLE package
///
/// Unlike [`classify`], this also recognizes PDF headers: package payloads
/// are whole files, not structured streams.
#[must_use]
pub fn sniff_payload(bytes: &[u8]) -> Option<ContentKind> {
    if bytes.starts_with(&PDF_MAGIC) {
        return Some(ContentKind::Pdf);
    }
    match classify_signature(bytes) {
        ContentKind::Unknown => None,
        kind => Some(kind),
    }
}

/// Leaf classification of a `Package` stream
///
/// A `Package` stream holds a complete spreadsheet file rather than another
/// OLE object: compound bytes are a legacy workbook, zip bytes a modern one.
/// Returns the kind and the extension to persist it under.
#[must_use]
pub fn classify_package(bytes: &[u8]) -> Option<(ContentKind, &'static str)> {
    match classify_signature(bytes) {
        ContentKind::OlePackage => Some((ContentKind::LegacyExcel, "xls")),
        ContentKind::Zip => Some((ContentKind::Zip, "xlsx")),
        _ => None,
    }
}
