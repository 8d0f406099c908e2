//! Summary information property set reading
//!
//! `\u{5}SummaryInformation` is an OLE property set stream (MS-OLEPS). Only
//! the handful of string properties shown to users are decoded here; the
//! result is informational and never drives extraction.
//!
//! Layout:
//! - header: byte order `FE FF`, version, system id, CLSID, set count
//! - set list: FMTID (16 bytes) + section offset (u32)
//! - section: size (u32), property count (u32), then `(pid, offset)` pairs
//! - value: type (u32) followed by type-specific payload

use crate::container::{CompoundContainer, EntryPath};
use log::debug;

/// Name of the summary information stream
pub const SUMMARY_INFORMATION: &str = "\u{5}SummaryInformation";

const PID_CODEPAGE: u32 = 0x01;
const PID_TITLE: u32 = 0x02;
const PID_SUBJECT: u32 = 0x03;
const PID_AUTHOR: u32 = 0x04;
const PID_KEYWORDS: u32 = 0x05;

const VT_I2: u32 = 0x02;
const VT_LPSTR: u32 = 0x1E;
const VT_LPWSTR: u32 = 0x1F;

const CP_UTF16: u16 = 1200;
const CP_UTF8: u16 = 65001;

/// Upper bound on a single string property (bytes)
const MAX_STRING_LEN: usize = 64 * 1024;

/// Document properties shown to the user
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DocumentMetadata {
    /// Document title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Document subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Keywords
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

impl DocumentMetadata {
    /// Whether no property was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.subject.is_none()
            && self.author.is_none()
            && self.keywords.is_none()
    }
}

/// Read title/subject/author/keywords from an opened compound file
///
/// Returns `None` if the container has no readable summary stream or the
/// stream does not parse.
#[must_use]
pub fn read_metadata(container: &mut CompoundContainer) -> Option<DocumentMetadata> {
    let path = EntryPath::new([SUMMARY_INFORMATION]);
    if !container.contains(&path) {
        return None;
    }

    match container.read_entry(&path) {
        Ok(bytes) => parse_summary_information(&bytes),
        Err(e) => {
            debug!("Failed to read summary information: {e}");
            None
        }
    }
}

/// Parse the bytes of a summary information stream
#[must_use]
pub fn parse_summary_information(data: &[u8]) -> Option<DocumentMetadata> {
    if read_u16(data, 0)? != 0xFFFE {
        return None;
    }
    if read_u32(data, 24)? == 0 {
        return None;
    }

    // First set entry: FMTID at 28, section offset at 44
    // Offsets come from the file, so every sum is checked
    let section = read_u32(data, 44)? as usize;
    let count = read_u32(data, section.checked_add(4)?)? as usize;
    let pairs = section.checked_add(8)?;

    let mut properties = Vec::with_capacity(count.min(256));
    for i in 0..count.min(256) {
        let entry = pairs.checked_add(i * 8)?;
        let pid = read_u32(data, entry)?;
        let offset = read_u32(data, entry.checked_add(4)?)? as usize;
        properties.push((pid, section.checked_add(offset)?));
    }

    let codepage = properties
        .iter()
        .find(|(pid, _)| *pid == PID_CODEPAGE)
        .and_then(|(_, at)| match read_u32(data, *at)? {
            VT_I2 => read_u16(data, at.checked_add(4)?),
            _ => None,
        });

    let mut metadata = DocumentMetadata::default();
    for (pid, at) in properties {
        let slot = match pid {
            PID_TITLE => &mut metadata.title,
            PID_SUBJECT => &mut metadata.subject,
            PID_AUTHOR => &mut metadata.author,
            PID_KEYWORDS => &mut metadata.keywords,
            _ => continue,
        };
        *slot = read_string(data, at, codepage).filter(|s| !s.is_empty());
    }

    Some(metadata)
}

fn read_string(data: &[u8], at: usize, codepage: Option<u16>) -> Option<String> {
    let value_type = read_u32(data, at)?;
    let len = read_u32(data, at.checked_add(4)?)? as usize;
    let start = at.checked_add(8)?;

    let text = match value_type {
        VT_LPSTR if codepage == Some(CP_UTF16) => {
            decode_utf16(data.get(start..start.checked_add(len.min(MAX_STRING_LEN))?)?)
        }
        VT_LPSTR => {
            let raw = data.get(start..start.checked_add(len.min(MAX_STRING_LEN))?)?;
            if codepage == Some(CP_UTF8) {
                String::from_utf8_lossy(raw).into_owned()
            } else {
                // Single-byte code pages: Latin-1 is close enough for display
                raw.iter().map(|&b| char::from(b)).collect()
            }
        }
        VT_LPWSTR => {
            let byte_len = len.checked_mul(2)?.min(MAX_STRING_LEN);
            decode_utf16(data.get(start..start.checked_add(byte_len)?)?)
        }
        _ => return None,
    };

    Some(text.trim_end_matches('\0').trim().to_string())
}

fn decode_utf16(raw: &[u8]) -> String {
    let words: Vec<u16> = raw
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();
    String::from_utf16_lossy(&words)
}

#[inline]
fn read_u16(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

#[inline]
fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{build_compound, build_summary_information};
    use crate::CompoundContainer;

    #[test]
    fn test_parse_lpstr_properties() {
        let stream = build_summary_information(
            1252,
            &[
                (PID_TITLE, "Quarterly Plan"),
                (PID_AUTHOR, "Ada Lovelace"),
                (PID_KEYWORDS, "wbs, plan"),
            ],
        );
        let metadata = parse_summary_information(&stream).unwrap();

        assert_eq!(metadata.title.as_deref(), Some("Quarterly Plan"));
        assert_eq!(metadata.author.as_deref(), Some("Ada Lovelace"));
        assert_eq!(metadata.keywords.as_deref(), Some("wbs, plan"));
        assert_eq!(metadata.subject, None);
        assert!(!metadata.is_empty());
    }

    #[test]
    fn test_parse_utf8_codepage() {
        let stream = build_summary_information(CP_UTF8, &[(PID_SUBJECT, "Résumé")]);
        let metadata = parse_summary_information(&stream).unwrap();
        assert_eq!(metadata.subject.as_deref(), Some("Résumé"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_summary_information(b"not a property set"), None);
        assert_eq!(parse_summary_information(&[]), None);
    }

    #[test]
    fn test_parse_truncated_section() {
        let mut stream = build_summary_information(1252, &[(PID_TITLE, "Cut short")]);
        stream.truncate(50);
        assert_eq!(parse_summary_information(&stream), None);
    }

    #[test]
    fn test_parse_out_of_range_offsets() {
        let stream = build_summary_information(1252, &[(PID_TITLE, "Plan")]);

        let mut bad_section = stream.clone();
        bad_section[44..48].copy_from_slice(&u32::MAX.to_le_bytes());
        assert_eq!(parse_summary_information(&bad_section), None);

        // Title is the second (pid, offset) pair: offset field at 48 + 8 + 8 + 4
        let mut bad_value = stream;
        bad_value[68..72].copy_from_slice(&u32::MAX.to_le_bytes());
        let title = parse_summary_information(&bad_value).and_then(|m| m.title);
        assert_eq!(title, None);
    }

    #[test]
    fn test_read_metadata_from_container() {
        let stream = build_summary_information(1252, &[(PID_TITLE, "Embedded Plan")]);
        let bytes = build_compound(&[
            ("/WordDocument", b"body"),
            ("/\u{5}SummaryInformation", &stream),
        ]);
        let mut container = CompoundContainer::open(bytes).unwrap();

        let metadata = read_metadata(&mut container).unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Embedded Plan"));
    }

    #[test]
    fn test_read_metadata_missing_stream() {
        let bytes = build_compound(&[("/WordDocument", b"body")]);
        let mut container = CompoundContainer::open(bytes).unwrap();
        assert_eq!(read_metadata(&mut container), None);
    }
}
