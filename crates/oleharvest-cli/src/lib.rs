//! Command-line interface for oleharvest
//!
//! This crate provides the `oleharvest` tool, which recovers the documents
//! embedded in Office files (OLE objects, PDFs, nested packages) into a flat
//! output directory.
//!
//! # Quick Start
//!
//! ```bash
//! # Extract everything embedded in a document
//! oleharvest extract "TS Plan.docx" -o extracted/
//!
//! # Extract, then drop the intermediate OLE containers
//! oleharvest extract plan.docx --cleanup bin
//!
//! # See what a document contains without writing anything
//! oleharvest list plan.docx
//!
//! # Summary metadata of a legacy document
//! oleharvest info legacy.doc
//! ```
//!
//! # Configuration
//!
//! Defaults for `extract` are read from `~/.oleharvest.toml` and
//! `./.oleharvest.toml`:
//!
//! ```toml
//! [extract]
//! output_dir = "extracted"
//! max_depth = 32
//! cleanup = ["bin"]
//! json = false
//! ```
//!
//! # Exit Codes
//!
//! - `0` - Success, including runs where individual entries failed
//! - `1` - The input could not be read, detected or opened
//! - `2` - Invalid arguments

pub mod config;

/// Format bytes as human-readable size (e.g., "1.5 MB")
#[must_use]
#[allow(clippy::cast_precision_loss)] // display only
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}

/// Split a `--cleanup` value list such as `bin,.zip` into extensions
#[must_use]
pub fn parse_extension_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|ext| !ext.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 bytes");
        assert_eq!(format_bytes(1023), "1023 bytes");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_parse_extension_list() {
        let values = vec!["bin, .zip".to_string(), "pdf".to_string(), ",".to_string()];
        assert_eq!(parse_extension_list(&values), vec!["bin", ".zip", "pdf"]);
    }
}
