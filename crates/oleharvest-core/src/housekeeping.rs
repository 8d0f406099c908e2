//! Post-extraction cleanup of transient artifacts

use log::{debug, info, warn};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Outcome of a cleanup pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Files deleted, sorted by path
    pub removed: Vec<PathBuf>,
    /// Files (or directory reads) that could not be handled
    pub failed: usize,
}

fn normalize(extensions: &[impl AsRef<str>]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// Delete the files directly under `output_dir` whose name ends in one of
/// `extensions`
///
/// Extensions match case-insensitively, with or without a leading dot.
/// Subdirectories are left alone. Nothing here returns an error: failed
/// deletions are logged and counted in [`CleanupReport::failed`], and a
/// missing directory simply has nothing to clean.
pub fn cleanup(output_dir: &Path, extensions: &[impl AsRef<str>]) -> CleanupReport {
    let wanted = normalize(extensions);
    let mut report = CleanupReport::default();
    if wanted.is_empty() {
        return report;
    }

    let entries = match fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return report,
        Err(e) => {
            warn!("Cannot read {}: {e}", output_dir.display());
            report.failed += 1;
            return report;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cannot read entry of {}: {e}", output_dir.display());
                report.failed += 1;
                continue;
            }
        };

        match entry.file_type() {
            Ok(file_type) if file_type.is_file() => {}
            Ok(_) => continue,
            Err(e) => {
                warn!("Cannot stat {}: {e}", entry.path().display());
                report.failed += 1;
                continue;
            }
        }

        let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
        if !wanted.iter().any(|ext| name.ends_with(&format!(".{ext}"))) {
            continue;
        }

        let path = entry.path();
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed {}", path.display());
                report.removed.push(path);
            }
            Err(e) => {
                warn!("Failed to remove {}: {e}", path.display());
                report.failed += 1;
            }
        }
    }

    report.removed.sort();
    info!(
        "Cleanup removed {} files from {} ({} failures)",
        report.removed.len(),
        output_dir.display(),
        report.failed
    );
    report
}
