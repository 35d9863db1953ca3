//! Per-month chunk files.
//!
//! One file per interval, named `"<prefix> <YYYY-MM>.csv"` after the interval's
//! begin date. Download writes them; merge finds them again by the same pattern.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{CHUNK_PREFIX, CSV_EXTENSION, DateInterval};
use crate::error::AppError;

/// File name for the chunk covering `interval`.
pub fn chunk_file_name(interval: &DateInterval) -> String {
    format!("{CHUNK_PREFIX} {}{CSV_EXTENSION}", interval.month_label())
}

/// Whether `name` matches `"<prefix> *.csv"`.
pub fn is_chunk_file_name(name: &str) -> bool {
    name.strip_prefix(CHUNK_PREFIX)
        .and_then(|rest| rest.strip_prefix(' '))
        .is_some_and(|rest| rest.ends_with(CSV_EXTENSION))
}

/// Write a raw response body to `path`, replacing any existing file.
pub fn write_chunk(path: &Path, body: &[u8]) -> Result<(), AppError> {
    fs::write(path, body)
        .map_err(|e| AppError::io(format!("Failed to write chunk '{}': {e}", path.display())))
}

/// All chunk files directly inside `dir`, sorted by name.
///
/// Names embed `YYYY-MM`, so name order is chronological order.
pub fn discover_chunks(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::io(format!("Failed to read directory '{}': {e}", dir.display())))?;

    let mut found = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| AppError::io(format!("Failed to read directory '{}': {e}", dir.display())))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !is_chunk_file_name(name) {
            continue;
        }
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file {
            found.push(entry.path());
        }
    }

    found.sort();
    Ok(found)
}
