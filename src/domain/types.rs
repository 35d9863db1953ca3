//! Shared domain types.
//!
//! Everything here is plain data: no I/O, no formatting beyond what the file
//! naming convention needs.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Prefix shared by every per-month chunk file.
///
/// Download writes `"<prefix> <YYYY-MM>.csv"`; merge discovers files by the same
/// prefix, so the two must never drift apart.
pub const CHUNK_PREFIX: &str = "rescuetime_hourly_bymonth";

/// Extension of chunk files and of the merged output.
pub const CSV_EXTENSION: &str = ".csv";

/// Name of the combined output written by `merge`.
pub const MERGED_FILE: &str = "merged.csv";

/// Name of the manifest recording which chunks a download wrote.
pub const MANIFEST_FILE: &str = "rescuetime_manifest.json";

/// Inclusive calendar-date range `[start, end]` covering (at most) one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateInterval {
    /// `YYYY-MM` of the interval's begin date, used in chunk file names.
    pub fn month_label(&self) -> String {
        self.start.format("%Y-%m").to_string()
    }
}

/// A fully-formed request for one interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub url: String,
    pub interval_start: NaiveDate,
}

/// Resolved settings for a `download` run.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub credential: String,
    pub start: NaiveDate,
    /// Exclusive upper bound on interval begin dates.
    pub end: NaiveDate,
    pub out_dir: PathBuf,
    pub dry_run: bool,
    pub timeout: Duration,
    pub max_retries: u32,
}

/// Resolved settings for a `merge` run.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub dir: PathBuf,
    pub dry_run: bool,
    /// Take the chunk list from the manifest instead of scanning `dir`.
    pub use_manifest: bool,
    /// Emit the leading per-file row index column.
    pub index_column: bool,
}

impl MergeConfig {
    pub fn output_path(&self) -> PathBuf {
        self.dir.join(MERGED_FILE)
    }
}
