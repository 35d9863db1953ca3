//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - date intervals produced by the month partitioner (`DateInterval`)
//! - per-interval request descriptors (`RequestDescriptor`)
//! - resolved run configuration (`DownloadConfig`, `MergeConfig`)
//! - the fixed file names shared by download and merge

pub mod types;

pub use types::*;
