//! Command-line parsing for the RescueTime exporter.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! download/merge workflows. Dates are parsed here, so a malformed date is a
//! usage error reported before any network or file I/O.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "rtx",
    version,
    about = "Download RescueTime hourly activity month by month and merge it into one CSV"
)]
pub struct Cli {
    /// Print what would be downloaded/merged without touching the network or disk.
    #[arg(long, global = true)]
    pub dry: bool,

    /// Directory holding chunk files, the manifest and merged.csv.
    #[arg(long, global = true, env = "RESCUETIME_DIR", default_value = ".", value_name = "DIR")]
    pub dir: PathBuf,

    /// Per-request timeout in seconds (at least 1).
    #[arg(
        long,
        global = true,
        env = "RESCUETIME_TIMEOUT",
        default_value_t = 60,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Extra attempts for a failed request (connection errors, 429, 5xx), with exponential backoff.
    #[arg(long, global = true, env = "RESCUETIME_RETRIES", default_value_t = 0, value_name = "N")]
    pub retries: u32,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download hourly activity, one CSV per month, for months starting in [START, END).
    Download(DownloadArgs),
    /// Concatenate downloaded monthly CSVs into merged.csv.
    Merge(MergeArgs),
}

#[derive(Debug, Args, Clone)]
pub struct DownloadArgs {
    /// RescueTime API key from https://www.rescuetime.com/anapi/manage
    pub credential: String,

    /// Start date (YYYY-MM-DD), inclusive.
    #[arg(value_parser = parse_date)]
    pub start: NaiveDate,

    /// End date (YYYY-MM-DD), exclusive.
    #[arg(value_parser = parse_date)]
    pub end: NaiveDate,
}

#[derive(Debug, Args, Clone)]
pub struct MergeArgs {
    /// Merge the chunks recorded in the download manifest instead of scanning the directory.
    #[arg(long)]
    pub manifest: bool,

    /// Omit the leading per-file row index column.
    #[arg(long)]
    pub no_index: bool,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected a date like 2021-01-31, got '{raw}': {e}"))
}
