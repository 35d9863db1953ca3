//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - resolves them into explicit run configuration
//! - dispatches to the download or merge workflow

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use log::debug;

use crate::cli::{Cli, Command, DownloadArgs, MergeArgs};
use crate::data::{RescueTimeClient, RetryPolicy};
use crate::domain::{DownloadConfig, MERGED_FILE, MergeConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `rtx` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; it only supplies defaults for env-backed flags.
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    debug!("args: {}", redacted(&cli));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Command::Download(args) => handle_download(download_config(&cli, args)?, &mut out),
        Command::Merge(args) => handle_merge(&merge_config(&cli, args), &mut out),
    }
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .try_init()
        .ok();
}

fn redacted(cli: &Cli) -> String {
    match &cli.command {
        Command::Download(args) => format!(
            "download start={} end={} dir={} dry={}",
            args.start,
            args.end,
            cli.dir.display(),
            cli.dry
        ),
        Command::Merge(args) => format!(
            "merge manifest={} no_index={} dir={} dry={}",
            args.manifest,
            args.no_index,
            cli.dir.display(),
            cli.dry
        ),
    }
}

pub fn download_config(cli: &Cli, args: &DownloadArgs) -> Result<DownloadConfig, AppError> {
    if args.credential.trim().is_empty() {
        return Err(AppError::usage("The RescueTime API key must not be empty."));
    }
    Ok(DownloadConfig {
        credential: args.credential.clone(),
        start: args.start,
        end: args.end,
        out_dir: cli.dir.clone(),
        dry_run: cli.dry,
        timeout: Duration::from_secs(cli.timeout),
        max_retries: cli.retries,
    })
}

pub fn merge_config(cli: &Cli, args: &MergeArgs) -> MergeConfig {
    MergeConfig {
        dir: cli.dir.clone(),
        dry_run: cli.dry,
        use_manifest: args.manifest,
        index_column: !args.no_index,
    }
}

fn handle_download(config: DownloadConfig, out: &mut impl Write) -> Result<(), AppError> {
    say(out, "Downloading...")?;

    let client = RescueTimeClient::new(config.timeout, RetryPolicy::with_retries(config.max_retries))?;
    let report = pipeline::DownloadPipeline::new(&client, &config.credential, &config.out_dir, config.dry_run)
        .run(config.start, config.end, out)?;
    debug!("{} intervals, {} files written", report.planned, report.written.len());

    say(out, "Done!")
}

fn handle_merge(config: &MergeConfig, out: &mut impl Write) -> Result<(), AppError> {
    say(out, "Merging...")?;
    pipeline::run_merge(config, out)?;
    say(out, &format!("Done! ({MERGED_FILE})"))
}

fn say(out: &mut impl Write, line: &str) -> Result<(), AppError> {
    writeln!(out, "{line}").map_err(|e| AppError::io(format!("Failed to write output: {e}")))
}
