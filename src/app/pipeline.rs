//! Download and merge workflows.
//!
//! Download: month ranges -> request -> fetch -> chunk file (+ manifest entry)
//! Merge:    chunk discovery (pattern or manifest) -> concat -> `merged.csv`
//!
//! Both take an explicit output sink so the CLI prints to stdout while tests
//! capture into a buffer.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;

use crate::data::{ChunkFetcher, build_request};
use crate::domain::{DateInterval, MergeConfig, RequestDescriptor};
use crate::error::AppError;
use crate::io::{ChunkManifest, MergeSummary, chunk_file_name, discover_chunks, merge_chunks, write_chunk};
use crate::range::month_ranges;

/// Everything needed to fetch and store one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChunk {
    pub interval: DateInterval,
    pub request: RequestDescriptor,
    pub file_name: String,
}

/// Lazily plan one chunk per month in `[start, end)`.
pub fn plan_chunks<'a>(
    credential: &'a str,
    start: NaiveDate,
    end: NaiveDate,
) -> impl Iterator<Item = PlannedChunk> + 'a {
    month_ranges(start, end).map(move |interval| PlannedChunk {
        request: build_request(credential, &interval),
        file_name: chunk_file_name(&interval),
        interval,
    })
}

/// What a download run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Number of intervals in the range.
    pub planned: usize,
    /// Chunk files written, in chronological order (empty on dry runs).
    pub written: Vec<PathBuf>,
}

/// One download run over a fixed credential, directory and mode.
pub struct DownloadPipeline<'a, F: ChunkFetcher> {
    fetcher: &'a F,
    credential: &'a str,
    out_dir: &'a Path,
    dry_run: bool,
}

impl<'a, F: ChunkFetcher> DownloadPipeline<'a, F> {
    pub fn new(fetcher: &'a F, credential: &'a str, out_dir: &'a Path, dry_run: bool) -> Self {
        Self {
            fetcher,
            credential,
            out_dir,
            dry_run,
        }
    }

    /// Process every month in `[start, end)` in order.
    ///
    /// The first fetch or write failure aborts the run; chunks written before it
    /// stay on disk and in the manifest.
    pub fn run(&self, start: NaiveDate, end: NaiveDate, out: &mut impl Write) -> Result<DownloadReport, AppError> {
        if self.dry_run {
            return self.run_dry(start, end, out);
        }

        fs::create_dir_all(self.out_dir).map_err(|e| {
            AppError::io(format!(
                "Failed to create output directory '{}': {e}",
                self.out_dir.display()
            ))
        })?;
        let mut manifest = ChunkManifest::load_or_default(self.out_dir)?;
        let mut report = DownloadReport::default();

        for chunk in plan_chunks(self.credential, start, end) {
            report.planned += 1;
            writeln!(out, "Downloading... {}", chunk.file_name).map_err(stdout_err)?;

            let body = self.fetcher.fetch(&chunk.request)?;
            let path = self.out_dir.join(&chunk.file_name);
            write_chunk(&path, &body)?;
            info!("wrote {} bytes to '{}'", body.len(), path.display());

            manifest.record(&chunk.file_name, &chunk.interval);
            manifest.save(self.out_dir)?;
            report.written.push(path);
        }

        Ok(report)
    }

    fn run_dry(&self, start: NaiveDate, end: NaiveDate, out: &mut impl Write) -> Result<DownloadReport, AppError> {
        let mut report = DownloadReport::default();
        for chunk in plan_chunks(self.credential, start, end) {
            report.planned += 1;
            writeln!(out, "{}", chunk.request.url).map_err(stdout_err)?;
            writeln!(out, "{}", chunk.file_name).map_err(stdout_err)?;
            writeln!(out).map_err(stdout_err)?;
        }
        Ok(report)
    }
}

/// What a merge run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Dry run: the files that would have been merged.
    Listed(Vec<PathBuf>),
    Merged { output: PathBuf, summary: MergeSummary },
}

/// Locate the chunk files for a merge, by pattern or from the manifest.
pub fn resolve_chunks(config: &MergeConfig) -> Result<Vec<PathBuf>, AppError> {
    if config.use_manifest {
        ChunkManifest::load(&config.dir)?.chunk_paths(&config.dir)
    } else {
        discover_chunks(&config.dir)
    }
}

/// Merge every discovered chunk into `merged.csv` (or only list them on dry runs).
pub fn run_merge(config: &MergeConfig, out: &mut impl Write) -> Result<MergeOutcome, AppError> {
    let chunks = resolve_chunks(config)?;

    if config.dry_run {
        for path in &chunks {
            let name = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
            writeln!(out, "{name}").map_err(stdout_err)?;
        }
        return Ok(MergeOutcome::Listed(chunks));
    }

    let output = config.output_path();
    let summary = merge_chunks(&chunks, &output, config.index_column)?;
    info!(
        "merged {} rows from {} files into '{}'",
        summary.rows,
        summary.files,
        output.display()
    );
    Ok(MergeOutcome::Merged { output, summary })
}

fn stdout_err(e: std::io::Error) -> AppError {
    AppError::io(format!("Failed to write output: {e}"))
}
