//! Concatenate chunk CSVs into one table.
//!
//! Columns of the output are the union of all input columns, in the order they
//! are first seen. A row from a file lacking some column gets an empty cell
//! there. By default each row is prefixed with its 0-based position inside its
//! source file under an unnamed header, so existing consumers of `merged.csv`
//! keep seeing the same layout.
//!
//! Short rows are padded with empty cells; a row with more cells than its
//! header is malformed.
//!
//! Every input is fully read and validated before the output is written, and
//! the output replaces `merged.csv` only once complete: a malformed chunk or a
//! failed write aborts the merge without leaving a partial `merged.csv`.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use log::debug;

use crate::error::AppError;
use crate::io::atomic::AtomicFile;

/// One parsed chunk file.
#[derive(Debug, Clone)]
pub struct ChunkTable {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub records: Vec<StringRecord>,
}

/// The concatenated result, ready to be written.
#[derive(Debug, Clone, Default)]
pub struct MergedTable {
    pub columns: Vec<String>,
    /// `(row index within source file, cells aligned to columns)`.
    pub rows: Vec<(usize, Vec<String>)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    pub files: usize,
    pub rows: usize,
    pub columns: usize,
}

/// Parse a chunk file as CSV with a header row.
pub fn read_chunk(path: &Path) -> Result<ChunkTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open chunk '{}': {e}", path.display())))?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::io(format!("Failed to read CSV headers of '{}': {e}", path.display())))?
        .clone();
    if headers.is_empty() {
        return Err(AppError::io(format!("Chunk '{}' has no columns to parse.", path.display())));
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AppError::io(format!("Malformed CSV in '{}': {e}", path.display())))?;
        if record.len() > headers.len() {
            let line = record.position().map_or(0, |p| p.line());
            return Err(AppError::io(format!(
                "Malformed CSV in '{}': line {line} has {} fields but the header has {}.",
                path.display(),
                record.len(),
                headers.len()
            )));
        }
        records.push(record);
    }

    Ok(ChunkTable {
        path: path.to_path_buf(),
        headers: dedupe_headers(&headers),
        records,
    })
}

/// Rename repeated header names to `name.1`, `name.2`, ... so that every
/// column keeps a distinct key in the union.
fn dedupe_headers(headers: &StringRecord) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    headers
        .iter()
        .map(|name| {
            let count = seen.entry(name).or_insert(0);
            let out = if *count == 0 {
                name.to_string()
            } else {
                format!("{name}.{count}")
            };
            *count += 1;
            out
        })
        .collect()
}

/// Concatenate tables row-wise over the union of their columns.
pub fn concat(tables: &[ChunkTable]) -> MergedTable {
    let mut merged = MergedTable::default();
    let mut column_index: HashMap<String, usize> = HashMap::new();

    for table in tables {
        let positions: Vec<usize> = table
            .headers
            .iter()
            .map(|name| {
                *column_index.entry(name.clone()).or_insert_with(|| {
                    merged.columns.push(name.clone());
                    merged.columns.len() - 1
                })
            })
            .collect();

        for (row_idx, record) in table.records.iter().enumerate() {
            let mut cells = vec![String::new(); merged.columns.len()];
            for (value, &pos) in record.iter().zip(&positions) {
                cells[pos] = value.to_string();
            }
            merged.rows.push((row_idx, cells));
        }
    }

    // Rows from earlier files are shorter if later files introduced columns.
    let width = merged.columns.len();
    for (_, cells) in &mut merged.rows {
        cells.resize(width, String::new());
    }

    merged
}

/// Write a merged table as CSV, replacing `path`.
pub fn write_merged(path: &Path, table: &MergedTable, index_column: bool) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(AtomicFile::new(path)?);
    let write_err = |e: csv::Error| AppError::io(format!("Failed to write '{}': {e}", path.display()));

    let mut header: Vec<&str> = Vec::with_capacity(table.columns.len() + 1);
    if index_column {
        header.push("");
    }
    header.extend(table.columns.iter().map(String::as_str));
    writer.write_record(&header).map_err(write_err)?;

    for (row_idx, cells) in &table.rows {
        if index_column {
            let idx = row_idx.to_string();
            writer
                .write_record(std::iter::once(idx.as_str()).chain(cells.iter().map(String::as_str)))
                .map_err(write_err)?;
        } else {
            writer.write_record(cells).map_err(write_err)?;
        }
    }

    let file = writer
        .into_inner()
        .map_err(|e| AppError::io(format!("Failed to flush '{}': {}", path.display(), e.error())))?;
    file.finish()?;
    Ok(())
}

/// Read every chunk in `paths`, concatenate, and write the result to `output`.
pub fn merge_chunks(paths: &[PathBuf], output: &Path, index_column: bool) -> Result<MergeSummary, AppError> {
    if paths.is_empty() {
        return Err(AppError::io("No chunk files to merge."));
    }

    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        let table = read_chunk(path)?;
        debug!("read {} rows from '{}'", table.records.len(), table.path.display());
        tables.push(table);
    }

    let merged = concat(&tables);
    write_merged(output, &merged, index_column)?;

    Ok(MergeSummary {
        files: tables.len(),
        rows: merged.rows.len(),
        columns: merged.columns.len(),
    })
}
