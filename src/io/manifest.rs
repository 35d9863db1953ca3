//! Download manifest.
//!
//! Every live download records the chunks it wrote in `rescuetime_manifest.json`
//! so `merge --manifest` can work from an explicit list instead of a filename
//! pattern. The manifest is saved after each chunk; an aborted run still lists
//! what it managed to write. The API key is never stored here.
//!
//! Download treats the manifest as advisory: an unreadable one is replaced by a
//! fresh manifest instead of failing the run.

use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::domain::{DateInterval, MANIFEST_FILE};
use crate::error::AppError;
use crate::io::atomic::AtomicFile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// File name relative to the manifest's directory.
    pub file: String,
    pub begin: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkManifest {
    pub chunks: Vec<ManifestEntry>,
}

impl ChunkManifest {
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(MANIFEST_FILE)
    }

    /// Load the manifest in `dir`, or an empty one if none exists yet or the
    /// existing one cannot be parsed.
    pub fn load_or_default(dir: &Path) -> Result<Self, AppError> {
        let path = Self::path_in(dir);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(AppError::io(format!("Failed to open manifest '{}': {e}", path.display())));
            }
        };
        match Self::parse(file, &path) {
            Ok(manifest) => Ok(manifest),
            Err(e) => {
                warn!("{e}; starting a new manifest");
                Ok(Self::default())
            }
        }
    }

    /// Load the manifest in `dir`; a missing manifest is an error.
    pub fn load(dir: &Path) -> Result<Self, AppError> {
        let path = Self::path_in(dir);
        let file = File::open(&path)
            .map_err(|e| AppError::io(format!("Failed to open manifest '{}': {e}", path.display())))?;
        Self::parse(file, &path)
    }

    fn parse(file: File, path: &Path) -> Result<Self, AppError> {
        serde_json::from_reader(file)
            .map_err(|e| AppError::io(format!("Invalid manifest '{}': {e}", path.display())))
    }

    pub fn save(&self, dir: &Path) -> Result<(), AppError> {
        let path = Self::path_in(dir);
        let mut file = AtomicFile::new(&path)?;
        serde_json::to_writer_pretty(&mut file, self)
            .map_err(|e| AppError::io(format!("Failed to write manifest '{}': {e}", path.display())))?;
        file.finish()?;
        Ok(())
    }

    /// Insert or replace the entry for `file`, keeping entries ordered by begin date.
    pub fn record(&mut self, file: &str, interval: &DateInterval) {
        let entry = ManifestEntry {
            file: file.to_string(),
            begin: interval.start,
            end: interval.end,
        };
        match self.chunks.iter_mut().find(|c| c.file == entry.file) {
            Some(existing) => *existing = entry,
            None => self.chunks.push(entry),
        }
        self.chunks.sort_by_key(|c| c.begin);
    }

    /// Chunk paths resolved against `dir`; every listed file must exist.
    pub fn chunk_paths(&self, dir: &Path) -> Result<Vec<PathBuf>, AppError> {
        self.chunks
            .iter()
            .map(|c| {
                let path = dir.join(&c.file);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(AppError::io(format!(
                        "Manifest lists '{}' but the file does not exist.",
                        path.display()
                    )))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn interval(y: i32, m: u32) -> DateInterval {
        let start = NaiveDate::from_ymd_opt(y, m, 1).unwrap();
        DateInterval {
            start,
            end: start.checked_add_months(chrono::Months::new(1)).unwrap().pred_opt().unwrap(),
        }
    }

    #[test]
    fn missing_manifest_defaults_to_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(ChunkManifest::load_or_default(dir.path()).unwrap(), ChunkManifest::default());
        assert!(ChunkManifest::load(dir.path()).is_err());
    }

    #[test]
    fn record_upserts_and_orders() {
        let mut manifest = ChunkManifest::default();
        manifest.record("b.csv", &interval(2021, 2));
        manifest.record("a.csv", &interval(2021, 1));
        manifest.record("b.csv", &interval(2021, 2));
        let files: Vec<_> = manifest.chunks.iter().map(|c| c.file.as_str()).collect();
        assert_eq!(files, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut manifest = ChunkManifest::default();
        manifest.record("rescuetime_hourly_bymonth 2021-01.csv", &interval(2021, 1));
        manifest.save(dir.path()).unwrap();

        let raw = std::fs::read_to_string(ChunkManifest::path_in(dir.path())).unwrap();
        assert!(raw.contains("\"begin\": \"2021-01-01\""));
        assert_eq!(ChunkManifest::load(dir.path()).unwrap(), manifest);
    }

    #[test]
    fn truncated_manifest_is_replaced_on_download_load() {
        let dir = TempDir::new().unwrap();
        std::fs::write(ChunkManifest::path_in(dir.path()), "{\"chunks\": [").unwrap();

        assert_eq!(ChunkManifest::load_or_default(dir.path()).unwrap(), ChunkManifest::default());
        assert!(ChunkManifest::load(dir.path()).is_err());
    }

    #[test]
    fn save_leaves_no_temporary_files() {
        let dir = TempDir::new().unwrap();
        let mut manifest = ChunkManifest::default();
        manifest.record("a.csv", &interval(2021, 1));
        manifest.save(dir.path()).unwrap();
        manifest.record("b.csv", &interval(2021, 2));
        manifest.save(dir.path()).unwrap();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        assert_eq!(ChunkManifest::load(dir.path()).unwrap().chunks.len(), 2);
    }

    #[test]
    fn chunk_paths_require_existing_files() {
        let dir = TempDir::new().unwrap();
        let mut manifest = ChunkManifest::default();
        manifest.record("present.csv", &interval(2021, 1));
        std::fs::write(dir.path().join("present.csv"), "a\n1\n").unwrap();
        assert_eq!(manifest.chunk_paths(dir.path()).unwrap().len(), 1);

        manifest.record("gone.csv", &interval(2021, 2));
        let err = manifest.chunk_paths(dir.path()).unwrap_err();
        assert!(err.message().contains("gone.csv"));
    }
}
