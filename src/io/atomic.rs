//! Replace-on-success file writes.
//!
//! Output goes to a temporary file next to the destination and is renamed over
//! it only once everything was written and flushed. A failed or abandoned write
//! leaves the previous file untouched; the temporary file is removed on drop.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::AppError;

pub struct AtomicFile {
    writer: BufWriter<NamedTempFile>,
    final_path: PathBuf,
}

impl AtomicFile {
    pub fn new(final_path: &Path) -> Result<Self, AppError> {
        let parent = match final_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(parent).map_err(|e| {
            AppError::io(format!(
                "Failed to create temporary file for '{}': {e}",
                final_path.display()
            ))
        })?;
        Ok(Self {
            writer: BufWriter::new(temp),
            final_path: final_path.to_path_buf(),
        })
    }

    /// Flush and move the temporary file onto the destination.
    pub fn finish(self) -> Result<PathBuf, AppError> {
        let temp = self.writer.into_inner().map_err(|e| {
            AppError::io(format!("Failed to flush '{}': {}", self.final_path.display(), e.error()))
        })?;
        temp.persist(&self.final_path).map_err(|e| {
            AppError::io(format!("Failed to replace '{}': {}", self.final_path.display(), e.error))
        })?;
        Ok(self.final_path)
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}
