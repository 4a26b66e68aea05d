//! Atomic output files.
//!
//! Reports are rendered in memory and then written through a temporary file
//! in the destination directory that is renamed over the target. A failed
//! run never leaves a truncated report behind.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{ReportError, Result};

/// Write `contents` to `path`, replacing any existing file
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(dir).map_err(|e| ReportError::write(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ReportError::write(path, e))?;
    tmp.write_all(contents).map_err(|e| ReportError::write(path, e))?;
    tmp.as_file().sync_all().map_err(|e| ReportError::write(path, e))?;
    tmp.persist(path).map_err(|e| ReportError::write(path, e.error))?;

    log::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
