//! Result exporter resolution and validation.
//!
//! Locates the simulator's `opp_scavetool` and checks that it can be run.

use std::path::{Path, PathBuf};
use std::os::unix::fs::PermissionsExt;

/// Name of the result exporter shipped with OMNeT++
pub const SCAVETOOL: &str = "opp_scavetool";

/// Install locations checked before falling back to `PATH`
const KNOWN_BIN_DIRS: &[&str] = &["/opt/omnetpp/bin", "/root/omnetpp/bin"];

/// Errors that can occur during binary resolution or validation
#[derive(Debug, thiserror::Error)]
pub enum BinaryError {
    #[error("Binary not found: {path}")]
    NotFound { path: String },

    #[error("Binary is not executable: {path}")]
    NotExecutable { path: String },

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },
}

/// Resolve the exporter to run.
///
/// Resolution rules:
/// 1. An explicit path is used as-is and must exist and be executable
/// 2. Otherwise the first executable `opp_scavetool` in the known install dirs
/// 3. Otherwise the bare name, left to the OS `PATH` lookup
///
/// # Examples
///
/// ```ignore
/// resolve_scavetool(Some(Path::new("/opt/omnetpp-6.0/bin/opp_scavetool")))
///     -> /opt/omnetpp-6.0/bin/opp_scavetool
/// resolve_scavetool(None) -> /opt/omnetpp/bin/opp_scavetool  // if installed there
/// resolve_scavetool(None) -> opp_scavetool                    // otherwise
/// ```
pub fn resolve_scavetool(explicit: Option<&Path>) -> Result<PathBuf, BinaryError> {
    if let Some(path) = explicit {
        validate_binary(path)?;
        return Ok(path.to_path_buf());
    }

    resolve_in_dirs(SCAVETOOL, KNOWN_BIN_DIRS.iter().map(Path::new))
}

/// First executable `name` found in `dirs`, else the bare name
fn resolve_in_dirs<'a>(
    name: &str,
    dirs: impl IntoIterator<Item = &'a Path>,
) -> Result<PathBuf, BinaryError> {
    for dir in dirs {
        let candidate = dir.join(name);
        if validate_binary(&candidate).is_ok() {
            log::debug!("Found {} at {}", name, candidate.display());
            return Ok(candidate);
        }
    }

    log::debug!("{} not found in known install dirs, relying on PATH", name);
    Ok(PathBuf::from(name))
}

/// Validate that a binary exists and is executable.
pub fn validate_binary(path: &Path) -> Result<(), BinaryError> {
    if !path.exists() {
        return Err(BinaryError::NotFound {
            path: path.display().to_string(),
        });
    }

    let metadata = path.metadata().map_err(|_| BinaryError::InvalidPath {
        path: path.display().to_string(),
    })?;

    if !metadata.is_file() {
        return Err(BinaryError::InvalidPath {
            path: path.display().to_string(),
        });
    }

    // Check if file is executable (any execute bit set)
    let mode = metadata.permissions().mode();
    if mode & 0o111 == 0 {
        return Err(BinaryError::NotExecutable {
            path: path.display().to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn test_explicit_missing() {
        let result = resolve_scavetool(Some(Path::new("/nonexistent/opp_scavetool")));
        assert!(matches!(result, Err(BinaryError::NotFound { .. })));
    }

    #[test]
    fn test_explicit_not_executable() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), SCAVETOOL, 0o644);
        assert!(matches!(
            resolve_scavetool(Some(&path)),
            Err(BinaryError::NotExecutable { .. })
        ));
    }

    #[test]
    fn test_explicit_executable() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), SCAVETOOL, 0o755);
        assert_eq!(resolve_scavetool(Some(&path)).unwrap(), path);
    }

    #[test]
    fn test_search_dirs_then_bare_name() {
        let empty = tempfile::tempdir().unwrap();
        let installed = tempfile::tempdir().unwrap();
        let tool = touch(installed.path(), SCAVETOOL, 0o755);

        let found = resolve_in_dirs(SCAVETOOL, [empty.path(), installed.path()]).unwrap();
        assert_eq!(found, tool);

        let fallback = resolve_in_dirs(SCAVETOOL, [empty.path()]).unwrap();
        assert_eq!(fallback, PathBuf::from(SCAVETOOL));
    }
}
