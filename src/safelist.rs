//! Safelist persistence round-trip.
//!
//! The artifact is a plain text file, one class token per line, fully
//! overwritten on every scan. No schema, no versioning. It is the only
//! state that survives across invocations.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use crate::errors::{Result, ScannerError};

/// Serialize the token set as newline-joined lines and atomically replace
/// the artifact. Sorted iteration of the set keeps the file deterministic.
pub fn persist(path: &Path, classes: &BTreeSet<String>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| ScannerError::OutputError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        }
    }

    let content = classes.iter().cloned().collect::<Vec<_>>().join("\n");
    write_atomic(path, &content).map_err(|e| ScannerError::OutputError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Read the raw artifact. An absent file is not an error: it means no
/// scan has run yet, so there are no classes to inject.
pub fn load(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

/// Flatten a raw safelist to a single space-separated string: newlines
/// become spaces, whitespace runs collapse, edges are trimmed.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Write file atomically by writing to temp file then renaming, so a
/// concurrent reader never observes a partial artifact.
pub(crate) fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let temp_path = path.with_extension("tmp");

    let mut file = std::fs::File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    std::fs::rename(&temp_path, path)?;

    Ok(())
}
