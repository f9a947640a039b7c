//! Class attribute extraction.
//!
//! A single regex pass over raw file bytes; no HTML parsing, no selector
//! understanding, no class-name validation. Attributes with unusual quoting
//! or dynamically constructed values are an accepted blind spot.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::bytes::Regex;

/// Matches `class="..."` / `class='...'` and captures the attribute value.
static CLASS_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"class=["']([^"']+)["']"#).unwrap());

/// Classes found in a single file.
#[derive(Debug, Clone)]
pub struct FileClasses {
    pub path: PathBuf,
    pub classes: BTreeSet<String>,
}

/// A file that was skipped during extraction, with the reason.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Extract class tokens from raw content.
///
/// Every captured attribute value is split on whitespace runs, so a value
/// like `"a  b"` yields `{a, b}` and never an empty token. Captures are
/// decoded lossily; non-UTF-8 files still contribute whatever ASCII class
/// attributes they contain.
pub fn extract_classes_from_bytes(content: &[u8]) -> BTreeSet<String> {
    let mut classes = BTreeSet::new();

    for caps in CLASS_ATTR.captures_iter(content) {
        let value = String::from_utf8_lossy(&caps[1]);
        for token in value.split_whitespace() {
            classes.insert(token.to_string());
        }
    }

    classes
}

/// Read a file and extract its class tokens.
pub fn extract_classes_from_file(path: &Path) -> std::io::Result<BTreeSet<String>> {
    let content = std::fs::read(path)?;
    Ok(extract_classes_from_bytes(&content))
}

/// Extract class tokens from many files in parallel.
///
/// Unreadable files are skipped and reported, never fatal: one bad file
/// must not abort a scan over a large tree.
pub fn extract_classes_parallel(
    files: &[PathBuf],
    jobs: Option<usize>,
) -> (Vec<FileClasses>, Vec<SkippedFile>) {
    use rayon::prelude::*;

    // Try to build the global thread pool, but ignore if already initialized
    if let Some(num_jobs) = jobs {
        let _ = rayon::ThreadPoolBuilder::new()
            .num_threads(num_jobs)
            .build_global();
    }

    let results: Vec<std::result::Result<FileClasses, SkippedFile>> = files
        .par_iter()
        .map(|path| match extract_classes_from_file(path) {
            Ok(classes) => Ok(FileClasses {
                path: path.clone(),
                classes,
            }),
            Err(e) => Err(SkippedFile {
                path: path.clone(),
                reason: e.to_string(),
            }),
        })
        .collect();

    let mut extracted = Vec::new();
    let mut skipped = Vec::new();
    for result in results {
        match result {
            Ok(file_classes) => extracted.push(file_classes),
            Err(skip) => skipped.push(skip),
        }
    }

    (extracted, skipped)
}

/// Merge per-file results into a single deduplicated token set.
pub fn merge_classes(extracted: &[FileClasses]) -> BTreeSet<String> {
    let mut merged = BTreeSet::new();
    for file_classes in extracted {
        merged.extend(file_classes.classes.iter().cloned());
    }
    merged
}
