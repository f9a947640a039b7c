//! Safelist injection into a content payload.
//!
//! The injector is a stateless transform registered by the host build
//! pipeline: given an opaque content string, it appends one marker element
//! carrying every persisted class so a downstream CSS purge step sees them
//! all as "used".

use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::safelist;

/// Appends the persisted safelist to content payloads.
///
/// Construct one per artifact path and register it with whatever pipeline
/// compiles the payload. `inject` is deterministic for a fixed artifact,
/// but applying it twice to its own output appends the fragment twice;
/// callers invoke it at most once per compilation pass.
#[derive(Debug, Clone)]
pub struct Injector {
    safelist_path: PathBuf,
}

impl Injector {
    pub fn new(safelist_path: impl Into<PathBuf>) -> Self {
        Self {
            safelist_path: safelist_path.into(),
        }
    }

    pub fn safelist_path(&self) -> &Path {
        &self.safelist_path
    }

    /// Load the persisted safelist and append it to `content`.
    ///
    /// If the artifact is absent or normalizes to an empty string, the
    /// content is returned unchanged, byte for byte.
    pub fn inject(&self, content: &str) -> Result<String> {
        let raw = safelist::load(&self.safelist_path)?;
        Ok(inject_classes(content, &raw))
    }
}

/// Append a `<div class="...">` fragment carrying every token in
/// `raw_safelist` to `content`. Pure function over its two inputs.
pub fn inject_classes(content: &str, raw_safelist: &str) -> String {
    let classes = safelist::normalize(raw_safelist);
    if classes.is_empty() {
        return content.to_string();
    }

    format!("{content}<div class=\"{classes}\"></div>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_safelist_is_a_no_op() {
        assert_eq!(inject_classes("<body></body>", ""), "<body></body>");
        assert_eq!(inject_classes("X", " \n \n "), "X");
    }

    #[test]
    fn test_fragment_is_appended() {
        let out = inject_classes("X", "a\nb\nc");
        assert_eq!(out, "X<div class=\"a b c\"></div>");
    }

    #[test]
    fn test_whitespace_runs_collapse_in_fragment() {
        let out = inject_classes("", "a\n\n  b");
        assert_eq!(out, "<div class=\"a b\"></div>");
    }

    #[test]
    fn test_double_application_appends_twice() {
        let once = inject_classes("X", "a");
        let twice = inject_classes(&once, "a");
        assert_eq!(twice, "X<div class=\"a\"></div><div class=\"a\"></div>");
    }

    #[test]
    fn test_injector_with_absent_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let injector = Injector::new(dir.path().join("missing.txt"));
        assert_eq!(injector.inject("payload").unwrap(), "payload");
    }
}
