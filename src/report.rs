use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata for the generated scan report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Version of the report format
    pub version: String,

    /// Timestamp when the report was generated
    pub generated_at: DateTime<Utc>,

    /// Number of files scanned
    pub files_scanned: usize,

    /// Number of unique class tokens extracted
    pub classes_extracted: usize,

    /// Scanner version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanner_version: Option<String>,
}

/// Statistics about the scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportStatistics {
    /// Safelist artifact size in bytes
    pub safelist_size_bytes: usize,

    /// Number of files actually containing class attributes
    pub files_with_classes: usize,

    /// Number of files skipped (unreadable or rejected by policy)
    pub files_skipped: usize,

    /// Processing time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,

    /// Most widely used classes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_classes: Option<Vec<TopClass>>,
}

/// A class ranked by how many files it appears in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopClass {
    pub name: String,
    pub file_count: usize,
}

/// Complete scan report structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Metadata about the scan
    pub metadata: ReportMetadata,

    /// Map of class names to the files they were found in
    pub classes: IndexMap<String, Vec<String>>,

    /// Statistics about the scan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<ReportStatistics>,
}

impl ScanReport {
    pub fn new() -> Self {
        Self {
            metadata: ReportMetadata {
                version: "1.0.0".to_string(),
                generated_at: Utc::now(),
                files_scanned: 0,
                classes_extracted: 0,
                scanner_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            },
            classes: IndexMap::new(),
            statistics: None,
        }
    }

    /// Record that a class was seen in a file.
    pub fn add_class(&mut self, class_name: String, file_path: String) {
        let files = self.classes.entry(class_name).or_insert_with(Vec::new);
        if !files.contains(&file_path) {
            files.push(file_path);
        }
    }

    /// Calculate and set statistics from the recorded classes.
    pub fn calculate_statistics(
        &mut self,
        safelist_size: usize,
        files_skipped: usize,
        processing_time_ms: Option<u64>,
    ) {
        let mut files_with_classes = std::collections::HashSet::new();
        for files in self.classes.values() {
            for file in files {
                files_with_classes.insert(file.as_str());
            }
        }

        let mut ranked: Vec<_> = self
            .classes
            .iter()
            .map(|(name, files)| TopClass {
                name: name.clone(),
                file_count: files.len(),
            })
            .collect();
        ranked.sort_by(|a, b| b.file_count.cmp(&a.file_count));
        let top_classes = ranked.into_iter().take(10).collect();

        self.statistics = Some(ReportStatistics {
            safelist_size_bytes: safelist_size,
            files_with_classes: files_with_classes.len(),
            files_skipped,
            processing_time_ms,
            top_classes: Some(top_classes),
        });
    }

    /// Convert report to JSON value
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }

    /// Convert report to pretty JSON string
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for ScanReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder pattern for creating scan reports
pub struct ReportBuilder {
    report: ScanReport,
    start_time: Option<std::time::Instant>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self {
            report: ScanReport::new(),
            start_time: Some(std::time::Instant::now()),
        }
    }

    /// Set the number of files scanned
    pub fn with_files_scanned(mut self, count: usize) -> Self {
        self.report.metadata.files_scanned = count;
        self
    }

    /// Set the number of classes extracted
    pub fn with_classes_extracted(mut self, count: usize) -> Self {
        self.report.metadata.classes_extracted = count;
        self
    }

    /// Add class-to-files information
    pub fn with_class_info(mut self, classes: IndexMap<String, Vec<String>>) -> Self {
        for (class_name, files) in classes {
            self.report.classes.insert(class_name, files);
        }
        self
    }

    /// Build the final report with statistics
    pub fn build(mut self, safelist_size: usize, files_skipped: usize) -> ScanReport {
        let processing_time = self.start_time.map(|t| t.elapsed().as_millis() as u64);
        self.report
            .calculate_statistics(safelist_size, files_skipped, processing_time);
        self.report
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}
