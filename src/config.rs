use crate::errors::{Result, ScannerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Scan configuration, loadable from a YAML or JSON file.
///
/// The CLI is the usual front end; a config file carries the defaults for
/// repeated runs (root patterns, excludes, artifact locations). Explicit
/// CLI arguments always win over file values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Root directory patterns to scan (glob wildcards allowed)
    pub roots: Vec<String>,

    /// Patterns to exclude from scanning
    pub exclude: Vec<String>,

    /// Safelist artifact path
    pub output: Option<PathBuf>,

    /// Scan report path (JSON)
    pub report: Option<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            exclude: Vec::new(),
            output: None,
            report: None,
        }
    }
}

impl ScanConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ScannerError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        serde_yaml::from_str(&content).map_err(|e| ScannerError::ConfigError {
            message: format!("Failed to parse YAML config: {}", e),
        })
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ScannerError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        serde_json::from_str(&content).map_err(|e| ScannerError::ConfigError {
            message: format!("Failed to parse JSON config: {}", e),
        })
    }

    /// Load configuration from a file (auto-detect format)
    pub fn from_file(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(ScannerError::ConfigError {
                message: format!(
                    "Unsupported config file format: {}. Use .yaml, .yml, or .json",
                    path.display()
                ),
            }),
        }
    }

    /// Merge with another configuration; values in `other` take precedence
    /// where present, and list values are appended without duplicates.
    pub fn merge(mut self, other: Self) -> Self {
        for root in other.roots {
            if !self.roots.contains(&root) {
                self.roots.push(root);
            }
        }

        for pattern in other.exclude {
            if !self.exclude.contains(&pattern) {
                self.exclude.push(pattern);
            }
        }

        if other.output.is_some() {
            self.output = other.output;
        }
        if other.report.is_some() {
            self.report = other.report;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert!(config.roots.is_empty());
        assert!(config.output.is_none());
    }

    #[test]
    fn test_yaml_config_loading() {
        let yaml_content = r##"
roots:
  - "themes/*/templates"
  - "plugins/builder/src"
exclude:
  - "**/node_modules/**"
output: "safelist/extracted_classes.txt"
"##;

        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(yaml_content.as_bytes()).unwrap();

        let config = ScanConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.roots.len(), 2);
        assert_eq!(config.exclude, vec!["**/node_modules/**".to_string()]);
        assert_eq!(
            config.output,
            Some(PathBuf::from("safelist/extracted_classes.txt"))
        );
    }

    #[test]
    fn test_json_config_loading() {
        let json_content = r##"{
  "roots": ["site/templates"],
  "report": "scan-report.json"
}"##;

        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(json_content.as_bytes()).unwrap();

        let config = ScanConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.roots.len(), 1);
        assert_eq!(config.report, Some(PathBuf::from("scan-report.json")));
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let result = ScanConfig::from_file(Path::new("config.toml"));
        assert!(matches!(result, Err(ScannerError::ConfigError { .. })));
    }

    #[test]
    fn test_config_merge() {
        let base = ScanConfig {
            roots: vec!["a".to_string()],
            exclude: vec!["x".to_string()],
            output: Some(PathBuf::from("base.txt")),
            report: None,
        };

        let other = ScanConfig {
            roots: vec!["a".to_string(), "b".to_string()],
            exclude: vec![],
            output: None,
            report: Some(PathBuf::from("report.json")),
        };

        let merged = base.merge(other);
        assert_eq!(merged.roots, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(merged.output, Some(PathBuf::from("base.txt")));
        assert_eq!(merged.report, Some(PathBuf::from("report.json")));
    }
}
