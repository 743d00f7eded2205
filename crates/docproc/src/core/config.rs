//! Configuration loading and management.
//!
//! This module provides utilities for loading processor configuration from
//! TOML, YAML or JSON files, and for discovering a `docproc.toml` in the
//! current directory hierarchy.

use crate::types::Document;
use crate::{DocprocError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main processor configuration.
///
/// All sections are optional in files; missing fields take their defaults.
///
/// # Example
///
/// ```rust
/// use docproc::core::config::ProcessorConfig;
///
/// let config = ProcessorConfig::default();
/// assert_eq!(config.limits.max_excel_sheets, 50);
///
/// // let config = ProcessorConfig::from_toml_file("docproc.toml")?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Advisory size and time limits
    #[serde(default)]
    pub limits: ProcessingLimits,

    /// Text statistics options (PDF and Word)
    #[serde(default)]
    pub statistics: StatisticsConfig,

    /// CSV parsing options
    #[serde(default)]
    pub csv: CsvConfig,

    /// Batch processing options
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Advisory limits.
///
/// Nothing in the core aborts on these. Strategies report overruns as
/// warnings; [`check_size`](Self::check_size) is for callers that want to
/// reject oversized input up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingLimits {
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,

    #[serde(default = "default_max_processing_time")]
    pub max_processing_time_ms: u64,

    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    #[serde(default = "default_max_table_rows")]
    pub max_table_rows: usize,

    #[serde(default = "default_max_excel_sheets")]
    pub max_excel_sheets: usize,
}

impl ProcessingLimits {
    /// Reject documents larger than `max_file_size_bytes`.
    pub fn check_size(&self, document: &Document) -> Result<()> {
        let size = document.size();
        if size > self.max_file_size_bytes {
            return Err(DocprocError::validation(format!(
                "Document '{}' is {} bytes, exceeding the limit of {} bytes",
                document.name, size, self.max_file_size_bytes
            )));
        }
        Ok(())
    }
}

impl Default for ProcessingLimits {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size(),
            max_processing_time_ms: default_max_processing_time(),
            max_text_length: default_max_text_length(),
            max_table_rows: default_max_table_rows(),
            max_excel_sheets: default_max_excel_sheets(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsConfig {
    /// Compute top words, unique word count and length distribution
    #[serde(default = "default_true")]
    pub enable_word_frequency: bool,

    #[serde(default = "default_max_top_words")]
    pub max_top_words: usize,

    /// Words shorter than this (in characters) are left out of frequencies
    #[serde(default = "default_min_word_length")]
    pub min_word_length: usize,

    #[serde(default = "default_true")]
    pub enable_language_detection: bool,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            enable_word_frequency: true,
            max_top_words: default_max_top_words(),
            min_word_length: default_min_word_length(),
            enable_language_detection: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvConfig {
    /// Tried in order; the first candidate with the highest count wins
    #[serde(default = "default_delimiters")]
    pub delimiter_candidates: Vec<char>,

    /// Reported in metadata. Input is always decoded as UTF-8.
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter_candidates: default_delimiters(),
            encoding: default_encoding(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Concurrent documents in a batch (None = num_cpus * 2)
    #[serde(default)]
    pub max_concurrent: Option<usize>,
}

impl BatchConfig {
    pub fn concurrency(&self) -> usize {
        self.max_concurrent.unwrap_or_else(|| num_cpus::get() * 2).max(1)
    }
}

fn default_true() -> bool {
    true
}
fn default_max_file_size() -> u64 {
    100 * 1024 * 1024
}
fn default_max_processing_time() -> u64 {
    300_000
}
fn default_max_text_length() -> usize {
    10_000_000
}
fn default_max_table_rows() -> usize {
    100_000
}
fn default_max_excel_sheets() -> usize {
    50
}
fn default_max_top_words() -> usize {
    10
}
fn default_min_word_length() -> usize {
    3
}
fn default_delimiters() -> Vec<char> {
    vec![',', ';', '\t', '|']
}
fn default_encoding() -> String {
    "UTF-8".to_string()
}

impl ProcessorConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `DocprocError::Validation` if the file doesn't exist or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| DocprocError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| DocprocError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_json::from_str(&content)
            .map_err(|e| DocprocError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration, picking the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "toml" => Self::from_toml_file(path),
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            other => Err(DocprocError::validation(format!(
                "Unsupported config file format '{}' for {}. Use .toml, .yaml, .yml or .json",
                other,
                path.display()
            ))),
        }
    }

    /// Discover a configuration file in parent directories.
    ///
    /// Searches for `docproc.toml` in the current directory and each parent.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(DocprocError::Io)?;

        loop {
            let docproc_toml = current.join("docproc.toml");
            if docproc_toml.exists() {
                return Ok(Some(Self::from_toml_file(docproc_toml)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DocprocError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ProcessorConfig::default();
        assert_eq!(config.limits.max_file_size_bytes, 104_857_600);
        assert_eq!(config.limits.max_processing_time_ms, 300_000);
        assert_eq!(config.limits.max_text_length, 10_000_000);
        assert_eq!(config.limits.max_table_rows, 100_000);
        assert_eq!(config.limits.max_excel_sheets, 50);
        assert!(config.statistics.enable_word_frequency);
        assert_eq!(config.statistics.max_top_words, 10);
        assert_eq!(config.statistics.min_word_length, 3);
        assert_eq!(config.csv.delimiter_candidates, vec![',', ';', '\t', '|']);
        assert_eq!(config.csv.encoding, "UTF-8");
        assert!(config.batch.max_concurrent.is_none());
    }

    #[test]
    fn test_from_toml_file_partial() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("docproc.toml");

        fs::write(
            &config_path,
            r#"
[limits]
max_table_rows = 10

[statistics]
max_top_words = 5
        "#,
        )
        .unwrap();

        let config = ProcessorConfig::from_toml_file(&config_path).unwrap();
        assert_eq!(config.limits.max_table_rows, 10);
        assert_eq!(config.limits.max_excel_sheets, 50);
        assert_eq!(config.statistics.max_top_words, 5);
        assert_eq!(config.statistics.min_word_length, 3);
    }

    #[test]
    fn test_from_yaml_and_json() {
        let dir = tempdir().unwrap();

        let yaml_path = dir.path().join("docproc.yaml");
        fs::write(&yaml_path, "batch:\n  max_concurrent: 3\n").unwrap();
        let config = ProcessorConfig::from_file(&yaml_path).unwrap();
        assert_eq!(config.batch.max_concurrent, Some(3));
        assert_eq!(config.batch.concurrency(), 3);

        let json_path = dir.path().join("docproc.json");
        fs::write(&json_path, r#"{"csv": {"delimiter_candidates": [";", ","]}}"#).unwrap();
        let config = ProcessorConfig::from_file(&json_path).unwrap();
        assert_eq!(config.csv.delimiter_candidates, vec![';', ',']);
    }

    #[test]
    fn test_invalid_files_are_validation_errors() {
        let dir = tempdir().unwrap();
        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "limits = [[[").unwrap();

        assert!(matches!(
            ProcessorConfig::from_toml_file(&bad),
            Err(DocprocError::Validation { .. })
        ));
        assert!(matches!(
            ProcessorConfig::from_toml_file(dir.path().join("missing.toml")),
            Err(DocprocError::Validation { .. })
        ));
        assert!(matches!(
            ProcessorConfig::from_file(dir.path().join("config.ini")),
            Err(DocprocError::Validation { .. })
        ));
    }

    #[test]
    fn test_check_size() {
        let limits = ProcessingLimits {
            max_file_size_bytes: 4,
            ..Default::default()
        };
        assert!(limits.check_size(&Document::new("a.csv", b"abcd".to_vec())).is_ok());

        let err = limits.check_size(&Document::new("a.csv", b"abcde".to_vec())).unwrap_err();
        assert!(matches!(err, DocprocError::Validation { .. }));
        assert!(err.to_string().contains("exceeding the limit"));
    }

    #[test]
    fn test_zero_concurrency_clamped() {
        let batch = BatchConfig { max_concurrent: Some(0) };
        assert_eq!(batch.concurrency(), 1);
        assert!(BatchConfig::default().concurrency() >= 2);
    }

    #[test]
    #[serial]
    fn test_discover_docproc_toml() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("docproc.toml"), "[limits]\nmax_excel_sheets = 7\n").unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&nested).unwrap();

        let result = std::panic::catch_unwind(|| {
            let config = ProcessorConfig::discover().unwrap();
            assert_eq!(config.unwrap().limits.max_excel_sheets, 7);
        });

        std::env::set_current_dir(&original_dir).unwrap();

        if let Err(e) = result {
            std::panic::resume_unwind(e);
        }
    }
}
