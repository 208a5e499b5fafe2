//! Configuration structures for a matching run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};
use crate::matching::{ColorPolicy, ThresholdPolicy};

/// Main configuration for a docmatch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Batch inputs, destinations and decision policy.
    pub batch: BatchConfig,

    /// Content extraction configuration.
    pub extraction: ExtractionConfig,

    /// Report output configuration.
    pub report: ReportConfig,
}

/// Batch-level configuration surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Folder holding reference templates.
    pub template_dir: PathBuf,

    /// Folder holding documents to classify.
    pub target_dir: PathBuf,

    /// Ground truth: a template is assumed to apply to every target.
    pub template_present: bool,

    /// Content accuracy threshold (0.0 - 1.0).
    pub match_threshold: f64,

    /// Use `match_threshold` in the decision instead of requiring 1.0.
    pub apply_threshold: bool,

    /// Destination for matched targets and the batch report.
    pub result_dir: PathBuf,

    /// Destination for unmatched targets and their diff documents.
    pub rejected_dir: PathBuf,

    /// File extensions (lowercase, without dot) picked up from the folders.
    pub extensions: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("templates"),
            target_dir: PathBuf::from("targets"),
            template_present: true,
            match_threshold: 0.9,
            apply_threshold: false,
            result_dir: PathBuf::from("results"),
            rejected_dir: PathBuf::from("rejected"),
            extensions: vec!["pdf".to_string(), "txt".to_string()],
        }
    }
}

impl BatchConfig {
    /// Decision rule selected by this configuration.
    pub fn threshold_policy(&self) -> ThresholdPolicy {
        if self.apply_threshold {
            ThresholdPolicy::AtLeast(self.match_threshold)
        } else {
            ThresholdPolicy::Exact
        }
    }

    /// Whether a path carries one of the configured extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
    }
}

/// Content extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Table detection heuristics.
    pub table: TableConfig,

    /// Separator inserted between PDF pages.
    pub page_separator: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            table: TableConfig::default(),
            page_separator: "\n".to_string(),
        }
    }
}

/// Heuristics for counting tabular regions in extracted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Consecutive tabular lines needed to form a table.
    pub min_rows: usize,

    /// Cells a line needs to count as tabular.
    pub min_columns: usize,

    /// Run of spaces that separates two cells.
    pub min_column_gap: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            min_column_gap: 2,
        }
    }
}

/// Report output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Write DOCX documents (batch report and per-target diffs).
    pub write_docx: bool,

    /// Rasterise bar and pie charts.
    pub write_charts: bool,

    /// Write `summary.csv`.
    pub write_csv: bool,

    /// Write `summary.json`.
    pub write_json: bool,

    /// Write a unified `.diff` next to each diff document.
    pub write_unified_diff: bool,

    /// Context lines around unified diff hunks.
    pub diff_context: usize,

    /// Coloring of the "Added" rows in diff documents.
    pub added_row_policy: ColorPolicy,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            write_docx: true,
            write_charts: true,
            write_csv: true,
            write_json: true,
            write_unified_diff: true,
            diff_context: 3,
            added_row_policy: ColorPolicy::default(),
        }
    }
}

impl MatchConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| MatchError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| MatchError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.batch.match_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(MatchError::Config(format!(
                "match_threshold must be within 0.0 - 1.0, got {}",
                threshold
            )));
        }
        if self.batch.extensions.is_empty() {
            return Err(MatchError::Config("extensions must not be empty".to_string()));
        }
        if self.extraction.table.min_rows == 0 {
            return Err(MatchError::Config("table.min_rows must be at least 1".to_string()));
        }
        if self.extraction.table.min_columns < 2 {
            return Err(MatchError::Config("table.min_columns must be at least 2".to_string()));
        }
        if self.extraction.table.min_column_gap == 0 {
            return Err(MatchError::Config(
                "table.min_column_gap must be at least 1".to_string(),
            ));
        }
        if let ColorPolicy::AccuracyBanded { warn_at } = self.report.added_row_policy {
            if !(0.0..=1.0).contains(&warn_at) {
                return Err(MatchError::Config(format!(
                    "added_row_policy.warn_at must be within 0.0 - 1.0, got {}",
                    warn_at
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        let config = MatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch.threshold_policy(), ThresholdPolicy::Exact);
    }

    #[test]
    fn test_apply_threshold_selects_at_least() {
        let mut config = MatchConfig::default();
        config.batch.apply_threshold = true;
        config.batch.match_threshold = 0.75;
        assert_eq!(config.batch.threshold_policy(), ThresholdPolicy::AtLeast(0.75));
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let mut config = MatchConfig::default();
        config.batch.match_threshold = 1.5;
        assert!(matches!(config.validate(), Err(MatchError::Config(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: MatchConfig =
            serde_json::from_str(r#"{"batch": {"template_present": false}}"#).unwrap();
        assert!(!config.batch.template_present);
        assert_eq!(config.batch.match_threshold, 0.9);
        assert_eq!(config.extraction.table.min_rows, 2);
    }

    #[test]
    fn test_accepts_extension_case_insensitive() {
        let batch = BatchConfig::default();
        assert!(batch.accepts(Path::new("a/INVOICE.PDF")));
        assert!(batch.accepts(Path::new("b.txt")));
        assert!(!batch.accepts(Path::new("c.docx")));
        assert!(!batch.accepts(Path::new("README")));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = MatchConfig::default();
        config.report.diff_context = 1;
        config.save(&path).unwrap();

        let loaded = MatchConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
