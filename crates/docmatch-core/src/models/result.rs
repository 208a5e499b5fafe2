//! Comparison results and batch summary models.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matching::DiffReport;
use crate::models::document::display_name;

/// Terminal classification of a target document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// A template matched on presence, content and structure.
    Matched,
    /// Every template was tried without a match.
    Unmatched,
}

impl Classification {
    /// Lowercase label for status lines and CSV output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Matched => "matched",
            Classification::Unmatched => "unmatched",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A template/target pair that could not be scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPair {
    /// Template that was skipped.
    pub template: PathBuf,
    /// Why it was skipped.
    pub reason: String,
}

/// Retained outcome for one target document.
///
/// The metrics are those of the last template actually compared, which for
/// a matched target is the winning template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Target document.
    pub target_id: PathBuf,
    /// Winning template, if any.
    pub template_id: Option<PathBuf>,
    /// Template the metrics below were computed against.
    pub compared_template: Option<PathBuf>,
    /// Fraction of template terms present in the target (0.0 - 1.0).
    pub content_accuracy: f64,
    /// Ground-truth template presence (0.0 or 1.0).
    pub template_presence: f64,
    /// Whether table counts were equal.
    pub tables_match: bool,
    /// Terminal classification.
    pub classification: Classification,
    /// Pairs skipped while searching.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedPair>,
}

impl ComparisonResult {
    /// Target file name.
    pub fn target_name(&self) -> String {
        display_name(&self.target_id)
    }

    /// Whether the target matched a template.
    pub fn is_matched(&self) -> bool {
        self.classification == Classification::Matched
    }

    /// Content accuracy as a percentage.
    pub fn content_match_pct(&self) -> f64 {
        self.content_accuracy * 100.0
    }

    /// Content mismatch as a percentage.
    pub fn content_mismatch_pct(&self) -> f64 {
        (1.0 - self.content_accuracy) * 100.0
    }

    /// Template presence as a percentage.
    pub fn template_match_pct(&self) -> f64 {
        self.template_presence * 100.0
    }

    /// Results table row for this target.
    pub fn row(&self) -> ResultRow {
        ResultRow {
            target: self.target_name(),
            template_match_pct: self.template_match_pct(),
            content_mismatch_pct: self.content_mismatch_pct(),
        }
    }
}

/// One row of the results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub target: String,
    pub template_match_pct: f64,
    pub content_mismatch_pct: f64,
}

/// A target that could not be processed at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetFailure {
    /// Target document.
    pub target: PathBuf,
    /// Error message.
    pub error: String,
}

/// Diff of an unmatched target against the last template compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDiff {
    pub target: PathBuf,
    pub template: PathBuf,
    pub content_accuracy: f64,
    pub template_presence: f64,
    pub report: DiffReport,
}

impl TargetDiff {
    /// Target file name.
    pub fn target_name(&self) -> String {
        display_name(&self.target)
    }
}

/// Aggregated results of a batch run, in target processing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// When the batch started.
    pub generated_at: DateTime<Utc>,
    /// One result per processed target.
    pub results: Vec<ComparisonResult>,
    /// Targets that failed before any comparison.
    pub failures: Vec<TargetFailure>,
    /// Diffs for unmatched targets.
    pub diffs: Vec<TargetDiff>,
}

impl BatchSummary {
    /// Create an empty summary.
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            results: Vec::new(),
            failures: Vec::new(),
            diffs: Vec::new(),
        }
    }

    /// Number of matched targets.
    pub fn matched_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_matched()).count()
    }

    /// Number of unmatched targets.
    pub fn unmatched_count(&self) -> usize {
        self.results.len() - self.matched_count()
    }

    /// Sum of content match percentages across targets.
    pub fn total_content_match_pct(&self) -> f64 {
        self.results.iter().map(|r| r.content_match_pct()).sum()
    }

    /// Sum of template match percentages across targets.
    pub fn total_template_match_pct(&self) -> f64 {
        self.results.iter().map(|r| r.template_match_pct()).sum()
    }

    /// Mean content match percentage, 0 for an empty batch.
    pub fn mean_content_match_pct(&self) -> f64 {
        mean(self.total_content_match_pct(), self.results.len())
    }

    /// Mean template match percentage, 0 for an empty batch.
    pub fn mean_template_match_pct(&self) -> f64 {
        mean(self.total_template_match_pct(), self.results.len())
    }

    /// Results table rows.
    pub fn rows(&self) -> Vec<ResultRow> {
        self.results.iter().map(ComparisonResult::row).collect()
    }

    /// Diff recorded for a target, if any.
    pub fn diff_for(&self, target: &std::path::Path) -> Option<&TargetDiff> {
        self.diffs.iter().find(|d| d.target == target)
    }
}

impl Default for BatchSummary {
    fn default() -> Self {
        Self::new()
    }
}

fn mean(total: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn result(name: &str, accuracy: f64, presence: f64, matched: bool) -> ComparisonResult {
        ComparisonResult {
            target_id: PathBuf::from(format!("targets/{}", name)),
            template_id: matched.then(|| PathBuf::from("templates/a.pdf")),
            compared_template: Some(PathBuf::from("templates/a.pdf")),
            content_accuracy: accuracy,
            template_presence: presence,
            tables_match: true,
            classification: if matched {
                Classification::Matched
            } else {
                Classification::Unmatched
            },
            skipped: Vec::new(),
        }
    }

    #[test]
    fn test_row_percentages() {
        let row = result("b.pdf", 0.5, 1.0, false).row();
        assert_eq!(
            row,
            ResultRow {
                target: "b.pdf".to_string(),
                template_match_pct: 100.0,
                content_mismatch_pct: 50.0,
            }
        );
    }

    #[test]
    fn test_aggregates() {
        let mut summary = BatchSummary::new();
        summary.results.push(result("a.pdf", 1.0, 1.0, true));
        summary.results.push(result("b.pdf", 0.5, 1.0, false));

        assert_eq!(summary.matched_count(), 1);
        assert_eq!(summary.unmatched_count(), 1);
        assert_eq!(summary.total_content_match_pct(), 150.0);
        assert_eq!(summary.total_template_match_pct(), 200.0);
        assert_eq!(summary.mean_content_match_pct(), 75.0);
        assert_eq!(summary.mean_template_match_pct(), 100.0);
    }

    #[test]
    fn test_empty_summary_means() {
        let summary = BatchSummary::default();
        assert_eq!(summary.mean_content_match_pct(), 0.0);
        assert!(summary.rows().is_empty());
    }

    #[test]
    fn test_classification_serializes_uppercase() {
        let json = serde_json::to_string(&Classification::Unmatched).unwrap();
        assert_eq!(json, "\"UNMATCHED\"");
    }
}
