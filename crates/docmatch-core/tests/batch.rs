//! Batch runs over real folders of plain-text documents.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use docmatch_core::batch::{
    list_documents, process, BatchAggregator, CopyRelocator, Destinations, FileRelocator,
};
use docmatch_core::error::MatchError;
use docmatch_core::extract::DocumentExtractor;
use docmatch_core::matching::{DiffTag, MatchDecisionEngine, ThresholdPolicy};
use docmatch_core::models::{BatchConfig, Classification, ReportConfig};
use docmatch_core::report::{FileReportRenderer, ReportRenderer};

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("templates")).unwrap();
        fs::create_dir_all(dir.path().join("targets")).unwrap();
        Self { dir }
    }

    fn template(&self, name: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join("templates").join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn target(&self, name: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join("targets").join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn destinations(&self) -> Destinations {
        Destinations::new(self.path("results"), self.path("rejected"))
    }

    fn listed(&self, folder: &str) -> Vec<PathBuf> {
        list_documents(&self.path(folder), &BatchConfig::default()).unwrap()
    }
}

fn name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}

#[test]
fn test_identical_target_is_matched_and_confirmed() {
    let ws = Workspace::new();
    ws.template("invoice.txt", "invoice\nnumber\ndate\ntotal");
    ws.target("a.txt", "invoice\nnumber\ndate\ntotal");

    let summary = process(&ws.listed("templates"), &ws.listed("targets"), true, &ws.destinations()).unwrap();

    assert_eq!(summary.results.len(), 1);
    let result = &summary.results[0];
    assert_eq!(result.classification, Classification::Matched);
    assert_eq!(result.content_accuracy, 1.0);
    assert_eq!(result.template_presence, 1.0);
    assert!(result.tables_match);
    assert_eq!(result.template_id.as_deref().map(name), Some("invoice.txt".to_string()));

    assert!(ws.path("results/a.txt").exists());
    assert!(!ws.path("rejected/a.txt").exists());
    assert!(summary.diffs.is_empty());
}

#[test]
fn test_partial_target_is_rejected_with_diff() {
    let ws = Workspace::new();
    ws.template("invoice.txt", "invoice\nnumber\ndate\ntotal");
    let target = ws.target("b.txt", "invoice\nnumber");

    let summary = process(&ws.listed("templates"), &ws.listed("targets"), true, &ws.destinations()).unwrap();

    let result = &summary.results[0];
    assert_eq!(result.classification, Classification::Unmatched);
    assert_eq!(result.content_accuracy, 0.5);
    assert_eq!(result.template_id, None);
    assert_eq!(result.compared_template.as_deref().map(name), Some("invoice.txt".to_string()));
    assert!(ws.path("rejected/b.txt").exists());

    let diff = summary.diff_for(&target).unwrap();
    assert_eq!(diff.report.removed_count(), 2);
    assert_eq!(diff.report.added_count(), 0);
    let removed: Vec<&str> = diff
        .report
        .tagged(DiffTag::Removed)
        .map(|l| l.text.as_str())
        .collect();
    assert_eq!(removed, vec!["date", "total"]);
}

#[test]
fn test_targets_processed_in_file_name_order() {
    let ws = Workspace::new();
    ws.template("t.txt", "alpha beta");
    ws.target("b.txt", "alpha");
    ws.target("a.txt", "alpha beta");

    let summary = process(&ws.listed("templates"), &ws.listed("targets"), true, &ws.destinations()).unwrap();

    let names: Vec<String> = summary.results.iter().map(|r| r.target_name()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    assert_eq!(summary.matched_count(), 1);
    assert_eq!(summary.unmatched_count(), 1);
    assert_eq!(summary.total_content_match_pct(), 150.0);
    assert_eq!(summary.mean_content_match_pct(), 75.0);
}

#[test]
fn test_unreadable_target_does_not_stop_batch() {
    let ws = Workspace::new();
    ws.template("t.txt", "alpha beta");
    ws.target("broken.pdf", "%PDF-1.4 garbage");
    ws.target("good.txt", "alpha beta");

    let summary = process(&ws.listed("templates"), &ws.listed("targets"), true, &ws.destinations()).unwrap();

    assert_eq!(summary.failures.len(), 1);
    assert_eq!(name(&summary.failures[0].target), "broken.pdf");
    assert_eq!(summary.results.len(), 1);
    assert_eq!(summary.results[0].classification, Classification::Matched);
    assert!(!ws.path("results/broken.pdf").exists());
    assert!(!ws.path("rejected/broken.pdf").exists());
}

#[test]
fn test_first_matching_template_wins() {
    let ws = Workspace::new();
    ws.template("a_first.txt", "alpha beta");
    ws.template("b_second.txt", "alpha beta");
    ws.template("c_third.txt", "gamma");
    ws.target("x.txt", "alpha beta");
    ws.target("y.txt", "alpha beta");

    let engine = MatchDecisionEngine::new(true, ThresholdPolicy::Exact);
    let mut aggregator = BatchAggregator::new(DocumentExtractor::default(), engine, CopyRelocator);
    let summary = aggregator
        .process(&ws.listed("templates"), &ws.listed("targets"), &ws.destinations())
        .unwrap();

    for result in &summary.results {
        assert_eq!(result.template_id.as_deref().map(name), Some("a_first.txt".to_string()));
    }
    // Later templates are never read once the first one matches
    assert!(!aggregator.cache().contains(&ws.path("templates/b_second.txt")));
    // The template is extracted once and reused for the second target
    assert_eq!(aggregator.cache().hits(), 1);
}

#[test]
fn test_absent_ground_truth_never_matches() {
    let ws = Workspace::new();
    ws.template("t.txt", "alpha beta");
    ws.target("a.txt", "alpha beta");

    let summary = process(&ws.listed("templates"), &ws.listed("targets"), false, &ws.destinations()).unwrap();

    let result = &summary.results[0];
    assert_eq!(result.classification, Classification::Unmatched);
    assert_eq!(result.content_accuracy, 0.0);
    assert_eq!(result.template_presence, 0.0);
    assert!(ws.path("rejected/a.txt").exists());
}

#[test]
fn test_table_mismatch_rejects_identical_words() {
    let ws = Workspace::new();
    ws.template("t.txt", "Item  Qty\nPen   2\nInk   4");
    ws.target("a.txt", "Item Qty Pen 2 Ink 4");

    let summary = process(&ws.listed("templates"), &ws.listed("targets"), true, &ws.destinations()).unwrap();

    let result = &summary.results[0];
    assert_eq!(result.content_accuracy, 1.0);
    assert!(!result.tables_match);
    assert_eq!(result.classification, Classification::Unmatched);
}

#[test]
fn test_empty_template_is_skipped() {
    let ws = Workspace::new();
    ws.template("a_empty.txt", "   \n");
    ws.template("b_real.txt", "alpha beta");
    ws.target("x.txt", "alpha beta");

    let summary = process(&ws.listed("templates"), &ws.listed("targets"), true, &ws.destinations()).unwrap();

    let result = &summary.results[0];
    assert_eq!(result.classification, Classification::Matched);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(name(&result.skipped[0].template), "a_empty.txt");
}

#[test]
fn test_unreadable_template_is_skipped() {
    let ws = Workspace::new();
    ws.template("a_bad.pdf", "%PDF-1.4 garbage");
    ws.template("b_good.txt", "alpha beta");
    ws.target("x.txt", "alpha beta");

    let summary = process(&ws.listed("templates"), &ws.listed("targets"), true, &ws.destinations()).unwrap();

    assert!(summary.failures.is_empty());
    let result = &summary.results[0];
    assert_eq!(result.classification, Classification::Matched);
    assert_eq!(result.template_id.as_deref().map(name), Some("b_good.txt".to_string()));
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(name(&result.skipped[0].template), "a_bad.pdf");
}

struct ReadOnlyRelocator;

impl FileRelocator for ReadOnlyRelocator {
    fn place(&self, _path: &Path, _destination: &Path) -> io::Result<PathBuf> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "destination is read-only"))
    }
}

#[test]
fn test_placement_failure_aborts_batch() {
    let ws = Workspace::new();
    ws.template("t.txt", "alpha beta");
    ws.target("a.txt", "alpha beta");
    ws.target("b.txt", "alpha");

    let engine = MatchDecisionEngine::new(true, ThresholdPolicy::Exact);
    let result = BatchAggregator::new(DocumentExtractor::default(), engine, ReadOnlyRelocator)
        .process(&ws.listed("templates"), &ws.listed("targets"), &ws.destinations());

    assert!(matches!(result, Err(MatchError::Io(ref e)) if e.kind() == io::ErrorKind::PermissionDenied));
}

#[test]
fn test_no_templates_leaves_targets_unmatched() {
    let ws = Workspace::new();
    ws.target("x.txt", "alpha beta");

    let summary = process(&[], &ws.listed("targets"), true, &ws.destinations()).unwrap();

    let result = &summary.results[0];
    assert_eq!(result.classification, Classification::Unmatched);
    assert_eq!(result.content_accuracy, 0.0);
    assert_eq!(result.compared_template, None);
    assert!(summary.diffs.is_empty());
}

#[test]
fn test_threshold_policy_accepts_close_match() {
    let ws = Workspace::new();
    ws.template("t.txt", "invoice number date total");
    ws.target("a.txt", "invoice number date");

    let engine = MatchDecisionEngine::new(true, ThresholdPolicy::AtLeast(0.75));
    let summary = BatchAggregator::new(DocumentExtractor::default(), engine, CopyRelocator)
        .process(&ws.listed("templates"), &ws.listed("targets"), &ws.destinations())
        .unwrap();

    assert_eq!(summary.results[0].classification, Classification::Matched);
}

#[test]
fn test_render_writes_all_artifacts() {
    let ws = Workspace::new();
    ws.template("t.txt", "invoice\nnumber\ndate\ntotal");
    ws.target("a.txt", "invoice\nnumber\ndate\ntotal");
    ws.target("b.txt", "invoice\nnumber\nextra");

    let summary = process(&ws.listed("templates"), &ws.listed("targets"), true, &ws.destinations()).unwrap();
    let renderer = FileReportRenderer::new(ws.path("results"), ws.path("rejected"), ReportConfig::default());
    let rendered = renderer.render(&summary).unwrap();

    for file in [
        "results/Comparison_Results.docx",
        "results/content_matching_graph.png",
        "results/template_matching_graph.png",
        "results/content_pie_chart.png",
        "results/template_pie_chart.png",
        "results/summary.csv",
        "results/summary.json",
        "rejected/Differences_b.txt.docx",
        "rejected/Differences_b.txt.diff",
    ] {
        assert!(ws.path(file).exists(), "missing {}", file);
    }
    assert_eq!(rendered.files.len(), 9);
    assert!(!ws.path("rejected/Differences_a.txt.docx").exists());

    let unified = fs::read_to_string(ws.path("rejected/Differences_b.txt.diff")).unwrap();
    assert!(unified.starts_with("--- t.txt\n+++ b.txt\n"));
    assert!(unified.contains("+extra"));
    assert!(unified.contains("-date"));
}
