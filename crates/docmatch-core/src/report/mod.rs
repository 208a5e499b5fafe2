//! Report rendering: DOCX documents, charts, CSV and JSON summaries.
//!
//! Artifact names are derived from fixed names and target file names, so
//! rerunning a batch overwrites the previous artifacts.

pub mod charts;
mod docx;
mod summary;

pub use docx::{comparison_document, diff_document, write_docx, EmbeddedChart};
pub use summary::{write_csv, write_json};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ReportError;
use crate::matching::Rgb;
use crate::models::document::display_name;
use crate::models::{BatchSummary, ReportConfig, TargetDiff};
use charts::{encode_png, palette, pie_chart, stacked_bar_chart, StackedBar};

/// Batch report document name.
pub const COMPARISON_REPORT: &str = "Comparison_Results.docx";
/// Content matching bar chart.
pub const CONTENT_GRAPH: &str = "content_matching_graph.png";
/// Template matching bar chart.
pub const TEMPLATE_GRAPH: &str = "template_matching_graph.png";
/// Content matching pie chart.
pub const CONTENT_PIE: &str = "content_pie_chart.png";
/// Template matching pie chart.
pub const TEMPLATE_PIE: &str = "template_pie_chart.png";
/// CSV summary.
pub const SUMMARY_CSV: &str = "summary.csv";
/// JSON summary.
pub const SUMMARY_JSON: &str = "summary.json";

/// Diff document name for a target file name.
pub fn diff_document_name(target_name: &str) -> String {
    format!("Differences_{}.docx", target_name)
}

/// Unified diff file name for a target file name.
pub fn unified_diff_name(target_name: &str) -> String {
    format!("Differences_{}.diff", target_name)
}

/// Paths of the artifacts a render produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedReport {
    pub files: Vec<PathBuf>,
}

/// Turns a finished batch summary into artifacts.
pub trait ReportRenderer {
    /// Render all artifacts for `summary`.
    fn render(&self, summary: &BatchSummary) -> Result<RenderedReport, ReportError>;
}

/// Writes report artifacts into the result and rejected folders.
#[derive(Debug, Clone)]
pub struct FileReportRenderer {
    result_dir: PathBuf,
    rejected_dir: PathBuf,
    config: ReportConfig,
}

impl FileReportRenderer {
    /// Create a renderer writing the batch report to `result_dir` and diff
    /// reports to `rejected_dir`.
    pub fn new(
        result_dir: impl Into<PathBuf>,
        rejected_dir: impl Into<PathBuf>,
        config: ReportConfig,
    ) -> Self {
        Self {
            result_dir: result_dir.into(),
            rejected_dir: rejected_dir.into(),
            config,
        }
    }

    fn write_chart(
        &self,
        name: &str,
        png: Vec<u8>,
        caption: &str,
        (width_pt, height_pt): (u32, u32),
        out: &mut RenderedReport,
        charts: &mut Vec<EmbeddedChart>,
    ) -> Result<(), ReportError> {
        let path = self.result_dir.join(name);
        fs::write(&path, &png)?;
        debug!("Wrote chart {}", path.display());
        out.files.push(path);
        charts.push(EmbeddedChart {
            caption: caption.to_string(),
            png,
            width_pt,
            height_pt,
        });
        Ok(())
    }

    fn render_charts(
        &self,
        summary: &BatchSummary,
        out: &mut RenderedReport,
    ) -> Result<Vec<EmbeddedChart>, ReportError> {
        let bars: Vec<StackedBar> = summary
            .rows()
            .into_iter()
            .map(|row| StackedBar {
                label: row.target,
                lower: row.template_match_pct,
                upper: row.content_mismatch_pct,
            })
            .collect();

        let mut charts = Vec::new();
        let bar_size = (400, 300);
        let pie_size = (300, 300);

        let content_graph = encode_png(&stacked_bar_chart(&bars, palette::GREEN, palette::RED))?;
        self.write_chart(
            CONTENT_GRAPH,
            content_graph,
            "Content Matching Comparison (green: match, red: mismatch)",
            bar_size,
            out,
            &mut charts,
        )?;

        let template_graph = encode_png(&stacked_bar_chart(&bars, palette::BLUE, palette::ORANGE))?;
        self.write_chart(
            TEMPLATE_GRAPH,
            template_graph,
            "Template Matching Comparison (blue: match, orange: mismatch)",
            bar_size,
            out,
            &mut charts,
        )?;

        let content_mean = summary.mean_content_match_pct();
        let content_pie = encode_png(&pie_chart(&match_slices(
            content_mean,
            palette::GREEN,
            palette::RED,
        )))?;
        self.write_chart(
            CONTENT_PIE,
            content_pie,
            &format!(
                "Content Matching Status: {:.1}% match, {:.1}% mismatch",
                content_mean,
                100.0 - content_mean
            ),
            pie_size,
            out,
            &mut charts,
        )?;

        let template_mean = summary.mean_template_match_pct();
        let template_pie = encode_png(&pie_chart(&match_slices(
            template_mean,
            palette::BLUE,
            palette::ORANGE,
        )))?;
        self.write_chart(
            TEMPLATE_PIE,
            template_pie,
            &format!(
                "Template Matching Status: {:.1}% match, {:.1}% mismatch",
                template_mean,
                100.0 - template_mean
            ),
            pie_size,
            out,
            &mut charts,
        )?;

        Ok(charts)
    }

    fn render_diff(&self, diff: &TargetDiff, out: &mut RenderedReport) -> Result<(), ReportError> {
        let target_name = diff.target_name();

        if self.config.write_docx {
            let path = self.rejected_dir.join(diff_document_name(&target_name));
            write_docx(diff_document(diff, self.config.added_row_policy), &path)?;
            out.files.push(path);
        }

        if self.config.write_unified_diff {
            let path = self.rejected_dir.join(unified_diff_name(&target_name));
            let template_name = display_name(&diff.template);
            fs::write(
                &path,
                diff.report
                    .unified(&template_name, &target_name, self.config.diff_context),
            )?;
            out.files.push(path);
        }

        Ok(())
    }
}

fn match_slices(match_pct: f64, matched: Rgb, mismatched: Rgb) -> [(f64, Rgb); 2] {
    let match_pct = match_pct.clamp(0.0, 100.0);
    [(match_pct, matched), (100.0 - match_pct, mismatched)]
}

fn ensure_dir(dir: &Path) -> Result<(), ReportError> {
    fs::create_dir_all(dir)?;
    Ok(())
}

impl ReportRenderer for FileReportRenderer {
    fn render(&self, summary: &BatchSummary) -> Result<RenderedReport, ReportError> {
        ensure_dir(&self.result_dir)?;
        let mut out = RenderedReport::default();

        let charts = if self.config.write_charts {
            self.render_charts(summary, &mut out)?
        } else {
            Vec::new()
        };

        if self.config.write_docx {
            let path = self.result_dir.join(COMPARISON_REPORT);
            write_docx(comparison_document(summary, &charts), &path)?;
            out.files.push(path);
        }

        if !summary.diffs.is_empty() {
            ensure_dir(&self.rejected_dir)?;
        }
        for diff in &summary.diffs {
            self.render_diff(diff, &mut out)?;
        }

        if self.config.write_csv {
            let path = self.result_dir.join(SUMMARY_CSV);
            write_csv(summary, &path)?;
            out.files.push(path);
        }

        if self.config.write_json {
            let path = self.result_dir.join(SUMMARY_JSON);
            write_json(summary, &path)?;
            out.files.push(path);
        }

        info!("Report written: {} files", out.files.len());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_names() {
        assert_eq!(diff_document_name("a.pdf"), "Differences_a.pdf.docx");
        assert_eq!(unified_diff_name("a.pdf"), "Differences_a.pdf.diff");
    }

    #[test]
    fn test_match_slices_clamped() {
        let [matched, mismatched] = match_slices(150.0, palette::GREEN, palette::RED);
        assert_eq!(matched.0, 100.0);
        assert_eq!(mismatched.0, 0.0);
    }

    #[test]
    fn test_render_empty_summary() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FileReportRenderer::new(
            dir.path().join("results"),
            dir.path().join("rejected"),
            ReportConfig::default(),
        );

        let rendered = renderer.render(&BatchSummary::new()).unwrap();
        let names: Vec<String> = rendered
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                CONTENT_GRAPH,
                TEMPLATE_GRAPH,
                CONTENT_PIE,
                TEMPLATE_PIE,
                COMPARISON_REPORT,
                SUMMARY_CSV,
                SUMMARY_JSON
            ]
        );
        assert!(!dir.path().join("rejected").exists());
    }
}
