//! DOCX documents: the batch results report and per-target diff reports.

use std::fs::File;
use std::path::Path;

use docx_rs::{Docx, Paragraph, Pic, Run, Table, TableCell, TableRow};

use crate::error::ReportError;
use crate::matching::{ColorPolicy, DiffLine, DiffTag};
use crate::models::document::display_name;
use crate::models::{BatchSummary, TargetDiff};

/// EMU per point.
const EMU_PER_PT: u32 = 12_700;

/// A chart image to embed, with its caption.
#[derive(Debug, Clone)]
pub struct EmbeddedChart {
    pub caption: String,
    pub png: Vec<u8>,
    pub width_pt: u32,
    pub height_pt: u32,
}

fn heading(text: &str, level: usize) -> Paragraph {
    let size = match level {
        1 => 32,
        _ => 26,
    };
    Paragraph::new().add_run(Run::new().add_text(text).bold().size(size))
}

fn text(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

fn cell(value: &str) -> TableCell {
    TableCell::new().add_paragraph(text(value))
}

fn header_row(headers: &[&str]) -> TableRow {
    TableRow::new(
        headers
            .iter()
            .map(|h| TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(*h).bold())))
            .collect(),
    )
}

fn colored_run(value: &str, color: Option<String>) -> Run {
    let run = Run::new().add_text(value);
    match color {
        Some(hex) => run.color(hex),
        None => run,
    }
}

/// Build the batch comparison report.
pub fn comparison_document(summary: &BatchSummary, charts: &[EmbeddedChart]) -> Docx {
    let mut docx = Docx::new()
        .add_paragraph(heading("Comparison Results", 1))
        .add_paragraph(text(&format!(
            "Generated {}",
            summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )))
        .add_paragraph(text(&format!(
            "{} matched, {} unmatched, {} failed",
            summary.matched_count(),
            summary.unmatched_count(),
            summary.failures.len()
        )));

    let mut rows = vec![header_row(&[
        "Target File",
        "Template Match (%)",
        "Content Mismatch (%)",
    ])];
    rows.extend(summary.rows().into_iter().map(|row| {
        TableRow::new(vec![
            cell(&row.target),
            cell(&format!("{:.2}", row.template_match_pct)),
            cell(&format!("{:.2}", row.content_mismatch_pct)),
        ])
    }));
    docx = docx.add_table(Table::new(rows)).add_paragraph(Paragraph::new());

    for chart in charts {
        let pic = Pic::new(&chart.png).size(chart.width_pt * EMU_PER_PT, chart.height_pt * EMU_PER_PT);
        docx = docx
            .add_paragraph(text(&chart.caption))
            .add_paragraph(Paragraph::new().add_run(Run::new().add_image(pic)))
            .add_paragraph(Paragraph::new());
    }

    if !summary.failures.is_empty() {
        docx = docx.add_paragraph(heading("Failed Documents", 2));
        let mut rows = vec![header_row(&["Target File", "Error"])];
        rows.extend(summary.failures.iter().map(|failure| {
            TableRow::new(vec![
                cell(&display_name(&failure.target)),
                cell(&failure.error),
            ])
        }));
        docx = docx.add_table(Table::new(rows));
    }

    docx
}

/// Build the diff report of one unmatched target.
///
/// The inline diff always uses the tagged coloring; the "Added" rows use
/// `row_policy`.
pub fn diff_document(diff: &TargetDiff, row_policy: ColorPolicy) -> Docx {
    let accuracy = diff.content_accuracy;
    let mut docx = Docx::new()
        .add_paragraph(heading(&format!("Differences in {}", diff.target_name()), 1))
        .add_paragraph(text(&format!(
            "Compared against {}",
            display_name(&diff.template)
        )));

    for line in &diff.report.lines {
        docx = docx.add_paragraph(inline_line(line, accuracy));
    }

    let added: Vec<&DiffLine> = diff.report.tagged(DiffTag::Added).collect();
    if !added.is_empty() {
        docx = docx.add_paragraph(heading("Differences in Table", 2));
        let rows = added
            .into_iter()
            .map(|line| {
                let color = row_policy.color(line.tag, accuracy).map(|c| c.hex());
                TableRow::new(vec![
                    cell("Added"),
                    TableCell::new()
                        .add_paragraph(Paragraph::new().add_run(colored_run(&line.text, color))),
                ])
            })
            .collect();
        docx = docx.add_table(Table::new(rows));
    }

    docx.add_paragraph(text(&format!(
        "Template Accuracy: {:.2}%",
        diff.template_presence * 100.0
    )))
    .add_paragraph(text(&format!("Target Accuracy: {:.2}%", accuracy * 100.0)))
}

fn inline_line(line: &DiffLine, accuracy: f64) -> Paragraph {
    let color = ColorPolicy::Tagged.color(line.tag, accuracy).map(|c| c.hex());
    let content = format!("{}{}", line.tag.prefix(), line.text);
    Paragraph::new().add_run(colored_run(&content, color))
}

/// Write a document to disk.
pub fn write_docx(docx: Docx, path: &Path) -> Result<(), ReportError> {
    let file = File::create(path)?;
    docx.build().pack(file).map_err(|e| ReportError::Docx {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::render_diff;
    use std::path::PathBuf;

    fn sample_diff() -> TargetDiff {
        TargetDiff {
            target: PathBuf::from("targets/b.txt"),
            template: PathBuf::from("templates/a.txt"),
            content_accuracy: 0.5,
            template_presence: 1.0,
            report: render_diff("invoice\nnumber\ndate", "invoice\nextra"),
        }
    }

    #[test]
    fn test_write_diff_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Differences_b.txt.docx");
        write_docx(diff_document(&sample_diff(), ColorPolicy::default()), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // DOCX is a zip archive
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_write_comparison_document_without_charts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Comparison_Results.docx");
        write_docx(comparison_document(&BatchSummary::new(), &[]), &path).unwrap();
        assert!(path.exists());
    }
}
