//! CSV and JSON summaries of a batch run.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::ReportError;
use crate::models::document::display_name;
use crate::models::BatchSummary;

fn path_name(path: Option<&Path>) -> String {
    path.map(display_name).unwrap_or_default()
}

/// Write one CSV row per processed target, then one per failed target.
pub fn write_csv(summary: &BatchSummary, path: &Path) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "target",
        "status",
        "template",
        "compared_template",
        "template_match_pct",
        "content_match_pct",
        "content_mismatch_pct",
        "tables_match",
        "error",
    ])?;

    for result in &summary.results {
        let skipped = result
            .skipped
            .iter()
            .map(|s| format!("{}: {}", display_name(&s.template), s.reason))
            .collect::<Vec<_>>()
            .join("; ");

        wtr.write_record([
            result.target_name().as_str(),
            result.classification.as_str(),
            &path_name(result.template_id.as_deref()),
            &path_name(result.compared_template.as_deref()),
            &format!("{:.2}", result.template_match_pct()),
            &format!("{:.2}", result.content_match_pct()),
            &format!("{:.2}", result.content_mismatch_pct()),
            if result.tables_match { "true" } else { "false" },
            &skipped,
        ])?;
    }

    for failure in &summary.failures {
        wtr.write_record([
            display_name(&failure.target).as_str(),
            "error",
            "",
            "",
            "",
            "",
            "",
            "",
            failure.error.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the summary as pretty JSON.
pub fn write_json(summary: &BatchSummary, path: &Path) -> Result<(), ReportError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, summary)?;
    Ok(())
}
