//! Run command - classify a folder of targets against a folder of templates.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use docmatch_core::batch::{list_documents, BatchAggregator, CopyRelocator, Destinations, TargetEvent};
use docmatch_core::extract::DocumentExtractor;
use docmatch_core::matching::MatchDecisionEngine;
use docmatch_core::models::document::display_name;
use docmatch_core::models::{BatchSummary, MatchConfig};
use docmatch_core::report::{FileReportRenderer, ReportRenderer};

use super::{load_config, OutputFormat};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Folder holding reference templates
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Folder holding documents to classify
    #[arg(long)]
    targets: Option<PathBuf>,

    /// Destination for matched documents and the batch report
    #[arg(long)]
    result_dir: Option<PathBuf>,

    /// Destination for unmatched documents and their diff reports
    #[arg(long)]
    rejected_dir: Option<PathBuf>,

    /// Ground truth: no template applies to these targets
    #[arg(long)]
    template_absent: bool,

    /// Content accuracy threshold (0.0 - 1.0)
    #[arg(long)]
    threshold: Option<f64>,

    /// Accept content accuracy at or above the threshold instead of 1.0
    #[arg(long)]
    apply_threshold: bool,

    /// Skip writing report documents, charts and summaries
    #[arg(long)]
    no_report: bool,

    /// Output format of the final summary
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl RunArgs {
    fn apply_to(&self, config: &mut MatchConfig) {
        let batch = &mut config.batch;
        if let Some(dir) = &self.templates {
            batch.template_dir = dir.clone();
        }
        if let Some(dir) = &self.targets {
            batch.target_dir = dir.clone();
        }
        if let Some(dir) = &self.result_dir {
            batch.result_dir = dir.clone();
        }
        if let Some(dir) = &self.rejected_dir {
            batch.rejected_dir = dir.clone();
        }
        if self.template_absent {
            batch.template_present = false;
        }
        if let Some(threshold) = self.threshold {
            batch.match_threshold = threshold;
        }
        if self.apply_threshold {
            batch.apply_threshold = true;
        }
    }
}

pub async fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.apply_to(&mut config);
    config.validate()?;
    let batch = &config.batch;

    let templates = list_documents(&batch.template_dir, batch).map_err(|e| {
        anyhow::anyhow!("Cannot read template folder {}: {}", batch.template_dir.display(), e)
    })?;
    let targets = list_documents(&batch.target_dir, batch).map_err(|e| {
        anyhow::anyhow!("Cannot read target folder {}: {}", batch.target_dir.display(), e)
    })?;

    if templates.is_empty() {
        warn!("No templates found in {}", batch.template_dir.display());
    }

    let text_output = args.format == OutputFormat::Text;
    if text_output {
        println!(
            "{} Found {} templates and {} targets",
            style("ℹ").blue(),
            templates.len(),
            targets.len()
        );
    }

    let pb = if text_output {
        ProgressBar::new(targets.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} targets")?
            .progress_chars("=>-"),
    );

    let engine = MatchDecisionEngine::new(batch.template_present, batch.threshold_policy());
    let destinations = Destinations::new(&batch.result_dir, &batch.rejected_dir);
    let mut aggregator =
        BatchAggregator::new(DocumentExtractor::new(&config.extraction), engine, CopyRelocator);

    let summary = aggregator.process_with(&templates, &targets, &destinations, |event| {
        if text_output {
            pb.suspend(|| println!("{}", event_line(&event)));
        }
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    info!(
        "Extracted {} documents, {} cache hits",
        aggregator.cache().len(),
        aggregator.cache().hits()
    );

    if !args.no_report {
        let renderer = FileReportRenderer::new(
            &batch.result_dir,
            &batch.rejected_dir,
            config.report.clone(),
        );
        let rendered = renderer.render(&summary)?;
        if text_output {
            println!(
                "{} Report written to {} ({} files)",
                style("✓").green(),
                batch.result_dir.display(),
                rendered.files.len()
            );
        }
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print_summary(&summary, start),
    }

    Ok(())
}

fn event_line(event: &TargetEvent<'_>) -> String {
    match event {
        TargetEvent::Completed(result) if result.is_matched() => format!(
            "{} {} matched {} (content {:.2}%)",
            style("✓").green(),
            result.target_name(),
            result
                .template_id
                .as_deref()
                .map(display_name)
                .unwrap_or_default(),
            result.content_match_pct()
        ),
        TargetEvent::Completed(result) => format!(
            "{} {} unmatched (template {:.2}%, content {:.2}%)",
            style("✗").red(),
            result.target_name(),
            result.template_match_pct(),
            result.content_match_pct()
        ),
        TargetEvent::Failed(failure) => format!(
            "{} {}: {}",
            style("!").yellow(),
            failure.target.display(),
            failure.error
        ),
    }
}

fn print_summary(summary: &BatchSummary, start: Instant) {
    println!();
    println!(
        "{} Processed {} targets in {:?}",
        style("✓").green(),
        summary.results.len() + summary.failures.len(),
        start.elapsed()
    );
    println!(
        "   {} matched, {} unmatched, {} failed",
        style(summary.matched_count()).green(),
        style(summary.unmatched_count()).red(),
        style(summary.failures.len()).yellow()
    );

    if !summary.results.is_empty() {
        println!();
        println!("{:<40} {:>18} {:>20}", "Target File", "Template Match (%)", "Content Mismatch (%)");
        for row in summary.rows() {
            println!(
                "{:<40} {:>18.2} {:>20.2}",
                row.target, row.template_match_pct, row.content_mismatch_pct
            );
        }
    }

    if !summary.failures.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for failure in &summary.failures {
            println!("  - {}: {}", failure.target.display(), failure.error);
        }
    }
}
