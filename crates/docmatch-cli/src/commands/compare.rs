//! Compare command - score one template against one target.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::debug;

use docmatch_core::extract::{ContentExtractor, DocumentExtractor};
use docmatch_core::matching::{render_diff, DiffReport, DiffTag, MatchDecisionEngine, ThresholdPolicy};
use docmatch_core::models::ComparisonResult;

use super::{load_config, OutputFormat};

/// Arguments for the compare command.
#[derive(Args)]
pub struct CompareArgs {
    /// Template document
    template: PathBuf,

    /// Target document
    target: PathBuf,

    /// Ground truth: the template does not apply to the target
    #[arg(long)]
    template_absent: bool,

    /// Content accuracy threshold (0.0 - 1.0)
    #[arg(long)]
    threshold: Option<f64>,

    /// Accept content accuracy at or above the threshold instead of 1.0
    #[arg(long)]
    apply_threshold: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Do not print the line diff
    #[arg(long)]
    no_diff: bool,
}

#[derive(Serialize)]
struct CompareOutput {
    #[serde(flatten)]
    result: ComparisonResult,
    template_tables: usize,
    target_tables: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    diff: Option<DiffReport>,
}

pub async fn run(args: CompareArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(threshold) = args.threshold {
        config.batch.match_threshold = threshold;
    }
    if args.apply_threshold {
        config.batch.apply_threshold = true;
    }
    if args.template_absent {
        config.batch.template_present = false;
    }
    config.validate()?;

    for path in [&args.template, &args.target] {
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }
    }

    let extractor = DocumentExtractor::new(&config.extraction);
    let template = extractor
        .extract(&args.template)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.template.display(), e))?;
    let target = extractor
        .extract(&args.target)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.target.display(), e))?;

    let policy = config.batch.threshold_policy();
    let engine = MatchDecisionEngine::new(config.batch.template_present, policy);
    let result = engine
        .decide(&target, std::iter::once(&template))
        .into_result(args.target.clone());

    let diff = (!args.no_diff && !result.is_matched())
        .then(|| render_diff(template.text(), target.text()));
    if let Some(diff) = &diff {
        debug!(
            "Diff: {} added, {} removed",
            diff.added_count(),
            diff.removed_count()
        );
    }

    let output = CompareOutput {
        result,
        template_tables: template.table_count(),
        target_tables: target.table_count(),
        diff,
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Text => print_text(&output, policy),
    }

    Ok(())
}

fn print_text(output: &CompareOutput, policy: ThresholdPolicy) {
    let result = &output.result;

    // Same spelling as the JSON output.
    let label = result.classification.as_str().to_uppercase();
    let status = if result.is_matched() {
        style(label).green().bold()
    } else {
        style(label).red().bold()
    };
    println!("{} {}", style("Classification:").bold(), status);
    println!("  Template accuracy: {:.2}%", result.template_match_pct());
    println!("  Content accuracy:  {:.2}%", result.content_match_pct());
    println!(
        "  Tables:            {} vs {} ({})",
        output.template_tables,
        output.target_tables,
        if result.tables_match { "match" } else { "different" }
    );
    match policy {
        ThresholdPolicy::Exact => println!("  Rule:              exact content"),
        ThresholdPolicy::AtLeast(threshold) => {
            println!("  Rule:              content >= {:.2}%", threshold * 100.0)
        }
    }

    for skipped in &result.skipped {
        println!(
            "{} {}: {}",
            style("!").yellow(),
            skipped.template.display(),
            skipped.reason
        );
    }

    if let Some(diff) = &output.diff {
        println!();
        println!("{}", style("Differences:").bold());
        for line in &diff.lines {
            let text = format!("{}{}", line.tag.prefix(), line.text);
            match line.tag {
                DiffTag::Added => println!("{}", style(text).red()),
                DiffTag::Removed => println!("{}", style(text).green()),
                DiffTag::Unchanged => println!("{}", text),
            }
        }
    }
}
