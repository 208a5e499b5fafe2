//! Sequential batch processing of targets against templates.

use std::path::PathBuf;
use std::rc::Rc;

use tracing::{debug, info, warn};

use super::placement::{Destinations, FileRelocator};
use crate::error::Result;
use crate::extract::{ContentExtractor, DocumentCache};
use crate::matching::{render_diff, MatchDecisionEngine, SearchState};
use crate::models::document::display_name;
use crate::models::{BatchSummary, ComparisonResult, Document, TargetDiff, TargetFailure};

/// Progress notification for one finished target.
#[derive(Debug, Clone, Copy)]
pub enum TargetEvent<'a> {
    /// The target was compared and classified.
    Completed(&'a ComparisonResult),
    /// The target could not be read.
    Failed(&'a TargetFailure),
}

/// Runs the decision engine over every target and accumulates results.
///
/// Each target is fully processed (comparisons, decision, placement, diff)
/// before the next one starts. Extraction and scoring failures are recorded
/// and the batch continues; placement I/O errors abort the run.
pub struct BatchAggregator<E, R> {
    cache: DocumentCache<E>,
    engine: MatchDecisionEngine,
    relocator: R,
}

impl<E: ContentExtractor, R: FileRelocator> BatchAggregator<E, R> {
    /// Create an aggregator.
    pub fn new(extractor: E, engine: MatchDecisionEngine, relocator: R) -> Self {
        Self {
            cache: DocumentCache::new(extractor),
            engine,
            relocator,
        }
    }

    /// Extraction cache used by this aggregator.
    pub fn cache(&self) -> &DocumentCache<E> {
        &self.cache
    }

    /// Process all targets.
    pub fn process(
        &mut self,
        templates: &[PathBuf],
        targets: &[PathBuf],
        destinations: &Destinations,
    ) -> Result<BatchSummary> {
        self.process_with(templates, targets, destinations, |_| {})
    }

    /// Process all targets, reporting each finished target to `on_event`.
    pub fn process_with<F>(
        &mut self,
        templates: &[PathBuf],
        targets: &[PathBuf],
        destinations: &Destinations,
        mut on_event: F,
    ) -> Result<BatchSummary>
    where
        F: FnMut(TargetEvent<'_>),
    {
        let mut summary = BatchSummary::new();

        info!(
            "Processing {} targets against {} templates",
            targets.len(),
            templates.len()
        );

        for target_path in targets {
            let target = match self.cache.get(target_path) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("Skipping {}: {}", target_path.display(), e);
                    summary.failures.push(TargetFailure {
                        target: target_path.clone(),
                        error: e.to_string(),
                    });
                    if let Some(failure) = summary.failures.last() {
                        on_event(TargetEvent::Failed(failure));
                    }
                    continue;
                }
            };

            let (result, diff) = self.process_target(templates, &target, destinations)?;
            if let Some(diff) = diff {
                summary.diffs.push(diff);
            }
            summary.results.push(result);
            if let Some(result) = summary.results.last() {
                on_event(TargetEvent::Completed(result));
            }
        }

        info!(
            "Batch finished: {} matched, {} unmatched, {} failed",
            summary.matched_count(),
            summary.unmatched_count(),
            summary.failures.len()
        );

        Ok(summary)
    }

    fn process_target(
        &mut self,
        templates: &[PathBuf],
        target: &Document,
        destinations: &Destinations,
    ) -> Result<(ComparisonResult, Option<TargetDiff>)> {
        let target_name = target.file_name();
        let mut search = self.engine.search();
        let mut last_template: Option<Rc<Document>> = None;

        for template_path in templates {
            let template = match self.cache.get(template_path) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("Skipping template {}: {}", template_path.display(), e);
                    search.skip(template_path.clone(), e.to_string());
                    continue;
                }
            };

            let evaluation = match self.engine.evaluate(&template, target) {
                Ok(evaluation) => evaluation,
                Err(e) => {
                    warn!(
                        "Skipping template {} for {}: {}",
                        template_path.display(),
                        target_name,
                        e
                    );
                    search.skip(template_path.clone(), e.to_string());
                    continue;
                }
            };

            info!(
                "Template: {} | Target: {} | template accuracy {:.2}% | content accuracy {:.2}%",
                template.file_name(),
                target_name,
                evaluation.score.template_presence * 100.0,
                evaluation.score.content_accuracy * 100.0
            );
            info!(
                "Template {} matched {}. Content matching status: {}",
                template.file_name(),
                if evaluation.template_matched() { "successfully" } else { "unsuccessfully" },
                if evaluation.content_identical() { "Match" } else { "Different" }
            );

            last_template = Some(template);
            if search.observe(evaluation) == SearchState::Matched {
                break;
            }
        }

        let decision = search.finish();
        let result = decision.into_result(target.path().to_path_buf());

        let diff = if result.is_matched() {
            let placed = self.relocator.place(target.path(), &destinations.confirmed)?;
            info!("{} matched, copied to {}", target_name, placed.display());
            debug!("Extracted content from {}:\n{}", target_name, target.text());
            None
        } else {
            let placed = self.relocator.place(target.path(), &destinations.rejected)?;
            info!("Template not matched for {}, copied to {}", target_name, placed.display());
            debug!("Extracted content from unmatched file {}:\n{}", target_name, target.text());

            last_template.map(|template| TargetDiff {
                target: target.path().to_path_buf(),
                template: template.path().to_path_buf(),
                content_accuracy: result.content_accuracy,
                template_presence: result.template_presence,
                report: render_diff(template.text(), target.text()),
            })
        };

        if let Some(diff) = &diff {
            debug!(
                "Diff of {} against {}: {} added, {} removed",
                target_name,
                display_name(&diff.template),
                diff.report.added_count(),
                diff.report.removed_count()
            );
        }

        Ok((result, diff))
    }
}
