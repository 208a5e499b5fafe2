//! Match decision engine.
//!
//! A target is compared against templates in a fixed order. The search
//! stops at the first template that matches on presence, content and table
//! structure; if none does, the target is exhausted and unmatched.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::scorer::{AccuracyScorer, Score};
use super::structure::tables_match;
use crate::error::EmptyTemplateError;
use crate::models::{Classification, ComparisonResult, Document, SkippedPair};

/// How content accuracy is judged against the match criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "threshold", rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// Only an accuracy of exactly 1.0 matches; any configured threshold is ignored.
    #[default]
    Exact,
    /// Accuracy at or above the threshold matches.
    AtLeast(f64),
}

impl ThresholdPolicy {
    /// Whether an accuracy satisfies this policy.
    pub fn accepts(&self, content_accuracy: f64) -> bool {
        match *self {
            ThresholdPolicy::Exact => content_accuracy == 1.0,
            ThresholdPolicy::AtLeast(threshold) => content_accuracy >= threshold,
        }
    }
}

/// Outcome of comparing one template with one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairEvaluation {
    /// Template compared.
    pub template: PathBuf,
    /// Content and presence scores.
    pub score: Score,
    /// Tables detected in the template.
    pub template_table_count: usize,
    /// Tables detected in the target.
    pub target_table_count: usize,
    /// Whether the table counts are equal.
    pub tables_match: bool,
}

impl PairEvaluation {
    /// Template presence and structure agree, regardless of content.
    pub fn template_matched(&self) -> bool {
        self.score.template_presence > 0.0 && self.tables_match
    }

    /// Whether every template term was found in the target.
    pub fn content_identical(&self) -> bool {
        self.score.content_accuracy == 1.0
    }
}

/// Search state for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Templates remain to be tried.
    Searching,
    /// A template matched; no further templates are tried.
    Matched,
    /// All templates were tried without a match.
    Exhausted,
}

/// Final decision for one target.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Terminal classification.
    pub classification: Classification,
    /// Winning template when matched.
    pub winner: Option<PathBuf>,
    /// Last evaluation performed (the winning one when matched).
    pub retained: Option<PairEvaluation>,
    /// Pairs that could not be scored.
    pub skipped: Vec<SkippedPair>,
}

impl Decision {
    /// Build the per-target result row.
    ///
    /// A target with no scored pair records zero accuracy and presence.
    pub fn into_result(self, target: PathBuf) -> ComparisonResult {
        let (compared_template, score, tables_match) = match self.retained {
            Some(eval) => (Some(eval.template), eval.score, eval.tables_match),
            None => (
                None,
                Score {
                    content_accuracy: 0.0,
                    template_presence: 0.0,
                },
                false,
            ),
        };

        ComparisonResult {
            target_id: target,
            template_id: self.winner,
            compared_template,
            content_accuracy: score.content_accuracy,
            template_presence: score.template_presence,
            tables_match,
            classification: self.classification,
            skipped: self.skipped,
        }
    }
}

/// Combines scoring and structural comparison into match decisions.
#[derive(Debug, Clone)]
pub struct MatchDecisionEngine {
    scorer: AccuracyScorer,
    policy: ThresholdPolicy,
}

impl MatchDecisionEngine {
    /// Create an engine for a batch-wide ground truth and decision policy.
    pub fn new(template_present: bool, policy: ThresholdPolicy) -> Self {
        Self {
            scorer: AccuracyScorer::new(template_present),
            policy,
        }
    }

    /// Decision policy in effect.
    pub fn policy(&self) -> ThresholdPolicy {
        self.policy
    }

    /// Compare one template with one target.
    pub fn evaluate(
        &self,
        template: &Document,
        target: &Document,
    ) -> Result<PairEvaluation, EmptyTemplateError> {
        let score = self.scorer.score(template.text(), target.text())?;
        let tables_match = tables_match(template.table_count(), target.table_count());

        trace!(
            "Evaluated {} vs {}: accuracy={:.4}, presence={}, tables {} vs {}",
            template.path().display(),
            target.path().display(),
            score.content_accuracy,
            score.template_presence,
            template.table_count(),
            target.table_count()
        );

        Ok(PairEvaluation {
            template: template.path().to_path_buf(),
            score,
            template_table_count: template.table_count(),
            target_table_count: target.table_count(),
            tables_match,
        })
    }

    /// Match rule: template present, content accepted by the policy, tables equal.
    pub fn is_match(&self, evaluation: &PairEvaluation) -> bool {
        evaluation.score.template_presence > 0.0
            && self.policy.accepts(evaluation.score.content_accuracy)
            && evaluation.tables_match
    }

    /// Start a template search for one target.
    pub fn search(&self) -> MatchSearch<'_> {
        MatchSearch {
            engine: self,
            state: SearchState::Searching,
            winner: None,
            last: None,
            skipped: Vec::new(),
        }
    }

    /// Run a complete search over already extracted templates.
    pub fn decide<'a, I>(&self, target: &Document, templates: I) -> Decision
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut search = self.search();
        for template in templates {
            match self.evaluate(template, target) {
                Ok(evaluation) => {
                    if search.observe(evaluation) == SearchState::Matched {
                        break;
                    }
                }
                Err(e) => search.skip(template.path().to_path_buf(), e.to_string()),
            }
        }
        search.finish()
    }
}

/// In-progress template search for one target.
#[derive(Debug)]
pub struct MatchSearch<'e> {
    engine: &'e MatchDecisionEngine,
    state: SearchState,
    winner: Option<PathBuf>,
    last: Option<PairEvaluation>,
    skipped: Vec<SkippedPair>,
}

impl MatchSearch<'_> {
    /// Current state.
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Record an evaluation. Evaluations after a match are ignored.
    pub fn observe(&mut self, evaluation: PairEvaluation) -> SearchState {
        if self.state != SearchState::Searching {
            debug!(
                "Ignoring evaluation of {} after search ended",
                evaluation.template.display()
            );
            return self.state;
        }

        if self.engine.is_match(&evaluation) {
            self.winner = Some(evaluation.template.clone());
            self.state = SearchState::Matched;
        }
        self.last = Some(evaluation);
        self.state
    }

    /// Record a template that could not be scored.
    pub fn skip(&mut self, template: PathBuf, reason: impl Into<String>) {
        self.skipped.push(SkippedPair {
            template,
            reason: reason.into(),
        });
    }

    /// Last evaluation recorded.
    pub fn last(&self) -> Option<&PairEvaluation> {
        self.last.as_ref()
    }

    /// End the search; a search still in progress becomes exhausted.
    pub fn finish(mut self) -> Decision {
        if self.state == SearchState::Searching {
            self.state = SearchState::Exhausted;
        }

        let classification = match self.state {
            SearchState::Matched => Classification::Matched,
            _ => Classification::Unmatched,
        };

        Decision {
            classification,
            winner: self.winner,
            retained: self.last,
            skipped: self.skipped,
        }
    }
}
