//! Bag-of-words content accuracy scoring.
//!
//! Text is lowercased and split on whitespace; duplicate terms collapse, so
//! only vocabulary overlap matters, never term frequency.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::EmptyTemplateError;

/// Set of distinct lowercase terms of a text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: HashSet<String>,
}

impl Vocabulary {
    /// Tokenize a text into its vocabulary.
    pub fn from_text(text: &str) -> Self {
        let terms = text
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        Self { terms }
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the text had no terms at all.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether a (lowercase) term is present.
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    /// Number of terms shared with another vocabulary.
    pub fn overlap(&self, other: &Vocabulary) -> usize {
        self.terms.intersection(&other.terms).count()
    }
}

/// Scores of one template/target comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// `|template ∩ target| / |template|`, or 0.0 when no template is assumed present.
    pub content_accuracy: f64,
    /// 1.0 when a template is assumed present, else 0.0.
    pub template_presence: f64,
}

/// Scores text pairs under a batch-wide ground-truth assumption.
#[derive(Debug, Clone, Copy)]
pub struct AccuracyScorer {
    template_present: bool,
}

impl AccuracyScorer {
    /// Create a scorer. `template_present` is the caller's ground truth and
    /// stays constant for the whole run.
    pub fn new(template_present: bool) -> Self {
        Self { template_present }
    }

    /// The ground-truth flag this scorer applies.
    pub fn template_present(&self) -> bool {
        self.template_present
    }

    /// Score two texts.
    pub fn score(&self, template_text: &str, target_text: &str) -> Result<Score, EmptyTemplateError> {
        score(template_text, target_text, self.template_present)
    }

    /// Score two pre-tokenized vocabularies.
    pub fn score_vocabularies(
        &self,
        template: &Vocabulary,
        target: &Vocabulary,
    ) -> Result<Score, EmptyTemplateError> {
        score_vocabularies(template, target, self.template_present)
    }
}

/// Compute content accuracy and template presence for a text pair.
///
/// The denominator is the template vocabulary, so the measure is not
/// symmetric: swapping the arguments changes the result whenever the two
/// vocabularies differ in size.
pub fn score(
    template_text: &str,
    target_text: &str,
    template_is_known_present: bool,
) -> Result<Score, EmptyTemplateError> {
    score_vocabularies(
        &Vocabulary::from_text(template_text),
        &Vocabulary::from_text(target_text),
        template_is_known_present,
    )
}

/// Compute scores from vocabularies.
pub fn score_vocabularies(
    template: &Vocabulary,
    target: &Vocabulary,
    template_is_known_present: bool,
) -> Result<Score, EmptyTemplateError> {
    if template.is_empty() {
        return Err(EmptyTemplateError);
    }

    let ratio = template.overlap(target) as f64 / template.len() as f64;

    Ok(Score {
        content_accuracy: if template_is_known_present { ratio } else { 0.0 },
        template_presence: if template_is_known_present { 1.0 } else { 0.0 },
    })
}
