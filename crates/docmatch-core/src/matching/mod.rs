//! Matching and scoring engine.

mod diff;
mod engine;
mod scorer;
mod structure;

pub use diff::{accuracy_band, render_diff, ColorPolicy, DiffLine, DiffReport, DiffTag, Rgb};
pub use engine::{
    Decision, MatchDecisionEngine, MatchSearch, PairEvaluation, SearchState, ThresholdPolicy,
};
pub use scorer::{score, score_vocabularies, AccuracyScorer, Score, Vocabulary};
pub use structure::tables_match;
