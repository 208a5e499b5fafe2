//! Core library for template-matching document classification.
//!
//! This crate provides:
//! - Content extraction from PDF and plain-text documents, with table counts
//! - Bag-of-words accuracy scoring and structural comparison
//! - First-match-wins classification against a set of templates
//! - Line diffs of unmatched targets against their last compared template
//! - Batch aggregation, file placement and report rendering

pub mod batch;
pub mod error;
pub mod extract;
pub mod matching;
pub mod models;
pub mod pdf;
pub mod report;

pub use error::{EmptyTemplateError, ExtractionError, MatchError, ReportError, Result};
pub use models::{BatchSummary, Classification, ComparisonResult, Document, MatchConfig};
pub use extract::{ContentExtractor, DocumentCache, DocumentExtractor};
pub use matching::{AccuracyScorer, DiffReport, MatchDecisionEngine, Score, ThresholdPolicy};
pub use batch::{BatchAggregator, CopyRelocator, Destinations, FileRelocator};
pub use report::{FileReportRenderer, RenderedReport, ReportRenderer};
