//! Data models shared across the pipeline.

pub mod config;
pub mod document;
pub mod result;

pub use config::{BatchConfig, ExtractionConfig, MatchConfig, ReportConfig, TableConfig};
pub use document::Document;
pub use result::{
    BatchSummary, Classification, ComparisonResult, ResultRow, SkippedPair, TargetDiff,
    TargetFailure,
};
