//! Error types for the docmatch-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the docmatch library.
#[derive(Error, Debug)]
pub enum MatchError {
    /// Document extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Template text had no terms to score against.
    #[error(transparent)]
    EmptyTemplate(#[from] EmptyTemplateError),

    /// Report rendering error.
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// I/O error (destination unwritable, unreadable folder, ...).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to reading a document's content.
///
/// Extraction failures are fatal only for the document they concern, so
/// the type is `Clone` and can be cached and reported per document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The file could not be read.
    #[error("failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// Failed to open/parse the document.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// Failed to extract text from the document.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// No extractor handles this file type.
    #[error("unsupported document type: {0}")]
    Unsupported(String),
}

/// Raised when a template's vocabulary is empty.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("template has no terms to match against")]
pub struct EmptyTemplateError;

/// Errors raised while writing report artifacts.
#[derive(Error, Debug)]
pub enum ReportError {
    /// I/O error while writing an artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// DOCX packaging failed.
    #[error("failed to write document {path}: {reason}")]
    Docx { path: PathBuf, reason: String },

    /// Chart rasterisation or encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// CSV summary could not be written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON summary could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the docmatch library.
pub type Result<T> = std::result::Result<T, MatchError>;
