//! Content extraction: full text plus a count of tabular regions.
//!
//! Extractors are configured at construction time and hold no global
//! state. Failures are per-document [`ExtractionError`]s.

mod cache;
mod tables;

pub use cache::DocumentCache;
pub use tables::{TableDetector, TableRegion};

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::ExtractionError;
use crate::models::{Document, ExtractionConfig};
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for document content extractors.
pub trait ContentExtractor {
    /// Extract text and table count from a document.
    fn extract(&self, path: &Path) -> Result<Document>;

    /// Whether this extractor handles the given file.
    fn supports(&self, path: &Path) -> bool;
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| ExtractionError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Extracts PDFs, counting tables page by page.
#[derive(Debug, Clone)]
pub struct PdfContentExtractor {
    tables: TableDetector,
    page_separator: String,
}

impl PdfContentExtractor {
    /// Create a PDF extractor.
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            tables: TableDetector::new(&config.table),
            page_separator: config.page_separator.clone(),
        }
    }
}

impl ContentExtractor for PdfContentExtractor {
    fn extract(&self, path: &Path) -> Result<Document> {
        let data = read_bytes(path)?;
        let mut pdf = PdfExtractor::new();
        pdf.load(&data)?;

        let content = pdf.extract_pages()?;
        let table_count: usize = content
            .pages
            .iter()
            .map(|page| self.tables.count(&page.text))
            .sum();
        let text = content.joined_text(&self.page_separator);

        debug!(
            "Extracted {}: {} pages, {} chars, {} tables",
            path.display(),
            content.pages.len(),
            text.len(),
            table_count
        );

        Ok(Document::new(path, text, table_count))
    }

    fn supports(&self, path: &Path) -> bool {
        extension(path) == "pdf"
    }
}

/// Reads UTF-8 text files.
#[derive(Debug, Clone)]
pub struct PlainTextExtractor {
    tables: TableDetector,
}

impl PlainTextExtractor {
    /// Create a text extractor.
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            tables: TableDetector::new(&config.table),
        }
    }
}

impl ContentExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<Document> {
        let data = read_bytes(path)?;
        let text = String::from_utf8(data)
            .map_err(|e| ExtractionError::TextExtraction(format!("invalid UTF-8: {}", e)))?;
        let table_count = self.tables.count(&text);

        debug!(
            "Read {}: {} chars, {} tables",
            path.display(),
            text.len(),
            table_count
        );

        Ok(Document::new(path, text, table_count))
    }

    fn supports(&self, path: &Path) -> bool {
        matches!(extension(path).as_str(), "txt" | "text" | "md")
    }
}

/// Dispatches to the PDF or plain-text extractor by file extension.
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    pdf: PdfContentExtractor,
    text: PlainTextExtractor,
}

impl DocumentExtractor {
    /// Create an extractor from configuration.
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            pdf: PdfContentExtractor::new(config),
            text: PlainTextExtractor::new(config),
        }
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl ContentExtractor for DocumentExtractor {
    fn extract(&self, path: &Path) -> Result<Document> {
        if self.pdf.supports(path) {
            self.pdf.extract(path)
        } else if self.text.supports(path) {
            self.text.extract(path)
        } else {
            Err(ExtractionError::Unsupported(extension(path)))
        }
    }

    fn supports(&self, path: &Path) -> bool {
        self.pdf.supports(path) || self.text.supports(path)
    }
}
