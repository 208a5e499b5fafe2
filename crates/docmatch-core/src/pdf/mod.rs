//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::ExtractionError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Extracted text content of a PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfContent {
    /// Pages in document order.
    pub pages: Vec<PdfPage>,
}

impl PdfContent {
    /// Whole-document text with pages joined by `separator`.
    pub fn joined_text(&self, separator: &str) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Text of a single PDF page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Extracted text from this page.
    pub text: String,
}

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Extract text page by page.
    fn extract_pages(&self) -> Result<PdfContent>;
}
