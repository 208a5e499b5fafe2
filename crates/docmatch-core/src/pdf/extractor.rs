//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, trace};

use super::{PdfContent, PdfPage, PdfProcessor, Result};
use crate::error::ExtractionError;

/// PDF text extractor using lopdf for loading and pdf-extract for text.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    fn loaded(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| ExtractionError::Parse("No document loaded".to_string()))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| ExtractionError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(ExtractionError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data).map_err(|e| {
                ExtractionError::Parse(format!("Failed to save decrypted PDF: {}", e))
            })?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(ExtractionError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        self.loaded()?;
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| ExtractionError::TextExtraction(e.to_string()))
    }

    fn extract_pages(&self) -> Result<PdfContent> {
        let doc = self.loaded()?;

        let mut pages = Vec::new();
        for &number in doc.get_pages().keys() {
            let text = match doc.extract_text(&[number]) {
                Ok(text) => text,
                Err(e) => {
                    trace!("lopdf could not extract page {}: {}", number, e);
                    String::new()
                }
            };
            pages.push(PdfPage {
                number,
                text: text.trim_end().to_string(),
            });
        }

        // lopdf misses text in some font encodings; pdf-extract handles those
        // but only for the whole document.
        if pages.iter().all(|p| p.text.trim().is_empty()) {
            debug!("No per-page text found, falling back to whole-document extraction");
            let text = self.extract_text()?;
            pages = vec![PdfPage {
                number: 1,
                text: text.trim_end().to_string(),
            }];
        }

        debug!(
            "Extracted {} pages, {} chars of text",
            pages.len(),
            pages.iter().map(|p| p.text.len()).sum::<usize>()
        );

        Ok(PdfContent { pages })
    }
}
