//! Extracted document model.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A document whose content has been extracted.
///
/// Identity is the file path. Instances are immutable once built; callers
/// that need the same document again go through a
/// [`DocumentCache`](crate::extract::DocumentCache) rather than extracting twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    path: PathBuf,
    text: String,
    table_count: usize,
}

impl Document {
    /// Create a document from already extracted content.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>, table_count: usize) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            table_count,
        }
    }

    /// Path identifying the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full plain text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of detected tabular regions.
    pub fn table_count(&self) -> usize {
        self.table_count
    }

    /// File name used in reports and artifact names.
    pub fn file_name(&self) -> String {
        display_name(&self.path)
    }
}

/// File name component of a path, falling back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        let doc = Document::new("/data/targets/invoice_01.pdf", "invoice", 1);
        assert_eq!(doc.file_name(), "invoice_01.pdf");
        assert_eq!(doc.table_count(), 1);
    }

    #[test]
    fn test_display_name_without_file_name() {
        assert_eq!(display_name(Path::new("/")), "/");
    }
}
