//! Batch processing: document discovery, aggregation and placement.

mod aggregator;
mod placement;

pub use aggregator::{BatchAggregator, TargetEvent};
pub use placement::{CopyRelocator, Destinations, FileRelocator};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::extract::DocumentExtractor;
use crate::matching::{MatchDecisionEngine, ThresholdPolicy};
use crate::models::{BatchConfig, BatchSummary};

/// List the documents of a folder carrying one of the configured
/// extensions, sorted by file name.
pub fn list_documents(dir: &Path, config: &BatchConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && config.accepts(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    debug!("Found {} documents in {}", files.len(), dir.display());
    Ok(files)
}

/// Classify `targets` against `templates` with the default extractor,
/// copy placement and the exact-match rule.
pub fn process(
    templates: &[PathBuf],
    targets: &[PathBuf],
    ground_truth_present: bool,
    destinations: &Destinations,
) -> Result<BatchSummary> {
    let engine = MatchDecisionEngine::new(ground_truth_present, ThresholdPolicy::Exact);
    BatchAggregator::new(DocumentExtractor::default(), engine, CopyRelocator)
        .process(templates, targets, destinations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_documents_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.PDF", "c.docx", "notes"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("sub.txt")).unwrap();

        let files = list_documents(dir.path(), &BatchConfig::default()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.txt"]);
    }

    #[test]
    fn test_list_missing_folder_is_error() {
        assert!(list_documents(Path::new("/nonexistent/folder"), &BatchConfig::default()).is_err());
    }
}
