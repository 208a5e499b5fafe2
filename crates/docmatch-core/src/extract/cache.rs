//! Per-run cache of extraction outcomes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::trace;

use super::{ContentExtractor, Result};
use crate::models::Document;

/// Extracts each document at most once.
///
/// Failures are cached too, so a broken template is reported once per run
/// rather than re-read for every target.
pub struct DocumentCache<E> {
    extractor: E,
    entries: HashMap<PathBuf, Result<Rc<Document>>>,
    hits: usize,
}

impl<E: ContentExtractor> DocumentCache<E> {
    /// Wrap an extractor.
    pub fn new(extractor: E) -> Self {
        Self {
            extractor,
            entries: HashMap::new(),
            hits: 0,
        }
    }

    /// Cached extraction of `path`.
    pub fn get(&mut self, path: &Path) -> Result<Rc<Document>> {
        if let Some(entry) = self.entries.get(path) {
            self.hits += 1;
            trace!("Cache hit for {}", path.display());
            return entry.clone();
        }

        let entry = self.extractor.extract(path).map(Rc::new);
        self.entries.insert(path.to_path_buf(), entry.clone());
        entry
    }

    /// Whether a path has been extracted (successfully or not).
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been extracted yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups served from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// The wrapped extractor.
    pub fn extractor(&self) -> &E {
        &self.extractor
    }
}
