//! Routing of target documents to their destination folders.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Places a document into a destination folder.
pub trait FileRelocator {
    /// Place `path` into `destination`, returning the new location.
    fn place(&self, path: &Path, destination: &Path) -> io::Result<PathBuf>;
}

/// Copies documents, keeping the source. Creates the destination if absent
/// and overwrites a previous copy, so placing twice is harmless.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyRelocator;

impl FileRelocator for CopyRelocator {
    fn place(&self, path: &Path, destination: &Path) -> io::Result<PathBuf> {
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", path.display()),
            )
        })?;

        fs::create_dir_all(destination)?;
        let target = destination.join(file_name);
        fs::copy(path, &target)?;

        debug!("Copied {} to {}", path.display(), target.display());
        Ok(target)
    }
}

/// Destination folders for a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destinations {
    /// Matched targets.
    pub confirmed: PathBuf,
    /// Unmatched targets.
    pub rejected: PathBuf,
}

impl Destinations {
    pub fn new(confirmed: impl Into<PathBuf>, rejected: impl Into<PathBuf>) -> Self {
        Self {
            confirmed: confirmed.into(),
            rejected: rejected.into(),
        }
    }
}
