//! Storage path helpers.

use std::path::{Path, PathBuf};

const STORE_DIRNAME: &str = "securekv";
const STORE_FILENAME: &str = "dev-store.json";

/// Paths for file-backed store artifacts under `<root>/securekv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    root: PathBuf,
    store_dir: PathBuf,
}

impl StorePaths {
    /// Builds store paths rooted at `root`.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let store_dir = root.join(STORE_DIRNAME);
        Self { root, store_dir }
    }

    /// Returns the storage root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory holding the store file.
    #[must_use]
    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    /// Returns the path of the store file.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.store_dir.join(STORE_FILENAME)
    }

    /// Returns the temporary path used while replacing the store file.
    #[must_use]
    pub fn temp_store_path(&self) -> PathBuf {
        self.store_dir.join(format!(".{STORE_FILENAME}.tmp"))
    }
}
