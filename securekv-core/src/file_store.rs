//! File-backed secure store for development hosts.
//!
//! [`FileStore`] keeps the record table as a JSON file. Values are stored in
//! plain text: this backend exists so that tooling can run on machines
//! without a platform credential service and provides no protection.
//!
//! # Atomic Write Pattern
//!
//! 1. Serialize the table into a temporary file next to the store file
//! 2. `fsync` the temporary file
//! 3. Atomically rename it over the store file
//!
//! Readers therefore see either the old or the new table, never a partial one.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};

use zeroize::Zeroizing;

use crate::error::{StoreError, StoreResult};
use crate::paths::StorePaths;
use crate::persisted::{BlobSink, PersistedStore};

/// Plain-text, file-persisted secure store.
pub type FileStore = PersistedStore<FileBlob>;

/// Store file under a [`StorePaths`] root.
#[derive(Debug, Clone)]
pub struct FileBlob {
    paths: StorePaths,
}

impl FileBlob {
    /// Uses the store file under `paths`, creating its directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(paths: StorePaths) -> StoreResult<Self> {
        fs::create_dir_all(paths.store_dir()).map_err(|e| {
            StoreError::io(
                format!("creating store directory '{}'", paths.store_dir().display()),
                e,
            )
        })?;
        Ok(Self { paths })
    }

    /// Paths used by this blob.
    #[must_use]
    pub const fn paths(&self) -> &StorePaths {
        &self.paths
    }
}

impl BlobSink for FileBlob {
    fn load(&self) -> StoreResult<Option<Zeroizing<Vec<u8>>>> {
        let store_path = self.paths.store_path();
        match fs::read(&store_path) {
            Ok(bytes) => Ok(Some(Zeroizing::new(bytes))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(
                format!("reading '{}'", store_path.display()),
                e,
            )),
        }
    }

    fn save(&self, blob: &[u8]) -> StoreResult<()> {
        let temp_path = self.paths.temp_store_path();
        let store_path = self.paths.store_path();

        let mut file = File::create(&temp_path)
            .map_err(|e| StoreError::io(format!("creating '{}'", temp_path.display()), e))?;
        file.write_all(blob)
            .map_err(|e| StoreError::io(format!("writing '{}'", temp_path.display()), e))?;
        file.sync_all()
            .map_err(|e| StoreError::io(format!("syncing '{}'", temp_path.display()), e))?;
        drop(file);

        fs::rename(&temp_path, &store_path).map_err(|e| {
            StoreError::io(format!("renaming into '{}'", store_path.display()), e)
        })
    }

    fn location(&self) -> String {
        self.paths.store_path().display().to_string()
    }
}

impl PersistedStore<FileBlob> {
    /// Opens the store under `paths`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or an existing
    /// store file cannot be read or parsed.
    pub fn open(paths: StorePaths) -> StoreResult<Self> {
        Self::with_sink(FileBlob::new(paths)?)
    }

    /// Paths used by this store.
    #[must_use]
    pub const fn paths(&self) -> &StorePaths {
        self.sink().paths()
    }
}
