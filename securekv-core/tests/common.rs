//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use securekv_core::{FileStore, MemoryStore, SecureStorage, StorageOptions, StorePaths};
use uuid::Uuid;

/// Options for a namespace no other test uses.
pub fn unique_options() -> StorageOptions {
    StorageOptions::namespace(format!("securekv-test-{}", Uuid::new_v4()))
}

/// Storage over a fresh in-memory store.
pub fn memory_storage() -> SecureStorage<MemoryStore> {
    SecureStorage::new(MemoryStore::new())
}

/// Unique, not yet created directory under the system temp dir.
pub fn temp_root() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("securekv-test-{}", Uuid::new_v4()));
    path
}

/// Storage over a file store rooted at `root`.
pub fn file_storage(root: &Path) -> SecureStorage<FileStore> {
    SecureStorage::new(FileStore::open(StorePaths::new(root)).expect("open file store"))
}

/// Removes everything under `root`.
pub fn cleanup_storage(root: &Path) {
    let _ = std::fs::remove_dir_all(root);
}
