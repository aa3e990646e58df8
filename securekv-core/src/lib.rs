//! Key-value storage of UTF-8 secrets on top of a keychain-style secure store.
//!
//! [`SecureStorage`] maps `read`, `write`, `delete`, `delete_all`, `read_all`
//! and `contains_key` onto the attribute-dictionary protocol of a
//! [`SecureStore`] backend. Records are partitioned by namespace, access group
//! and cloud-sync flag (see [`Partition`]), and carry an
//! [`AccessibilityLevel`] that decides when the OS lets them be read.
//!
//! Backends:
//! - [`MemoryStore`]: in-process emulation with test hooks.
//! - [`FileStore`]: plain-text JSON file for development hosts.
//! - `KeyringStore`: the platform credential service through the `keyring`
//!   crate, behind the `platform-keyring` feature.
//! - `apple::AppleKeychainStore`: Keychain Services, behind the
//!   `platform-apple` feature on Apple targets.
//!
//! ```rust
//! use securekv_core::{MemoryStore, SecureStorage, StorageOptions};
//!
//! # fn main() -> Result<(), securekv_core::StoreError> {
//! let storage = SecureStorage::new(MemoryStore::new());
//! let options = StorageOptions::namespace("app");
//! storage.write("token", "abc", &options)?;
//! assert_eq!(storage.read("token", &options)?.as_deref(), Some("abc"));
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

mod error;
pub use error::*;

mod partition;
pub use partition::*;

mod store;
pub use store::*;

mod storage;
pub use storage::*;

mod persisted;
pub use persisted::{BlobSink, PersistedStore};

mod file_store;
pub use file_store::{FileBlob, FileStore};

#[cfg(feature = "platform-keyring")]
mod keyring_store;
#[cfg(feature = "platform-keyring")]
pub use keyring_store::{KeyringBlob, KeyringStore, DEFAULT_LABEL};

mod paths;
pub use paths::StorePaths;

pub mod accessibility;
pub use accessibility::{AccessibilityLevel, ProtectionClass};

pub mod query;
pub use query::{QueryBuilder, ScopedQuery};

pub mod status;
pub use status::{StatusCode, StatusKind};

pub mod memory;
pub use memory::MemoryStore;

pub mod availability;

/// Host logging bridge.
pub mod logger;

#[cfg(all(target_vendor = "apple", feature = "platform-apple"))]
pub mod apple;
