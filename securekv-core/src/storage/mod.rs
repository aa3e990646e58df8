//! The storage protocol on top of a [`SecureStore`].
//!
//! [`SecureStorage`] exposes six operations: [`read`](SecureStorage::read),
//! [`write`](SecureStorage::write), [`delete`](SecureStorage::delete),
//! [`delete_all`](SecureStorage::delete_all), [`read_all`](SecureStorage::read_all)
//! and [`contains_key`](SecureStorage::contains_key). Each call builds a fresh
//! [`ScopedQuery`](crate::ScopedQuery) for the partition named by its
//! [`StorageOptions`](crate::StorageOptions), runs it against the store on the
//! calling thread and translates the native status.
//!
//! Absence is a successful outcome for `read`, `read_all`, `delete` and
//! `delete_all`. Nothing else is swallowed, and nothing is retried: a write that
//! loses a race against another writer reports `AlreadyExists` or `NotFound`
//! (see [`StoreError::is_write_conflict`]) so the caller can decide.

mod delete;
mod exists;
mod read;
mod write;

#[cfg(test)]
mod tests;

use crate::error::{StoreError, StoreResult};
use crate::status::StatusCode;
use crate::store::SecureStore;

/// What `read_all` does with a record whose payload is not valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Report the key with an empty value. Lossy.
    #[default]
    EmptyString,
    /// Leave the key out of the result.
    Skip,
    /// Fail the whole call with [`StoreError::DecodeFailed`].
    Fail,
}

/// Behavior knobs for [`SecureStorage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StorageConfig {
    /// Handling of undecodable rows in `read_all`.
    pub read_all_decode: DecodePolicy,
}

/// Key-value secret storage backed by a platform secure store.
#[derive(Debug)]
pub struct SecureStorage<S> {
    store: S,
    config: StorageConfig,
}

impl<S: SecureStore> SecureStorage<S> {
    /// Creates storage over `store` with the default configuration.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_config(store, StorageConfig::default())
    }

    /// Creates storage over `store` with an explicit configuration.
    #[must_use]
    pub const fn with_config(store: S, config: StorageConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Converts a status into a result, using the store's description.
    fn check(&self, status: StatusCode) -> StoreResult<()> {
        StoreError::from_status(status, self.store.describe_status(status)).map_or(Ok(()), Err)
    }

    /// Like [`Self::check`] but treats "not found" as success.
    fn check_absent_ok(&self, status: StatusCode) -> StoreResult<()> {
        if status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        self.check(status)
    }
}
