//! Record tables persisted as a single blob.
//!
//! Backends without a queryable item store (a file, a platform credential
//! entry) keep the whole record table in one serialized blob. The table lives
//! in a [`MemoryStore`], which provides the keychain matching semantics, and
//! every successful mutation is written back through a [`BlobSink`].
//!
//! Mutations run against a staged copy of the table. The live table is only
//! replaced once the sink accepted the new blob, so a failed save leaves both
//! the persisted and the in-process state untouched. Such a failure is
//! reported as `errSecIO` (`-36`).

#![allow(clippy::significant_drop_tightening)]

use std::sync::{Mutex, PoisonError};

use zeroize::Zeroizing;

use crate::error::{StoreError, StoreResult};
use crate::memory::{MemoryStore, StoredItem};
use crate::query::ScopedQuery;
use crate::status::StatusCode;
use crate::store::{ItemUpdate, Lookup, NewItem, SecureStore};

/// Durable location for a serialized record table.
pub trait BlobSink: Send + Sync {
    /// Returns the last saved blob, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the location exists but cannot be read.
    fn load(&self) -> StoreResult<Option<Zeroizing<Vec<u8>>>>;

    /// Replaces the saved blob. Must not leave a partially written blob behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob could not be stored.
    fn save(&self, blob: &[u8]) -> StoreResult<()>;

    /// Human readable location, used in logs and status descriptions.
    fn location(&self) -> String;
}

/// [`SecureStore`] keeping its record table in a [`BlobSink`].
#[derive(Debug)]
pub struct PersistedStore<B> {
    sink: B,
    table: MemoryStore,
    writer: Mutex<()>,
}

impl<B: BlobSink> PersistedStore<B> {
    /// Loads the table saved in `sink`, starting empty if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot be read or holds an unparsable table.
    pub fn with_sink(sink: B) -> StoreResult<Self> {
        let items: Vec<StoredItem> = match sink.load()? {
            Some(blob) => serde_json::from_slice(&blob).map_err(|e| {
                StoreError::Serialization(format!("parsing {}: {e}", sink.location()))
            })?,
            None => Vec::new(),
        };
        log::debug!(
            "loaded {} records from {}",
            items.len(),
            sink.location()
        );
        Ok(Self {
            sink,
            table: MemoryStore::from_items(items),
            writer: Mutex::new(()),
        })
    }

    /// The sink holding the table.
    #[must_use]
    pub const fn sink(&self) -> &B {
        &self.sink
    }

    /// Runs `mutation` on a staged copy and publishes it once saved.
    fn commit(&self, mutation: impl FnOnce(&MemoryStore) -> StatusCode) -> StatusCode {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let staged = MemoryStore::from_items(self.table.snapshot());
        let status = mutation(&staged);
        if !status.is_success() {
            return status;
        }

        let items = staged.into_items();
        match self.save(&items) {
            Ok(()) => {
                self.table.replace(items);
                status
            }
            Err(e) => {
                log::error!("failed to save {}: {e}", self.sink.location());
                StatusCode::IO
            }
        }
    }

    fn save(&self, items: &[StoredItem]) -> StoreResult<()> {
        let blob = Zeroizing::new(
            serde_json::to_vec(items).map_err(|e| StoreError::Serialization(e.to_string()))?,
        );
        self.sink.save(&blob)
    }
}

impl<B: BlobSink> SecureStore for PersistedStore<B> {
    fn insert(&self, query: &ScopedQuery, item: &NewItem) -> StatusCode {
        self.commit(|table| table.insert(query, item))
    }

    fn update(&self, query: &ScopedQuery, update: &ItemUpdate) -> StatusCode {
        self.commit(|table| table.update(query, update))
    }

    fn lookup(&self, query: &ScopedQuery) -> Lookup {
        self.table.lookup(query)
    }

    fn delete(&self, query: &ScopedQuery) -> StatusCode {
        self.commit(|table| table.delete(query))
    }

    fn describe_status(&self, status: StatusCode) -> String {
        if status == StatusCode::IO {
            return format!("could not save records to {}", self.sink.location());
        }
        status.kind().message().to_owned()
    }
}
