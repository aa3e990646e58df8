use super::SecureStorage;
use crate::accessibility::AccessibilityLevel;
use crate::error::StoreResult;
use crate::partition::{Partition, StorageOptions};
use crate::query::ScopedQuery;
use crate::store::{ItemUpdate, NewItem, SecureStore};

impl<S: SecureStore> SecureStorage<S> {
    /// Stores `value` under `key`, replacing any existing value.
    ///
    /// The accessibility in `options` is resolved leniently: an unknown name
    /// stores the record as [`AccessibilityLevel::WhenUnlocked`].
    ///
    /// # Errors
    ///
    /// Propagates existence check failures unchanged. A write racing another writer may
    /// fail with [`StoreError::AlreadyExists`](crate::StoreError::AlreadyExists)
    /// (both inserted) or [`StoreError::NotFound`](crate::StoreError::NotFound)
    /// (the record was deleted between the check and the update); repeating the write
    /// resolves either.
    pub fn write(&self, key: &str, value: &str, options: &StorageOptions) -> StoreResult<()> {
        self.write_at_level(key, value, &options.partition(), options.accessibility_level())
    }

    /// Upsert with an already resolved accessibility level.
    ///
    /// # Errors
    ///
    /// See [`Self::write`].
    pub fn write_at_level(
        &self,
        key: &str,
        value: &str,
        partition: &Partition,
        level: AccessibilityLevel,
    ) -> StoreResult<()> {
        let accessible = level.protection_class();
        let exists = self.exists(key, partition)?;
        let query = ScopedQuery::builder(partition).key(key).finish();

        log::debug!(
            "write key={key} namespace={:?} exists={exists} accessibility={}",
            partition.namespace,
            level.as_ref()
        );

        let status = if exists {
            self.store.update(
                &query,
                &ItemUpdate {
                    value: value.as_bytes().to_vec(),
                    accessible,
                    synchronizable: partition.synchronizable,
                },
            )
        } else {
            self.store.insert(
                &query,
                &NewItem {
                    value: value.as_bytes().to_vec(),
                    accessible,
                },
            )
        };
        self.check(status)
    }
}
