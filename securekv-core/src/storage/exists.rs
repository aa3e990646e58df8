use super::SecureStorage;
use crate::error::StoreResult;
use crate::partition::{Partition, StorageOptions};
use crate::query::ScopedQuery;
use crate::status::StatusKind;
use crate::store::SecureStore;

impl<S: SecureStore> SecureStorage<S> {
    /// Returns whether `key` exists in the partition named by `options`.
    ///
    /// # Errors
    ///
    /// Any store status other than success or "not found" is returned as an
    /// error. An inaccessible record is never reported as absent.
    pub fn contains_key(&self, key: &str, options: &StorageOptions) -> StoreResult<bool> {
        self.exists(key, &options.partition())
    }

    /// Checks for `key` without fetching its payload.
    pub(super) fn exists(&self, key: &str, partition: &Partition) -> StoreResult<bool> {
        let query = ScopedQuery::builder(partition).key(key).match_one().finish();
        let status = self.store.lookup(&query).status;
        if status.kind() == StatusKind::NotFound {
            return Ok(false);
        }
        self.check(status).map(|()| true)
    }
}
