use super::SecureStorage;
use crate::error::StoreResult;
use crate::partition::StorageOptions;
use crate::query::ScopedQuery;
use crate::store::SecureStore;

impl<S: SecureStore> SecureStorage<S> {
    /// Deletes `key`. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns the translated store status for any failure other than "not found".
    pub fn delete(&self, key: &str, options: &StorageOptions) -> StoreResult<()> {
        let partition = options.partition();
        log::debug!("delete key={key} namespace={:?}", partition.namespace);
        let query = ScopedQuery::build(Some(key), &partition, false, false);
        self.check_absent_ok(self.store.delete(&query))
    }

    /// Deletes every record in the partition named by `options`.
    ///
    /// Criteria left unset in `options` are not applied, so options without a
    /// namespace address every namespace the store exposes to this application.
    ///
    /// # Errors
    ///
    /// Returns the translated store status for any failure other than "not found".
    pub fn delete_all(&self, options: &StorageOptions) -> StoreResult<()> {
        let partition = options.partition();
        log::debug!("delete_all namespace={:?}", partition.namespace);
        let query = ScopedQuery::build(None, &partition, false, false);
        self.check_absent_ok(self.store.delete(&query))
    }
}
