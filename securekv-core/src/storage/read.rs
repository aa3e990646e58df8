use std::collections::BTreeMap;

use super::{DecodePolicy, SecureStorage};
use crate::error::{StoreError, StoreResult};
use crate::partition::StorageOptions;
use crate::query::ScopedQuery;
use crate::status::StatusCode;
use crate::store::{ItemRow, LookupPayload, SecureStore};

impl<S: SecureStore> SecureStorage<S> {
    /// Reads the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the partition holds no such key.
    ///
    /// # Errors
    ///
    /// Returns the translated store status for any failure other than "not
    /// found", and [`StoreError::DecodeFailed`] if the payload is not UTF-8.
    pub fn read(&self, key: &str, options: &StorageOptions) -> StoreResult<Option<String>> {
        let partition = options.partition();
        let query = ScopedQuery::build(Some(key), &partition, true, false);
        log::debug!("read key={key} namespace={:?}", partition.namespace);

        let lookup = self.store.lookup(&query);
        if lookup.status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.check(lookup.status)?;

        match lookup.payload {
            LookupPayload::Data(bytes) => String::from_utf8(bytes).map(Some).map_err(|source| {
                StoreError::DecodeFailed {
                    key: key.to_owned(),
                    source,
                }
            }),
            LookupPayload::None => Err(StoreError::UnexpectedPayload(format!(
                "lookup of '{key}' succeeded without data"
            ))),
            LookupPayload::Rows(_) => Err(StoreError::UnexpectedPayload(format!(
                "lookup of '{key}' returned multiple rows"
            ))),
        }
    }

    /// Reads every key and value in the partition named by `options`.
    ///
    /// An empty partition yields an empty map. Rows whose payload is not UTF-8
    /// are handled per [`StorageConfig::read_all_decode`](super::StorageConfig).
    /// If the partition leaves `synchronizable` unset and the same key exists
    /// both as a synchronizable and a local record, the later row wins.
    ///
    /// # Errors
    ///
    /// Returns the translated store status for any failure other than "not
    /// found", and [`StoreError::DecodeFailed`] under [`DecodePolicy::Fail`].
    pub fn read_all(&self, options: &StorageOptions) -> StoreResult<BTreeMap<String, String>> {
        let partition = options.partition();
        let query = ScopedQuery::build(None, &partition, true, true);
        log::debug!("read_all namespace={:?}", partition.namespace);

        let lookup = self.store.lookup(&query);
        if lookup.status == StatusCode::NOT_FOUND {
            return Ok(BTreeMap::new());
        }
        self.check(lookup.status)?;

        let rows = match lookup.payload {
            LookupPayload::Rows(rows) => rows,
            LookupPayload::None => Vec::new(),
            LookupPayload::Data(_) => {
                return Err(StoreError::UnexpectedPayload(
                    "enumeration returned a single payload".to_owned(),
                ))
            }
        };

        let mut values = BTreeMap::new();
        for ItemRow { account, data } in rows {
            let Some(data) = data else {
                return Err(StoreError::UnexpectedPayload(format!(
                    "enumerated row '{account}' has no data"
                )));
            };
            match String::from_utf8(data) {
                Ok(value) => {
                    values.insert(account, value);
                }
                Err(source) => match self.config.read_all_decode {
                    DecodePolicy::EmptyString => {
                        log::warn!("value for key '{account}' is not UTF-8, reporting it as empty");
                        values.insert(account, String::new());
                    }
                    DecodePolicy::Skip => {
                        log::warn!("value for key '{account}' is not UTF-8, skipping it");
                    }
                    DecodePolicy::Fail => {
                        return Err(StoreError::DecodeFailed {
                            key: account,
                            source,
                        })
                    }
                },
            }
        }
        Ok(values)
    }
}
