//! The platform secure store interface.
//!
//! The storage protocol never talks to a keychain directly. Each platform
//! provides a [`SecureStore`] that executes [`ScopedQuery`] criteria and reports
//! raw status codes; translating those codes is left to the caller.

use std::sync::Arc;

use crate::accessibility::ProtectionClass;
use crate::query::ScopedQuery;
use crate::status::StatusCode;

/// Attributes of a record being inserted.
///
/// Identity attributes (key, namespace, access group, sync flag) come from the
/// accompanying query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    /// Payload bytes.
    pub value: Vec<u8>,
    /// Protection class.
    pub accessible: ProtectionClass,
}

/// Replacement attributes for an existing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemUpdate {
    /// New payload bytes.
    pub value: Vec<u8>,
    /// New protection class.
    pub accessible: ProtectionClass,
    /// New sync flag; `None` leaves it unchanged.
    pub synchronizable: Option<bool>,
}

/// One record returned by an enumerating lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    /// Record key.
    pub account: String,
    /// Payload, when requested.
    pub data: Option<Vec<u8>>,
}

/// Payload of a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LookupPayload {
    /// Nothing was requested or nothing matched.
    #[default]
    None,
    /// Payload of a single match.
    Data(Vec<u8>),
    /// Every match, for queries with [`MatchLimit::All`](crate::query::MatchLimit::All).
    Rows(Vec<ItemRow>),
}

/// Status and payload of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    /// Native status.
    pub status: StatusCode,
    /// Returned payload.
    pub payload: LookupPayload,
}

impl Lookup {
    /// Lookup that failed (or found nothing) with `status`.
    #[must_use]
    pub const fn failed(status: StatusCode) -> Self {
        Self {
            status,
            payload: LookupPayload::None,
        }
    }
}

/// Platform-provided protected credential store.
///
/// Implementations must be safe to share between threads; serialization of
/// concurrent calls is whatever the platform provides per item.
pub trait SecureStore: Send + Sync {
    /// Adds a record identified by `query` with `item` attributes.
    fn insert(&self, query: &ScopedQuery, item: &NewItem) -> StatusCode;

    /// Replaces attributes of every record matching `query`.
    fn update(&self, query: &ScopedQuery, update: &ItemUpdate) -> StatusCode;

    /// Finds records matching `query`.
    fn lookup(&self, query: &ScopedQuery) -> Lookup;

    /// Removes every record matching `query`.
    fn delete(&self, query: &ScopedQuery) -> StatusCode;

    /// Human readable description of `status`.
    fn describe_status(&self, status: StatusCode) -> String {
        status.kind().message().to_owned()
    }
}

impl<S: SecureStore + ?Sized> SecureStore for Box<S> {
    fn insert(&self, query: &ScopedQuery, item: &NewItem) -> StatusCode {
        (**self).insert(query, item)
    }

    fn update(&self, query: &ScopedQuery, update: &ItemUpdate) -> StatusCode {
        (**self).update(query, update)
    }

    fn lookup(&self, query: &ScopedQuery) -> Lookup {
        (**self).lookup(query)
    }

    fn delete(&self, query: &ScopedQuery) -> StatusCode {
        (**self).delete(query)
    }

    fn describe_status(&self, status: StatusCode) -> String {
        (**self).describe_status(status)
    }
}

impl<S: SecureStore + ?Sized> SecureStore for Arc<S> {
    fn insert(&self, query: &ScopedQuery, item: &NewItem) -> StatusCode {
        (**self).insert(query, item)
    }

    fn update(&self, query: &ScopedQuery, update: &ItemUpdate) -> StatusCode {
        (**self).update(query, update)
    }

    fn lookup(&self, query: &ScopedQuery) -> Lookup {
        (**self).lookup(query)
    }

    fn delete(&self, query: &ScopedQuery) -> StatusCode {
        (**self).delete(query)
    }

    fn describe_status(&self, status: StatusCode) -> String {
        (**self).describe_status(status)
    }
}
