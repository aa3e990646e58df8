//! Scoped query construction.
//!
//! A [`ScopedQuery`] is the criterion handed to the secure store for a single
//! call. It is built fresh for every operation and never persisted.

use crate::accessibility::ProtectionClass;
use crate::partition::Partition;

/// Collection discriminator. Every record this crate manages is a generic password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ItemClass {
    /// `kSecClassGenericPassword`
    #[default]
    GenericPassword,
}

/// How many matches a lookup may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchLimit {
    /// At most one match.
    One,
    /// Every match.
    All,
}

/// Read-only criterion for one store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedQuery {
    /// Collection discriminator, always present.
    pub class: ItemClass,
    /// Record key (`kSecAttrAccount`).
    pub account: Option<String>,
    /// Namespace (`kSecAttrService`).
    pub service: Option<String>,
    /// Access group (`kSecAttrAccessGroup`).
    pub access_group: Option<String>,
    /// Sync criterion. `None` matches synchronizable and local records alike.
    pub synchronizable: Option<bool>,
    /// Protection class criterion.
    pub accessible: Option<ProtectionClass>,
    /// Return payload bytes.
    pub return_data: bool,
    /// Return record attributes (needed to recover keys when enumerating).
    pub return_attributes: bool,
    /// Match limit, if any.
    pub match_limit: Option<MatchLimit>,
}

impl ScopedQuery {
    /// Starts a query over `partition`.
    #[must_use]
    pub fn builder(partition: &Partition) -> QueryBuilder {
        QueryBuilder::new(partition)
    }

    /// Builds a query in one call.
    ///
    /// `want_value` requests the payload; `want_all` requests every match with
    /// attributes. The two are independent.
    #[must_use]
    pub fn build(
        key: Option<&str>,
        partition: &Partition,
        want_value: bool,
        want_all: bool,
    ) -> Self {
        let mut builder = QueryBuilder::new(partition).return_data(want_value);
        if let Some(key) = key {
            builder = builder.key(key);
        }
        if want_all {
            builder = builder.match_all();
        }
        builder.finish()
    }
}

/// Incremental builder for [`ScopedQuery`].
#[derive(Debug, Clone)]
#[must_use]
pub struct QueryBuilder {
    query: ScopedQuery,
}

impl QueryBuilder {
    /// Builder seeded with the partition criteria.
    pub fn new(partition: &Partition) -> Self {
        Self {
            query: ScopedQuery {
                class: ItemClass::GenericPassword,
                account: None,
                service: partition.namespace.clone(),
                access_group: partition.access_group.clone(),
                synchronizable: partition.synchronizable,
                accessible: None,
                return_data: false,
                return_attributes: false,
                match_limit: None,
            },
        }
    }

    /// Restricts the query to a single key.
    pub fn key(mut self, key: &str) -> Self {
        self.query.account = Some(key.to_owned());
        self
    }

    /// Adds a protection-class criterion.
    pub const fn accessible(mut self, class: ProtectionClass) -> Self {
        self.query.accessible = Some(class);
        self
    }

    /// Requests the payload bytes.
    pub const fn return_data(mut self, yes: bool) -> Self {
        self.query.return_data = yes;
        self
    }

    /// Requests every match together with its attributes.
    pub const fn match_all(mut self) -> Self {
        self.query.match_limit = Some(MatchLimit::All);
        self.query.return_attributes = true;
        self
    }

    /// Limits the lookup to a single match.
    pub const fn match_one(mut self) -> Self {
        self.query.match_limit = Some(MatchLimit::One);
        self
    }

    /// Finishes the query.
    #[must_use]
    pub fn finish(self) -> ScopedQuery {
        self.query
    }
}
