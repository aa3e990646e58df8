//! In-memory secure store for testing.
//!
//! [`MemoryStore`] emulates the Keychain Services semantics the storage
//! protocol depends on: records are unique on
//! `(account, service, access group, synchronizable)`, omitted query criteria
//! match anything, and every miss reports `errSecItemNotFound`. It offers no
//! protection whatsoever and is NOT meant for production use.
//!
//! Test hooks allow failing the next call of an operation with an arbitrary
//! status, running code right before the next call (to stage races), and
//! wiping the whole store the way an OS-level keychain reset would.

#![allow(clippy::significant_drop_tightening)]

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::query::{MatchLimit, ScopedQuery};
use crate::status::StatusCode;
use crate::store::{ItemRow, ItemUpdate, Lookup, LookupPayload, NewItem, SecureStore};

/// Store operation, used to target test hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`SecureStore::insert`]
    Insert,
    /// [`SecureStore::update`]
    Update,
    /// [`SecureStore::lookup`]
    Lookup,
    /// [`SecureStore::delete`]
    Delete,
}

type Hook = Box<dyn FnOnce(&MemoryStore) + Send>;

/// A stored record.
#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct StoredItem {
    account: String,
    service: Option<String>,
    access_group: Option<String>,
    synchronizable: bool,
    accessible: String,
    value: Zeroizing<Vec<u8>>,
}

impl StoredItem {
    fn identity(&self) -> (&str, Option<&str>, Option<&str>, bool) {
        (
            &self.account,
            self.service.as_deref(),
            self.access_group.as_deref(),
            self.synchronizable,
        )
    }

    fn matches(&self, query: &ScopedQuery) -> bool {
        criterion(query.account.as_deref(), self.account.as_str())
            && criterion(query.service.as_deref().map(Some), self.service.as_deref())
            && criterion(
                query.access_group.as_deref().map(Some),
                self.access_group.as_deref(),
            )
            && criterion(query.synchronizable, self.synchronizable)
            && criterion(
                query.accessible.map(crate::accessibility::ProtectionClass::as_str),
                self.accessible.as_str(),
            )
    }
}

impl fmt::Debug for StoredItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredItem")
            .field("account", &self.account)
            .field("service", &self.service)
            .field("access_group", &self.access_group)
            .field("synchronizable", &self.synchronizable)
            .field("accessible", &self.accessible)
            .finish_non_exhaustive()
    }
}

/// An omitted criterion matches any value.
fn criterion<T: PartialEq>(wanted: Option<T>, actual: T) -> bool {
    wanted.map_or(true, |wanted| wanted == actual)
}

/// In-memory [`SecureStore`] with keychain semantics.
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<Vec<StoredItem>>,
    failures: Mutex<HashMap<Operation, VecDeque<StatusCode>>>,
    hooks: Mutex<HashMap<Operation, VecDeque<Hook>>>,
    calls: Mutex<HashMap<Operation, usize>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_items(items: Vec<StoredItem>) -> Self {
        Self {
            items: RwLock::new(items),
            ..Self::default()
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<StoredItem> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn into_items(self) -> Vec<StoredItem> {
        self.items
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Swaps in a whole table at once.
    pub(crate) fn replace(&self, items: Vec<StoredItem>) {
        *self.items.write().unwrap_or_else(PoisonError::into_inner) = items;
    }

    /// Number of stored records across all partitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every record, as an app reinstall or keychain reset would.
    pub fn clear(&self) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Makes the next call of `operation` return `status` without touching the records.
    pub fn fail_next(&self, operation: Operation, status: StatusCode) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(operation)
            .or_default()
            .push_back(status);
    }

    /// Runs `hook` right before the next call of `operation` executes.
    ///
    /// The hook receives the store and may call into it, which is how tests
    /// stage a competing writer between the existence check and the following write.
    pub fn before_next<F>(&self, operation: Operation, hook: F)
    where
        F: FnOnce(&Self) + Send + 'static,
    {
        self.hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(operation)
            .or_default()
            .push_back(Box::new(hook));
    }

    /// Raw protection class of the first record matching `query`.
    #[must_use]
    pub fn protection_of(&self, query: &ScopedQuery) -> Option<String> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|item| item.matches(query))
            .map(|item| item.accessible.clone())
    }

    /// Number of calls made for `operation` so far.
    #[must_use]
    pub fn calls(&self, operation: Operation) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    /// Records the call, runs a pending hook and returns an injected failure, if any.
    fn enter(&self, operation: Operation) -> Option<StatusCode> {
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(operation)
            .or_default() += 1;

        let hook = self
            .hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        if let Some(hook) = hook {
            hook(self);
        }

        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("items", &self.len())
            .finish_non_exhaustive()
    }
}

impl SecureStore for MemoryStore {
    fn insert(&self, query: &ScopedQuery, item: &NewItem) -> StatusCode {
        if let Some(status) = self.enter(Operation::Insert) {
            return status;
        }
        let Some(account) = query.account.clone() else {
            return StatusCode::INVALID_PARAMETERS;
        };
        if query.match_limit.is_some() || query.return_data || query.return_attributes {
            return StatusCode::INVALID_PARAMETERS;
        }

        let new_item = StoredItem {
            account,
            service: query.service.clone(),
            access_group: query.access_group.clone(),
            synchronizable: query.synchronizable.unwrap_or(false),
            accessible: item.accessible.as_str().to_owned(),
            value: Zeroizing::new(item.value.clone()),
        };

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        if items
            .iter()
            .any(|existing| existing.identity() == new_item.identity())
        {
            return StatusCode::ALREADY_EXISTS;
        }
        items.push(new_item);
        StatusCode::SUCCESS
    }

    fn update(&self, query: &ScopedQuery, update: &ItemUpdate) -> StatusCode {
        if let Some(status) = self.enter(Operation::Update) {
            return status;
        }

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let matched: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.matches(query))
            .map(|(index, _)| index)
            .collect();
        if matched.is_empty() {
            return StatusCode::NOT_FOUND;
        }

        // Flipping the sync flag changes record identity and may collide.
        if let Some(synchronizable) = update.synchronizable {
            let collides = matched.iter().any(|&index| {
                let item = &items[index];
                items.iter().enumerate().any(|(other, candidate)| {
                    !matched.contains(&other)
                        && candidate.account == item.account
                        && candidate.service == item.service
                        && candidate.access_group == item.access_group
                        && candidate.synchronizable == synchronizable
                })
            });
            if collides {
                return StatusCode::ALREADY_EXISTS;
            }
        }

        for index in matched {
            let item = &mut items[index];
            item.value = Zeroizing::new(update.value.clone());
            update.accessible.as_str().clone_into(&mut item.accessible);
            if let Some(synchronizable) = update.synchronizable {
                item.synchronizable = synchronizable;
            }
        }
        StatusCode::SUCCESS
    }

    fn lookup(&self, query: &ScopedQuery) -> Lookup {
        if let Some(status) = self.enter(Operation::Lookup) {
            return Lookup::failed(status);
        }

        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        let mut matches = items.iter().filter(|item| item.matches(query)).peekable();
        if matches.peek().is_none() {
            return Lookup::failed(StatusCode::NOT_FOUND);
        }

        let payload = if query.match_limit == Some(MatchLimit::All) {
            LookupPayload::Rows(
                matches
                    .map(|item| ItemRow {
                        account: item.account.clone(),
                        data: query.return_data.then(|| item.value.to_vec()),
                    })
                    .collect(),
            )
        } else if query.return_data {
            matches
                .next()
                .map_or(LookupPayload::None, |item| LookupPayload::Data(item.value.to_vec()))
        } else {
            LookupPayload::None
        };

        Lookup {
            status: StatusCode::SUCCESS,
            payload,
        }
    }

    fn delete(&self, query: &ScopedQuery) -> StatusCode {
        if let Some(status) = self.enter(Operation::Delete) {
            return status;
        }

        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let before = items.len();
        items.retain(|item| !item.matches(query));
        if items.len() == before {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::SUCCESS
        }
    }
}
