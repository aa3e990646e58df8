//! Platform credential service backend built on the `keyring` crate.
//!
//! Secret Service style stores hold opaque secrets under a service and user
//! name and cannot be queried by attributes. [`KeyringStore`] therefore keeps
//! the whole record table of a label as one JSON secret in a single entry
//! (service = label, user = `records`) and applies the keychain matching rules
//! in process. Separate labels are separate tables.
//!
//! Supported services:
//! - Linux: kernel keyutils
//! - macOS: Keychain Services (one generic password holding the table)
//! - Windows: Credential Manager, whose 2560 byte limit bounds the table size

use zeroize::Zeroizing;

use crate::error::{StoreError, StoreResult};
use crate::persisted::{BlobSink, PersistedStore};

/// Label used when the host does not pick one.
pub const DEFAULT_LABEL: &str = "securekv";

const TABLE_USER: &str = "records";

/// Record table kept in a platform credential service.
pub type KeyringStore = PersistedStore<KeyringBlob>;

/// One credential entry holding a serialized table.
#[derive(Debug)]
pub struct KeyringBlob {
    label: String,
    entry: keyring::Entry,
}

impl KeyringBlob {
    /// Binds to the entry for `label` without touching the service.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the service or user name.
    pub fn new(label: impl Into<String>) -> StoreResult<Self> {
        let label = label.into();
        let entry = keyring::Entry::new(&label, TABLE_USER).map_err(|e| backend("opening", &e))?;
        Ok(Self { label, entry })
    }

    /// Label naming the table.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The underlying credential entry.
    #[must_use]
    pub const fn entry(&self) -> &keyring::Entry {
        &self.entry
    }
}

fn backend(context: &str, err: &keyring::Error) -> StoreError {
    StoreError::Backend {
        context: context.to_owned(),
        message: err.to_string(),
    }
}

impl BlobSink for KeyringBlob {
    fn load(&self) -> StoreResult<Option<Zeroizing<Vec<u8>>>> {
        match self.entry.get_secret() {
            Ok(secret) => Ok(Some(Zeroizing::new(secret))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(backend("loading", &e)),
        }
    }

    fn save(&self, blob: &[u8]) -> StoreResult<()> {
        self.entry
            .set_secret(blob)
            .map_err(|e| backend("saving", &e))
    }

    fn location(&self) -> String {
        format!("credential '{}/{TABLE_USER}'", self.label)
    }
}

impl PersistedStore<KeyringBlob> {
    /// Opens the table stored under `label`, starting empty if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential service is unavailable or holds a
    /// table that cannot be parsed.
    pub fn open(label: impl Into<String>) -> StoreResult<Self> {
        Self::with_sink(KeyringBlob::new(label)?)
    }

    /// Label naming the table.
    #[must_use]
    pub fn label(&self) -> &str {
        self.sink().label()
    }
}
