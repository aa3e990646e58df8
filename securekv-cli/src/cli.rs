// Command-line interface using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use securekv_core::{DecodePolicy, StorageConfig, StorageOptions};

/// SecureKV developer CLI: inspect and edit namespaced secrets.
#[derive(Parser, Debug)]
#[command(name = "securekv")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Root directory of the file-backed store (defaults to the platform data directory).
    #[arg(long, env = "SECUREKV_ROOT", global = true)]
    pub root: Option<PathBuf>,

    /// Namespace (service label) to operate on.
    #[arg(long, global = true)]
    pub namespace: Option<String>,

    /// Access group shared between related applications.
    #[arg(long, global = true)]
    pub access_group: Option<String>,

    /// Restrict to synchronizable (`true`) or local (`false`) records; omit for both.
    #[arg(long, global = true, value_name = "BOOL")]
    pub synchronizable: Option<bool>,

    /// Accessibility for writes: unlocked, `unlocked_this_device`, `first_unlock`,
    /// `first_unlock_this_device` or passcode.
    #[arg(long, global = true)]
    pub accessibility: Option<String>,

    /// Fail `read-all` on values that are not valid UTF-8 instead of reporting them as empty.
    #[arg(long, global = true)]
    pub strict_decode: bool,

    /// Use the system keychain instead of the file-backed store.
    #[cfg(all(target_vendor = "apple", feature = "platform-apple"))]
    #[arg(long, global = true)]
    pub keychain: bool,

    /// Use the platform credential service, keeping the table under LABEL
    /// (`--keyring=LABEL`; defaults to `securekv`).
    #[cfg(feature = "platform-keyring")]
    #[arg(
        long,
        global = true,
        value_name = "LABEL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = securekv_core::DEFAULT_LABEL
    )]
    pub keyring: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Storage operation to run.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value stored under a key. Prints nothing when it is absent.
    Read {
        /// Record key.
        key: String,
    },

    /// Store a value, replacing any existing one.
    Write {
        /// Record key.
        key: String,
        /// Value to store. Mind your shell history.
        value: String,
    },

    /// Remove a key. Succeeds when the key is absent.
    Delete {
        /// Record key.
        key: String,
    },

    /// Remove every key in the namespace.
    DeleteAll,

    /// Print every key and value in the namespace as JSON.
    ReadAll,

    /// Print whether a key is present.
    Contains {
        /// Record key.
        key: String,
    },
}

impl Cli {
    /// Partition and accessibility selected by the global flags.
    #[must_use]
    pub fn options(&self) -> StorageOptions {
        StorageOptions {
            namespace: self.namespace.clone(),
            access_group: self.access_group.clone(),
            synchronizable: self.synchronizable,
            accessibility: self.accessibility.clone(),
        }
    }

    /// Storage configuration selected by the global flags.
    #[must_use]
    pub fn config(&self) -> StorageConfig {
        StorageConfig {
            read_all_decode: if self.strict_decode {
                DecodePolicy::Fail
            } else {
                DecodePolicy::default()
            },
        }
    }
}
