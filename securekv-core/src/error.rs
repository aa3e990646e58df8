//! Error types for secure storage operations.

use std::string::FromUtf8Error;

use thiserror::Error;

use crate::status::{StatusCode, StatusKind};

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the storage protocol.
///
/// Every variant that originates in the secure store carries the raw status and
/// the store's own description of it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected the query or attributes.
    #[error("invalid parameters ({status}): {message}")]
    InvalidParameters {
        /// Raw status reported by the store.
        status: StatusCode,
        /// Store description of the status.
        message: String,
    },

    /// The store refused access to the record.
    #[error("authentication failed ({status}): {message}")]
    AuthenticationFailed {
        /// Raw status reported by the store.
        status: StatusCode,
        /// Store description of the status.
        message: String,
    },

    /// An insert raced with another insert of the same key.
    #[error("item already exists ({status}): {message}")]
    AlreadyExists {
        /// Raw status reported by the store.
        status: StatusCode,
        /// Store description of the status.
        message: String,
    },

    /// No record matched where one was required.
    #[error("item not found ({status}): {message}")]
    NotFound {
        /// Raw status reported by the store.
        status: StatusCode,
        /// Store description of the status.
        message: String,
    },

    /// A requested attribute does not exist.
    #[error("attribute missing ({status}): {message}")]
    AttributeMissing {
        /// Raw status reported by the store.
        status: StatusCode,
        /// Store description of the status.
        message: String,
    },

    /// The caller lacks the entitlement for the requested access group.
    #[error("entitlement missing ({status}): {message}")]
    EntitlementMissing {
        /// Raw status reported by the store.
        status: StatusCode,
        /// Store description of the status.
        message: String,
    },

    /// A stored payload is not valid UTF-8.
    #[error("value for key '{key}' is not valid UTF-8")]
    DecodeFailed {
        /// Key of the offending record.
        key: String,
        /// Underlying decode error.
        #[source]
        source: FromUtf8Error,
    },

    /// The store reported success but returned a payload of the wrong shape.
    #[error("unexpected payload from secure store: {0}")]
    UnexpectedPayload(String),

    /// A status outside the known table.
    #[error("unknown secure store status {code}: {message}")]
    Unknown {
        /// Raw status code.
        code: i32,
        /// Store description of the status.
        message: String,
    },

    /// Filesystem failure in a file-backed store.
    #[error("I/O error during {context}: {source}")]
    Io {
        /// Operation being performed.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization or option parsing failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Platform credential service failure outside the status table.
    #[error("credential service error during {context}: {message}")]
    Backend {
        /// Operation being performed.
        context: String,
        /// Service description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Builds the error for a failed native status.
    ///
    /// Returns `None` for a successful status.
    #[must_use]
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Option<Self> {
        let message = message.into();
        let err = match status.kind() {
            StatusKind::Success => return None,
            StatusKind::InvalidParameters => Self::InvalidParameters { status, message },
            StatusKind::AuthenticationFailed => Self::AuthenticationFailed { status, message },
            StatusKind::AlreadyExists => Self::AlreadyExists { status, message },
            StatusKind::NotFound => Self::NotFound { status, message },
            StatusKind::AttributeMissing => Self::AttributeMissing { status, message },
            StatusKind::EntitlementMissing => Self::EntitlementMissing { status, message },
            StatusKind::Unknown(code) => Self::Unknown { code, message },
        };
        Some(err)
    }

    /// Creates an I/O error with context.
    #[must_use]
    pub fn io<S: Into<String>>(context: S, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns the raw store status behind this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::InvalidParameters { status, .. }
            | Self::AuthenticationFailed { status, .. }
            | Self::AlreadyExists { status, .. }
            | Self::NotFound { status, .. }
            | Self::AttributeMissing { status, .. }
            | Self::EntitlementMissing { status, .. } => Some(*status),
            Self::Unknown { code, .. } => Some(StatusCode(*code)),
            Self::DecodeFailed { .. }
            | Self::UnexpectedPayload(_)
            | Self::Io { .. }
            | Self::Serialization(_)
            | Self::Backend { .. } => None,
        }
    }

    /// Returns `true` for the outcomes of a lost check-then-write race.
    ///
    /// A caller seeing this may repeat the write: the next check observes the
    /// state the competing writer left behind.
    #[must_use]
    pub const fn is_write_conflict(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. } | Self::NotFound { .. })
    }
}
