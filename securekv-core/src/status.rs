//! Native status codes and their translation into the closed error taxonomy.
//!
//! Secure stores report every outcome as a signed 32-bit status (an `OSStatus`
//! on Apple platforms). Only a handful of codes carry meaning for the storage
//! protocol; everything else is passed through as [`StatusKind::Unknown`] with
//! the raw code intact so that it can still be diagnosed.

use std::fmt;

/// Raw status code reported by a [`SecureStore`](crate::SecureStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub i32);

impl StatusCode {
    /// The operation completed.
    pub const SUCCESS: Self = Self(0);
    /// One or more parameters were not valid (`errSecParam`).
    pub const INVALID_PARAMETERS: Self = Self(-50);
    /// The user name or passphrase was not correct (`errSecAuthFailed`).
    pub const AUTHENTICATION_FAILED: Self = Self(-25293);
    /// The item already exists (`errSecDuplicateItem`).
    pub const ALREADY_EXISTS: Self = Self(-25299);
    /// The item could not be found (`errSecItemNotFound`).
    pub const NOT_FOUND: Self = Self(-25300);
    /// The attribute does not exist (`errSecNoSuchAttr`).
    pub const ATTRIBUTE_MISSING: Self = Self(-25303);
    /// A required entitlement is not present (`errSecMissingEntitlement`).
    pub const ENTITLEMENT_MISSING: Self = Self(-34018);
    /// An I/O error occurred (`errSecIO`). Not part of the closed table.
    pub const IO: Self = Self(-36);

    /// Returns the raw status value.
    #[must_use]
    pub const fn code(self) -> i32 {
        self.0
    }

    /// Returns `true` if the status reports success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == Self::SUCCESS.0
    }

    /// Translates the status into its taxonomy entry.
    #[must_use]
    pub const fn kind(self) -> StatusKind {
        translate(self)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for StatusCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

/// Taxonomy entry for a native status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// The call succeeded.
    Success,
    /// The store rejected the query or attributes.
    InvalidParameters,
    /// The store refused access.
    AuthenticationFailed,
    /// A record with the same identity already exists.
    AlreadyExists,
    /// No record matched.
    NotFound,
    /// A requested attribute does not exist.
    AttributeMissing,
    /// The calling binary lacks the entitlement for the access group.
    EntitlementMissing,
    /// Any status outside the table, with the raw code preserved.
    Unknown(i32),
}

impl StatusKind {
    /// Canonical description of the status.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Success => "No error.",
            Self::InvalidParameters => {
                "One or more parameters passed to a function were not valid."
            }
            Self::AuthenticationFailed => {
                "The user name or passphrase you entered is not correct."
            }
            Self::AlreadyExists => "The specified item already exists in the keychain.",
            Self::NotFound => "The specified item could not be found in the keychain.",
            Self::AttributeMissing => "The specified attribute does not exist.",
            Self::EntitlementMissing => "A required entitlement isn't present.",
            Self::Unknown(_) => "Unrecognized secure store status.",
        }
    }
}

/// Maps a native status onto the closed taxonomy.
#[must_use]
pub const fn translate(status: StatusCode) -> StatusKind {
    match status.0 {
        0 => StatusKind::Success,
        -50 => StatusKind::InvalidParameters,
        -25293 => StatusKind::AuthenticationFailed,
        -25299 => StatusKind::AlreadyExists,
        -25300 => StatusKind::NotFound,
        -25303 => StatusKind::AttributeMissing,
        -34018 => StatusKind::EntitlementMissing,
        other => StatusKind::Unknown(other),
    }
}
