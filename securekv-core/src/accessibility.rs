//! Accessibility policy: when a stored record may be read, in terms of device lock state.

use std::str::FromStr;

use strum::{AsRefStr, EnumIter, EnumString};

/// Protection level requested for a record.
///
/// Parsed from the symbolic names host applications pass in
/// ([`AccessibilityLevel::resolve`]); anything unrecognized falls back to
/// [`AccessibilityLevel::WhenUnlocked`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum AccessibilityLevel {
    /// Readable while the device is unlocked. Migrates with backups.
    #[default]
    #[strum(serialize = "unlocked")]
    WhenUnlocked,
    /// Readable while the device is unlocked. Never leaves this device.
    #[strum(serialize = "unlocked_this_device")]
    WhenUnlockedThisDeviceOnly,
    /// Readable after the first unlock following a restart.
    #[strum(serialize = "first_unlock")]
    AfterFirstUnlock,
    /// Readable after the first unlock following a restart. Never leaves this device.
    #[strum(serialize = "first_unlock_this_device")]
    AfterFirstUnlockThisDeviceOnly,
    /// Readable while unlocked, and only while a passcode is set.
    #[strum(serialize = "passcode")]
    WhenPasscodeSetThisDeviceOnly,
}

impl AccessibilityLevel {
    /// Resolves a symbolic name, falling back to [`Self::WhenUnlocked`].
    ///
    /// `None` and unrecognized names both resolve to the default; an
    /// unrecognized name is logged since it usually points at a typo in the
    /// calling application.
    #[must_use]
    pub fn resolve(name: Option<&str>) -> Self {
        let Some(name) = name else {
            return Self::default();
        };
        Self::from_str(name).unwrap_or_else(|_| {
            log::warn!("unrecognized accessibility '{name}', using 'unlocked'");
            Self::default()
        })
    }

    /// Store-level protection class for this level.
    #[must_use]
    pub const fn protection_class(self) -> ProtectionClass {
        match self {
            Self::WhenUnlocked => ProtectionClass::WHEN_UNLOCKED,
            Self::WhenUnlockedThisDeviceOnly => ProtectionClass::WHEN_UNLOCKED_THIS_DEVICE_ONLY,
            Self::AfterFirstUnlock => ProtectionClass::AFTER_FIRST_UNLOCK,
            Self::AfterFirstUnlockThisDeviceOnly => {
                ProtectionClass::AFTER_FIRST_UNLOCK_THIS_DEVICE_ONLY
            }
            Self::WhenPasscodeSetThisDeviceOnly => {
                ProtectionClass::WHEN_PASSCODE_SET_THIS_DEVICE_ONLY
            }
        }
    }
}

/// Protection class as the secure store names it.
///
/// The values are the raw `kSecAttrAccessible*` constants used by Keychain
/// Services, which the other backends reuse verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtectionClass(&'static str);

impl ProtectionClass {
    /// `kSecAttrAccessibleWhenUnlocked`
    pub const WHEN_UNLOCKED: Self = Self("ak");
    /// `kSecAttrAccessibleWhenUnlockedThisDeviceOnly`
    pub const WHEN_UNLOCKED_THIS_DEVICE_ONLY: Self = Self("aku");
    /// `kSecAttrAccessibleAfterFirstUnlock`
    pub const AFTER_FIRST_UNLOCK: Self = Self("ck");
    /// `kSecAttrAccessibleAfterFirstUnlockThisDeviceOnly`
    pub const AFTER_FIRST_UNLOCK_THIS_DEVICE_ONLY: Self = Self("cku");
    /// `kSecAttrAccessibleWhenPasscodeSetThisDeviceOnly`
    pub const WHEN_PASSCODE_SET_THIS_DEVICE_ONLY: Self = Self("akpu");

    /// Raw store value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;
    use test_case::test_case;

    use super::*;

    #[test_case("passcode", AccessibilityLevel::WhenPasscodeSetThisDeviceOnly)]
    #[test_case("unlocked", AccessibilityLevel::WhenUnlocked)]
    #[test_case("unlocked_this_device", AccessibilityLevel::WhenUnlockedThisDeviceOnly)]
    #[test_case("first_unlock", AccessibilityLevel::AfterFirstUnlock)]
    #[test_case("first_unlock_this_device", AccessibilityLevel::AfterFirstUnlockThisDeviceOnly)]
    fn test_resolve_known_names(name: &str, expected: AccessibilityLevel) {
        assert_eq!(AccessibilityLevel::resolve(Some(name)), expected);
        assert_eq!(expected.as_ref(), name);
    }

    #[test_case(None)]
    #[test_case(Some("bogus"))]
    #[test_case(Some(""))]
    #[test_case(Some("UNLOCKED"))]
    fn test_resolve_falls_back_to_when_unlocked(name: Option<&str>) {
        assert_eq!(
            AccessibilityLevel::resolve(name),
            AccessibilityLevel::WhenUnlocked
        );
    }

    #[test]
    fn test_protection_classes_are_distinct() {
        let classes: Vec<_> = AccessibilityLevel::iter()
            .map(|level| level.protection_class().as_str())
            .collect();
        let mut deduped = classes.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(classes.len(), deduped.len());
        assert_eq!(
            AccessibilityLevel::WhenUnlocked.protection_class(),
            ProtectionClass::WHEN_UNLOCKED
        );
    }
}
