//! Partitions and the per-call options bundle.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::accessibility::AccessibilityLevel;
use crate::error::{StoreError, StoreResult};
use crate::status::StatusCode;

/// Isolated logical collection of records. Keys are unique only within a partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    /// Service label separating otherwise colliding key spaces.
    pub namespace: Option<String>,
    /// Sharing scope across related applications.
    pub access_group: Option<String>,
    /// Cloud sync participation. `None` matches records in either state.
    pub synchronizable: Option<bool>,
}

impl Partition {
    /// Partition scoped to `namespace` only.
    #[must_use]
    pub fn namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Self::default()
        }
    }

    /// Sets the access group.
    #[must_use]
    pub fn with_access_group(mut self, access_group: impl Into<String>) -> Self {
        self.access_group = Some(access_group.into());
        self
    }

    /// Sets the synchronizable flag explicitly.
    #[must_use]
    pub const fn with_synchronizable(mut self, synchronizable: bool) -> Self {
        self.synchronizable = Some(synchronizable);
        self
    }
}

/// Options accompanying every call: the partition plus the requested accessibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageOptions {
    /// Service label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Access group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_group: Option<String>,
    /// Synchronizable flag; absent means "either".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synchronizable: Option<bool>,
    /// Symbolic accessibility name, resolved leniently on write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<String>,
}

impl StorageOptions {
    /// Options scoped to `namespace` only.
    #[must_use]
    pub fn namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Self::default()
        }
    }

    /// Sets the symbolic accessibility name.
    #[must_use]
    pub fn with_accessibility(mut self, accessibility: impl Into<String>) -> Self {
        self.accessibility = Some(accessibility.into());
        self
    }

    /// Partition these options address.
    ///
    /// An empty namespace or access group counts as unset, the same way
    /// [`Self::from_channel_map`] reads empty values.
    #[must_use]
    pub fn partition(&self) -> Partition {
        let present = |value: &Option<String>| value.clone().filter(|value| !value.is_empty());
        Partition {
            namespace: present(&self.namespace),
            access_group: present(&self.access_group),
            synchronizable: self.synchronizable,
        }
    }

    /// Accessibility resolved with the lenient fallback.
    #[must_use]
    pub fn accessibility_level(&self) -> AccessibilityLevel {
        AccessibilityLevel::resolve(self.accessibility.as_deref())
    }

    /// Parses the string-typed option map host bridges deliver.
    ///
    /// Accepts `namespace`/`accountName`, `accessGroup`/`groupId`,
    /// `synchronizable` as `"true"`/`"false"`, and `accessibility`. Empty
    /// strings count as absent. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidParameters`] if `synchronizable` is not a boolean.
    pub fn from_channel_map(map: &HashMap<String, String>) -> StoreResult<Self> {
        let get = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| map.get(*name))
                .find(|value| !value.is_empty())
                .cloned()
        };

        let synchronizable = match get(&["synchronizable"]) {
            None => None,
            Some(raw) => Some(raw.parse::<bool>().map_err(|_| {
                StoreError::InvalidParameters {
                    status: StatusCode::INVALID_PARAMETERS,
                    message: format!("synchronizable must be 'true' or 'false', got '{raw}'"),
                }
            })?),
        };

        Ok(Self {
            namespace: get(&["namespace", "accountName"]),
            access_group: get(&["accessGroup", "groupId"]),
            synchronizable,
            accessibility: get(&["accessibility"]),
        })
    }
}

impl From<Partition> for StorageOptions {
    fn from(partition: Partition) -> Self {
        Self {
            namespace: partition.namespace,
            access_group: partition.access_group,
            synchronizable: partition.synchronizable,
            accessibility: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_channel_map_with_legacy_names() {
        let opts = StorageOptions::from_channel_map(&map(&[
            ("accountName", "app"),
            ("groupId", "TEAM.shared"),
            ("synchronizable", "true"),
            ("accessibility", "first_unlock"),
        ]))
        .expect("parse");
        assert_eq!(opts.namespace.as_deref(), Some("app"));
        assert_eq!(opts.access_group.as_deref(), Some("TEAM.shared"));
        assert_eq!(opts.synchronizable, Some(true));
        assert_eq!(
            opts.accessibility_level(),
            AccessibilityLevel::AfterFirstUnlock
        );
    }

    #[test]
    fn test_channel_map_empty_values_are_absent() {
        let opts = StorageOptions::from_channel_map(&map(&[
            ("namespace", ""),
            ("synchronizable", ""),
        ]))
        .expect("parse");
        assert_eq!(opts, StorageOptions::default());
        assert_eq!(opts.partition(), Partition::default());
    }

    #[test]
    fn test_channel_map_rejects_non_boolean_sync() {
        let err = StorageOptions::from_channel_map(&map(&[("synchronizable", "yes")]))
            .expect_err("invalid");
        assert!(matches!(err, StoreError::InvalidParameters { .. }));
    }

    #[test]
    fn test_empty_namespace_is_unset() {
        let opts = StorageOptions::namespace("");
        assert_eq!(opts.partition(), Partition::default());
        let grouped = StorageOptions {
            access_group: Some(String::new()),
            ..StorageOptions::namespace("app")
        };
        assert_eq!(grouped.partition(), Partition::namespace("app"));
    }

    #[test]
    fn test_options_json_uses_camel_case() {
        let opts: StorageOptions = serde_json::from_str(
            r#"{"namespace":"app","accessGroup":"grp","synchronizable":false}"#,
        )
        .expect("deserialize");
        let partition = opts.partition();
        assert_eq!(
            partition,
            Partition::namespace("app")
                .with_access_group("grp")
                .with_synchronizable(false)
        );
        let json = serde_json::to_string(&StorageOptions::from(partition)).expect("serialize");
        assert!(json.contains("\"accessGroup\":\"grp\""));
        assert!(!json.contains("accessibility"));
    }
}
