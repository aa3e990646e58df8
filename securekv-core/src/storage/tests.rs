use super::*;
use crate::accessibility::{AccessibilityLevel, ProtectionClass};
use crate::memory::{MemoryStore, Operation};
use crate::partition::{Partition, StorageOptions};
use crate::query::ScopedQuery;
use crate::store::NewItem;

fn app() -> StorageOptions {
    StorageOptions::namespace("app")
}

fn storage() -> SecureStorage<MemoryStore> {
    SecureStorage::new(MemoryStore::new())
}

fn plant_raw(store: &MemoryStore, key: &str, partition: &Partition, value: &[u8]) {
    let query = ScopedQuery::builder(partition).key(key).finish();
    let status = store.insert(
        &query,
        &NewItem {
            value: value.to_vec(),
            accessible: ProtectionClass::WHEN_UNLOCKED,
        },
    );
    assert!(status.is_success());
}

#[test]
fn test_token_scenario() {
    let storage = storage();
    storage.write("token", "abc", &app()).expect("write");
    assert_eq!(
        storage.read("token", &app()).expect("read").as_deref(),
        Some("abc")
    );
    storage.write("token", "xyz", &app()).expect("overwrite");
    assert_eq!(
        storage.read("token", &app()).expect("read").as_deref(),
        Some("xyz")
    );
    storage.delete("token", &app()).expect("delete");
    assert_eq!(storage.read("token", &app()).expect("read"), None);
    storage.delete_all(&app()).expect("delete_all on empty partition");
}

#[test]
fn test_overwrite_keeps_a_single_record() {
    let storage = storage();
    storage.write("k", "v1", &app()).expect("write");
    storage.write("k", "v2", &app()).expect("write");
    assert_eq!(storage.store().len(), 1);
    assert_eq!(storage.store().calls(Operation::Insert), 1);
    assert_eq!(storage.store().calls(Operation::Update), 1);
}

#[test]
fn test_absent_key_reads_none_and_deletes_ok() {
    let storage = storage();
    assert_eq!(storage.read("never", &app()).expect("read"), None);
    assert!(!storage.contains_key("never", &app()).expect("contains"));
    storage.delete("never", &app()).expect("idempotent delete");
}

#[test]
fn test_contains_key_tracks_last_operation() {
    let storage = storage();
    storage.write("k", "v", &app()).expect("write");
    assert!(storage.contains_key("k", &app()).expect("contains"));
    storage.delete("k", &app()).expect("delete");
    assert!(!storage.contains_key("k", &app()).expect("contains"));
    storage.write("k", "again", &app()).expect("write");
    assert!(storage.contains_key("k", &app()).expect("contains"));
}

#[test]
fn test_namespaces_are_isolated() {
    let storage = storage();
    let a = StorageOptions::namespace("a");
    let b = StorageOptions::namespace("b");
    storage.write("shared", "from-a", &a).expect("write");

    assert_eq!(storage.read("shared", &b).expect("read"), None);
    assert!(storage.read_all(&b).expect("read_all").is_empty());
    assert!(!storage.contains_key("shared", &b).expect("contains"));

    storage.write("shared", "from-b", &b).expect("write");
    storage.delete_all(&b).expect("delete_all");
    assert_eq!(
        storage.read("shared", &a).expect("read").as_deref(),
        Some("from-a")
    );
}

#[test]
fn test_delete_all_then_read_all_is_empty() {
    let storage = storage();
    for (key, value) in [("a", "1"), ("b", "2"), ("c", "3")] {
        storage.write(key, value, &app()).expect("write");
    }
    let all = storage.read_all(&app()).expect("read_all");
    assert_eq!(all.len(), 3);
    assert_eq!(all.get("b").map(String::as_str), Some("2"));

    storage.delete_all(&app()).expect("delete_all");
    assert!(storage.read_all(&app()).expect("read_all").is_empty());
}

#[test]
fn test_bogus_accessibility_resolves_to_when_unlocked() {
    let storage = storage();
    let options = StorageOptions::namespace("app").with_accessibility("bogus");
    assert_eq!(
        options.accessibility_level(),
        AccessibilityLevel::WhenUnlocked
    );
    storage.write("k", "v", &options).expect("write");
    let query = ScopedQuery::builder(&options.partition()).key("k").finish();
    assert_eq!(
        storage.store().protection_of(&query).as_deref(),
        Some(ProtectionClass::WHEN_UNLOCKED.as_str())
    );
}

#[test]
fn test_update_replaces_accessibility() {
    let storage = storage();
    storage.write("k", "v", &app()).expect("write");
    let stricter = app().with_accessibility("passcode");
    storage.write("k", "v2", &stricter).expect("update");
    let query = ScopedQuery::builder(&app().partition()).key("k").finish();
    assert_eq!(
        storage.store().protection_of(&query).as_deref(),
        Some(ProtectionClass::WHEN_PASSCODE_SET_THIS_DEVICE_ONLY.as_str())
    );
    assert_eq!(storage.store().len(), 1);
}

#[test]
fn test_existence_check_error_is_not_treated_as_absent() {
    let storage = storage();
    storage
        .store()
        .fail_next(Operation::Lookup, StatusCode::AUTHENTICATION_FAILED);
    let err = storage.write("k", "v", &app()).expect_err("lookup failure");
    assert!(matches!(err, StoreError::AuthenticationFailed { .. }));
    assert_eq!(storage.store().calls(Operation::Insert), 0);
    assert_eq!(storage.store().calls(Operation::Update), 0);
}

#[test]
fn test_contains_key_surfaces_unknown_status() {
    let storage = storage();
    storage
        .store()
        .fail_next(Operation::Lookup, StatusCode(-25308));
    let err = storage.contains_key("k", &app()).expect_err("unknown status");
    assert!(matches!(err, StoreError::Unknown { code: -25308, .. }));
}

#[test]
fn test_read_errors_other_than_not_found_propagate() {
    let storage = storage();
    storage
        .store()
        .fail_next(Operation::Lookup, StatusCode::ENTITLEMENT_MISSING);
    let err = storage.read("k", &app()).expect_err("entitlement");
    assert!(matches!(err, StoreError::EntitlementMissing { .. }));
    assert_eq!(err.status(), Some(StatusCode::ENTITLEMENT_MISSING));
}

#[test]
fn test_delete_errors_other_than_not_found_propagate() {
    let storage = storage();
    storage
        .store()
        .fail_next(Operation::Delete, StatusCode::INVALID_PARAMETERS);
    let err = storage.delete_all(&app()).expect_err("invalid");
    assert!(matches!(err, StoreError::InvalidParameters { .. }));
}

#[test]
fn test_racing_insert_surfaces_already_exists() {
    let storage = storage();
    storage.store().before_next(Operation::Insert, |store| {
        let query = ScopedQuery::builder(&Partition::namespace("app"))
            .key("k")
            .finish();
        store.insert(
            &query,
            &NewItem {
                value: b"competitor".to_vec(),
                accessible: ProtectionClass::WHEN_UNLOCKED,
            },
        );
    });

    let err = storage.write("k", "mine", &app()).expect_err("lost the race");
    assert!(matches!(err, StoreError::AlreadyExists { .. }));
    assert!(err.is_write_conflict());

    // Retrying converges on an update.
    storage.write("k", "mine", &app()).expect("retry");
    assert_eq!(
        storage.read("k", &app()).expect("read").as_deref(),
        Some("mine")
    );
}

#[test]
fn test_update_after_concurrent_delete_surfaces_not_found() {
    let storage = storage();
    storage.write("k", "v1", &app()).expect("write");
    storage
        .store()
        .before_next(Operation::Update, MemoryStore::clear);

    let err = storage.write("k", "v2", &app()).expect_err("record vanished");
    assert!(matches!(err, StoreError::NotFound { .. }));

    storage.write("k", "v2", &app()).expect("retry inserts");
    assert_eq!(
        storage.read("k", &app()).expect("read").as_deref(),
        Some("v2")
    );
}

#[test]
fn test_external_reset_reads_as_absent() {
    let storage = storage();
    storage.write("k", "v", &app()).expect("write");
    storage.store().clear();
    assert_eq!(storage.read("k", &app()).expect("read"), None);
    storage.delete("k", &app()).expect("delete");
    assert!(storage.read_all(&app()).expect("read_all").is_empty());
}

#[test]
fn test_read_rejects_non_utf8_payload() {
    let storage = storage();
    plant_raw(storage.store(), "bin", &app().partition(), &[0xff, 0x00, 0xfe]);
    let err = storage.read("bin", &app()).expect_err("decode");
    assert!(matches!(err, StoreError::DecodeFailed { ref key, .. } if key == "bin"));
}

#[test]
fn test_read_all_decode_policies() {
    let build = |policy| {
        let storage = SecureStorage::with_config(
            MemoryStore::new(),
            StorageConfig {
                read_all_decode: policy,
            },
        );
        storage.write("good", "ok", &app()).expect("write");
        plant_raw(storage.store(), "bad", &app().partition(), &[0xc3, 0x28]);
        storage
    };

    let lossy = build(DecodePolicy::EmptyString)
        .read_all(&app())
        .expect("read_all");
    assert_eq!(lossy.get("bad").map(String::as_str), Some(""));
    assert_eq!(lossy.get("good").map(String::as_str), Some("ok"));

    let skipped = build(DecodePolicy::Skip).read_all(&app()).expect("read_all");
    assert!(!skipped.contains_key("bad"));
    assert_eq!(skipped.len(), 1);

    let err = build(DecodePolicy::Fail)
        .read_all(&app())
        .expect_err("strict");
    assert!(matches!(err, StoreError::DecodeFailed { .. }));
}

#[test]
fn test_explicit_sync_partitions_are_distinct() {
    let storage = storage();
    let local = StorageOptions::from(Partition::namespace("app").with_synchronizable(false));
    let synced = StorageOptions::from(Partition::namespace("app").with_synchronizable(true));
    storage.write("k", "local", &local).expect("write");
    storage.write("k", "cloud", &synced).expect("write");

    assert_eq!(
        storage.read("k", &local).expect("read").as_deref(),
        Some("local")
    );
    assert_eq!(
        storage.read("k", &synced).expect("read").as_deref(),
        Some("cloud")
    );

    // Unset sync spans both.
    assert!(storage.contains_key("k", &app()).expect("contains"));
    storage.delete("k", &app()).expect("delete both");
    assert!(storage.store().is_empty());
}

#[test]
fn test_unset_sync_write_updates_existing_synced_record() {
    let storage = storage();
    let synced = StorageOptions::from(Partition::namespace("app").with_synchronizable(true));
    storage.write("k", "v1", &synced).expect("write");
    storage.write("k", "v2", &app()).expect("update through unset sync");
    assert_eq!(storage.store().len(), 1);
    assert_eq!(
        storage.read("k", &synced).expect("read").as_deref(),
        Some("v2")
    );
}

#[test]
fn test_access_group_scopes_records() {
    let storage = storage();
    let grouped = StorageOptions::from(Partition::namespace("app").with_access_group("TEAM.shared"));
    let other = StorageOptions::from(Partition::namespace("app").with_access_group("TEAM.other"));
    storage.write("k", "v", &grouped).expect("write");
    assert_eq!(storage.read("k", &other).expect("read"), None);
    assert_eq!(
        storage.read("k", &grouped).expect("read").as_deref(),
        Some("v")
    );
}

#[test]
fn test_empty_namespace_behaves_like_unset() {
    let storage = storage();
    let empty = StorageOptions::namespace("");
    storage.write("k", "v", &empty).expect("write");

    assert_eq!(
        storage
            .read("k", &StorageOptions::default())
            .expect("read")
            .as_deref(),
        Some("v")
    );
    assert_eq!(
        storage
            .read("k", &StorageOptions::namespace("other"))
            .expect("read"),
        None
    );
    let unscoped = ScopedQuery::builder(&Partition::default()).key("k").finish();
    assert!(storage.store().protection_of(&unscoped).is_some());
}
