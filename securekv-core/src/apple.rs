//! Keychain Services backend.
//!
//! [`AppleKeychainStore`] turns each [`ScopedQuery`] into a Keychain attribute
//! dictionary and calls `SecItemAdd`, `SecItemUpdate`, `SecItemCopyMatching`
//! or `SecItemDelete` directly, returning the `OSStatus` untouched.
//!
//! An unset sync criterion is sent as `kSecAttrSynchronizableAny` on lookups,
//! updates and deletes so that local and iCloud-synchronized records are both
//! matched. Inserts always carry an explicit flag.

use std::ffi::c_void;
use std::ptr;

use core_foundation::array::CFArray;
use core_foundation::base::{CFType, CFTypeRef, TCFType};
use core_foundation::boolean::CFBoolean;
use core_foundation::data::CFData;
use core_foundation::dictionary::CFDictionary;
use core_foundation::string::{CFString, CFStringRef};
use security_framework_sys::item::{
    kSecAttrAccessGroup, kSecAttrAccount, kSecAttrService, kSecAttrSynchronizable, kSecClass,
    kSecClassGenericPassword, kSecMatchLimit, kSecMatchLimitAll, kSecMatchLimitOne,
    kSecReturnAttributes, kSecReturnData, kSecValueData,
};
use security_framework_sys::keychain_item::{
    SecItemAdd, SecItemCopyMatching, SecItemDelete, SecItemUpdate,
};

use crate::query::{ItemClass, MatchLimit, ScopedQuery};
use crate::status::StatusCode;
use crate::store::{ItemRow, ItemUpdate, Lookup, LookupPayload, NewItem, SecureStore};

#[link(name = "Security", kind = "framework")]
extern "C" {
    static kSecAttrAccessible: CFStringRef;
    static kSecAttrSynchronizableAny: CFStringRef;
}

type Attributes = Vec<(CFString, CFType)>;

/// [`SecureStore`] backed by the system keychain.
///
/// Keychain calls are synchronized by the system, so the store holds no state
/// and can be shared freely between threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct AppleKeychainStore;

impl AppleKeychainStore {
    /// Creates a keychain-backed store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Wraps a Security framework attribute constant.
macro_rules! sec_key {
    ($name:ident) => {
        // SAFETY: the constant is an immutable CFString initialized by the
        // framework before `main` and valid for the process lifetime. The get
        // rule retains it, so the wrapper never releases the framework's copy.
        unsafe { CFString::wrap_under_get_rule($name) }
    };
}

fn text(value: &str) -> CFType {
    CFString::new(value).into_CFType()
}

fn flag(value: bool) -> CFType {
    CFBoolean::from(value).into_CFType()
}

/// Criterion attributes shared by every call.
fn criteria(query: &ScopedQuery, insert: bool) -> Attributes {
    let class = match query.class {
        ItemClass::GenericPassword => sec_key!(kSecClassGenericPassword),
    };
    let mut attributes: Attributes = vec![(sec_key!(kSecClass), class.into_CFType())];

    if let Some(account) = &query.account {
        attributes.push((sec_key!(kSecAttrAccount), text(account)));
    }
    if let Some(service) = &query.service {
        attributes.push((sec_key!(kSecAttrService), text(service)));
    }
    if let Some(group) = &query.access_group {
        attributes.push((sec_key!(kSecAttrAccessGroup), text(group)));
    }
    let sync = match query.synchronizable {
        Some(value) => flag(value),
        None if insert => flag(false),
        None => sec_key!(kSecAttrSynchronizableAny).into_CFType(),
    };
    attributes.push((sec_key!(kSecAttrSynchronizable), sync));
    if let Some(accessible) = query.accessible {
        attributes.push((sec_key!(kSecAttrAccessible), text(accessible.as_str())));
    }
    attributes
}

fn dictionary(attributes: &Attributes) -> CFDictionary<CFString, CFType> {
    CFDictionary::from_CFType_pairs(attributes)
}

fn lookup_attributes(query: &ScopedQuery) -> Attributes {
    let mut attributes = criteria(query, false);
    if query.return_data {
        attributes.push((sec_key!(kSecReturnData), flag(true)));
    }
    if query.return_attributes {
        attributes.push((sec_key!(kSecReturnAttributes), flag(true)));
    }
    if let Some(limit) = query.match_limit {
        let limit = match limit {
            MatchLimit::One => sec_key!(kSecMatchLimitOne),
            MatchLimit::All => sec_key!(kSecMatchLimitAll),
        };
        attributes.push((sec_key!(kSecMatchLimit), limit.into_CFType()));
    }
    attributes
}

fn field(attributes: &CFDictionary, name: &CFString) -> Option<CFType> {
    attributes
        .find(name.as_concrete_TypeRef().cast::<c_void>())
        // SAFETY: values of a live dictionary are valid CF objects. The get
        // rule retains the value, so it outlives the dictionary if needed.
        .map(|value| unsafe { CFType::wrap_under_get_rule(*value) })
}

fn row(attributes: &CFDictionary) -> Option<ItemRow> {
    let account = field(attributes, &sec_key!(kSecAttrAccount))
        .and_then(|value| value.downcast::<CFString>())?;
    let data = field(attributes, &sec_key!(kSecValueData))
        .and_then(|value| value.downcast::<CFData>())
        .map(|data| data.bytes().to_vec());
    Some(ItemRow {
        account: account.to_string(),
        data,
    })
}

fn payload(query: &ScopedQuery, result: &CFType) -> LookupPayload {
    if query.match_limit == Some(MatchLimit::All) {
        if let Some(array) = result.downcast::<CFArray>() {
            let rows = array
                .iter()
                .filter_map(|item| {
                    // SAFETY: array elements are valid CF objects while the
                    // array lives; the get rule retains each one.
                    let item = unsafe { CFType::wrap_under_get_rule(*item) };
                    item.downcast::<CFDictionary>()
                })
                .filter_map(|attributes| row(&attributes))
                .collect();
            return LookupPayload::Rows(rows);
        }
    }
    result
        .downcast::<CFData>()
        .map_or(LookupPayload::None, |data| {
            LookupPayload::Data(data.bytes().to_vec())
        })
}

impl SecureStore for AppleKeychainStore {
    fn insert(&self, query: &ScopedQuery, item: &NewItem) -> StatusCode {
        let mut attributes = criteria(query, true);
        attributes.push((
            sec_key!(kSecValueData),
            CFData::from_buffer(&item.value).into_CFType(),
        ));
        attributes.push((sec_key!(kSecAttrAccessible), text(item.accessible.as_str())));
        let attributes = dictionary(&attributes);
        // SAFETY: the dictionary outlives the call and no result is requested.
        let status =
            unsafe { SecItemAdd(attributes.as_concrete_TypeRef(), ptr::null_mut()) };
        StatusCode(status)
    }

    fn update(&self, query: &ScopedQuery, update: &ItemUpdate) -> StatusCode {
        let criteria = dictionary(&criteria(query, false));
        let mut changes: Attributes = vec![
            (
                sec_key!(kSecValueData),
                CFData::from_buffer(&update.value).into_CFType(),
            ),
            (sec_key!(kSecAttrAccessible), text(update.accessible.as_str())),
        ];
        if let Some(sync) = update.synchronizable {
            changes.push((sec_key!(kSecAttrSynchronizable), flag(sync)));
        }
        let changes = dictionary(&changes);
        // SAFETY: both dictionaries outlive the call.
        let status = unsafe {
            SecItemUpdate(
                criteria.as_concrete_TypeRef(),
                changes.as_concrete_TypeRef(),
            )
        };
        StatusCode(status)
    }

    fn lookup(&self, query: &ScopedQuery) -> Lookup {
        let attributes = dictionary(&lookup_attributes(query));
        let mut result: CFTypeRef = ptr::null();
        // SAFETY: on success `result` holds an owned reference we take over below.
        let status =
            unsafe { SecItemCopyMatching(attributes.as_concrete_TypeRef(), &mut result) };
        let status = StatusCode(status);
        if !status.is_success() || result.is_null() {
            return Lookup::failed(status);
        }
        // SAFETY: `result` is a non-null +1 reference returned by the copy
        // call; the create rule takes ownership and releases it on drop.
        let result = unsafe { CFType::wrap_under_create_rule(result) };
        Lookup {
            status,
            payload: payload(query, &result),
        }
    }

    fn delete(&self, query: &ScopedQuery) -> StatusCode {
        let attributes = dictionary(&criteria(query, false));
        // SAFETY: the dictionary outlives the call.
        let status = unsafe { SecItemDelete(attributes.as_concrete_TypeRef()) };
        StatusCode(status)
    }

    fn describe_status(&self, status: StatusCode) -> String {
        security_framework::base::Error::from_code(status.code()).to_string()
    }
}
