//! Opaque locators for blobs (the host's `URL.createObjectURL`).
//!
//! The registry is an owned value, created once by the application and
//! shared by reference with whatever mints or resolves locators. Entries
//! live until revoked; nothing is reclaimed automatically, so callers own
//! cleanup of the locators they create.

mod native;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;

pub use native::{NativeUrlError, NativeUrlFacility};

use crate::blob::Blob;

/// Scheme tag for minted locators: `blob:rn-polyfill-0`, `blob:rn-polyfill-1`, ...
pub const DEFAULT_LOCATOR_PREFIX: &str = "blob:rn-polyfill-";

pub struct ObjectUrlRegistry {
    prefix: String,
    entries: RefCell<HashMap<String, Blob>>,
    next_id: Cell<u64>,
    native: Option<Box<dyn NativeUrlFacility>>,
}

impl ObjectUrlRegistry {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
            native: None,
        }
    }

    /// Registry that delegates to `native` first.
    pub fn with_native(prefix: impl Into<String>, native: Box<dyn NativeUrlFacility>) -> Self {
        Self {
            native: Some(native),
            ..Self::new(prefix)
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Return a locator for `blob`, delegating to the native facility when it
    /// accepts the blob and minting `<prefix><n>` otherwise.
    pub fn create_object_url(&self, blob: &Blob) -> String {
        if let Some(native) = self.native.as_deref().filter(|n| n.accepts(blob)) {
            match native.create_object_url(blob) {
                Ok(url) => return url,
                Err(err) => {
                    tracing::debug!(error = %err, "native object URL failed, minting locally");
                }
            }
        }

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let url = format!("{}{}", self.prefix, id);
        self.entries.borrow_mut().insert(url.clone(), blob.clone());
        tracing::debug!(url = %url, size = blob.size(), "object URL created");
        url
    }

    /// Forget `url`. Revoking an unknown or already revoked minted locator is
    /// a no-op; locators of any other scheme go to the native facility.
    pub fn revoke_object_url(&self, url: &str) {
        if self.is_object_url(url) {
            if self.entries.borrow_mut().remove(url).is_some() {
                tracing::debug!(url, "object URL revoked");
            }
        } else if let Some(native) = &self.native {
            native.revoke_object_url(url);
        }
    }

    /// Look `url` up without consuming it.
    pub fn resolve(&self, url: &str) -> Option<Blob> {
        self.entries.borrow().get(url).cloned()
    }

    /// True when `url` carries this registry's scheme tag.
    pub fn is_object_url(&self, url: &str) -> bool {
        url.starts_with(&self.prefix)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ObjectUrlRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_LOCATOR_PREFIX)
    }
}

impl fmt::Debug for ObjectUrlRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectUrlRegistry")
            .field("prefix", &self.prefix)
            .field("entries", &self.len())
            .field("next_id", &self.next_id.get())
            .field("native", &self.native.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::BlobOptions;
    use std::rc::Rc;

    fn blob(s: &str) -> Blob {
        Blob::new([s], BlobOptions::default())
    }

    #[test]
    fn minted_locators_are_unique_and_sequential() {
        let registry = ObjectUrlRegistry::default();
        let a = registry.create_object_url(&blob("a"));
        let b = registry.create_object_url(&blob("b"));
        assert_eq!(a, "blob:rn-polyfill-0");
        assert_eq!(b, "blob:rn-polyfill-1");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn same_blob_twice_gets_two_locators() {
        let registry = ObjectUrlRegistry::default();
        let shared = blob("x");
        assert_ne!(
            registry.create_object_url(&shared),
            registry.create_object_url(&shared)
        );
    }

    #[test]
    fn resolve_does_not_consume() {
        let registry = ObjectUrlRegistry::default();
        let url = registry.create_object_url(&blob("abc"));
        assert_eq!(registry.resolve(&url).unwrap().size(), 3);
        assert!(registry.resolve(&url).is_some());
    }

    #[test]
    fn revoke_is_final_and_idempotent() {
        let registry = ObjectUrlRegistry::default();
        let url = registry.create_object_url(&blob("abc"));
        registry.revoke_object_url(&url);
        assert!(registry.resolve(&url).is_none());
        registry.revoke_object_url(&url);
        registry.revoke_object_url("blob:rn-polyfill-999");
        assert!(registry.is_empty());

        let next = registry.create_object_url(&blob("d"));
        assert_ne!(next, url);
    }

    #[derive(Default)]
    struct FakeNative {
        accept: bool,
        fail: bool,
        revoked: RefCell<Vec<String>>,
    }

    impl NativeUrlFacility for Rc<FakeNative> {
        fn accepts(&self, _blob: &Blob) -> bool {
            self.accept
        }

        fn create_object_url(&self, _blob: &Blob) -> Result<String, NativeUrlError> {
            if self.fail {
                Err(NativeUrlError::Rejected("test".into()))
            } else {
                Ok("blob:native/1".into())
            }
        }

        fn revoke_object_url(&self, url: &str) {
            self.revoked.borrow_mut().push(url.to_string());
        }
    }

    #[test]
    fn delegates_to_native_when_accepted() {
        let native = Rc::new(FakeNative {
            accept: true,
            ..Default::default()
        });
        let registry =
            ObjectUrlRegistry::with_native(DEFAULT_LOCATOR_PREFIX, Box::new(Rc::clone(&native)));
        assert_eq!(registry.create_object_url(&blob("a")), "blob:native/1");
        assert!(registry.is_empty());

        registry.revoke_object_url("blob:native/1");
        assert_eq!(*native.revoked.borrow(), vec!["blob:native/1".to_string()]);
    }

    #[test]
    fn falls_back_when_native_fails_or_declines() {
        let failing = Rc::new(FakeNative {
            accept: true,
            fail: true,
            ..Default::default()
        });
        let registry = ObjectUrlRegistry::with_native(DEFAULT_LOCATOR_PREFIX, Box::new(failing));
        assert_eq!(registry.create_object_url(&blob("a")), "blob:rn-polyfill-0");

        let declining = Rc::new(FakeNative::default());
        let registry = ObjectUrlRegistry::with_native("blob:test-", Box::new(declining));
        assert_eq!(registry.create_object_url(&blob("a")), "blob:test-0");
    }
}
