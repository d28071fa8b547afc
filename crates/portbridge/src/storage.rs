//! `localStorage` binding.
//!
//! Implements [`Storage`] over the origin's `window.localStorage`.
//!
//! # Example
//!
//! ```ignore
//! use portbridge::LocalStorage;
//! use portbridge_core::{Storage, StorageExt};
//!
//! let storage = LocalStorage::new();
//! storage.set_json("prefs", &serde_json::json!({"dark": true}))?;
//! let prefs: Option<serde_json::Value> = storage.get_json("prefs")?;
//! ```

use portbridge_core::{Storage, StorageError};

#[cfg(not(target_arch = "wasm32"))]
use portbridge_core::MemoryStorage;

/// The browser's durable, origin-scoped storage.
///
/// In WASM, this uses the real `localStorage`, shared with every other
/// script on the origin. In tests/non-WASM, this uses an in-memory fallback.
#[derive(Debug, Default)]
pub struct LocalStorage {
    /// In-memory fallback for non-WASM environments
    #[cfg(not(target_arch = "wasm32"))]
    memory: MemoryStorage,
}

impl LocalStorage {
    /// Create a handle to `localStorage`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(target_arch = "wasm32")]
    fn backend(&self) -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        window
            .local_storage()
            .map_err(|e| StorageError::AccessDenied(crate::js::describe(&e)))?
            .ok_or(StorageError::Unavailable)
    }
}

/// `setItem` throws `SecurityError` when storage is blocked and a quota
/// error otherwise.
#[cfg(target_arch = "wasm32")]
fn set_item_error(err: &wasm_bindgen::JsValue) -> StorageError {
    use wasm_bindgen::JsCast;

    let reason = crate::js::describe(err);
    match err.dyn_ref::<web_sys::DomException>() {
        Some(exception) if exception.name() == "SecurityError" => StorageError::AccessDenied(reason),
        _ => StorageError::QuotaExceeded(reason),
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.backend()?
            .get_item(key)
            .map_err(|e| StorageError::AccessDenied(crate::js::describe(&e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend()?
            .set_item(key, value)
            .map_err(|e| set_item_error(&e))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend()?
            .remove_item(key)
            .map_err(|e| StorageError::AccessDenied(crate::js::describe(&e)))
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.backend()?
            .clear()
            .map_err(|e| StorageError::AccessDenied(crate::js::describe(&e)))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.memory.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.memory.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.memory.remove(key)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.memory.clear()
    }
}


#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;
    use web_sys::DomException;

    wasm_bindgen_test_configure!(run_in_browser);

    fn exception(name: &str) -> wasm_bindgen::JsValue {
        DomException::new_with_message_and_name("setItem failed", name)
            .expect("DOMException")
            .into()
    }

    #[wasm_bindgen_test]
    fn test_security_error_is_access_denied() {
        assert!(matches!(
            set_item_error(&exception("SecurityError")),
            StorageError::AccessDenied(_)
        ));
    }

    #[wasm_bindgen_test]
    fn test_quota_error_is_quota_exceeded() {
        assert!(matches!(
            set_item_error(&exception("QuotaExceededError")),
            StorageError::QuotaExceeded(_)
        ));
    }

    #[wasm_bindgen_test]
    fn test_plain_error_is_quota_exceeded() {
        let err: wasm_bindgen::JsValue = js_sys::Error::new("boom").into();
        assert!(matches!(set_item_error(&err), StorageError::QuotaExceeded(_)));
    }
}
