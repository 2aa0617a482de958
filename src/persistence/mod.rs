//! Key-value persistence
//!
//! The game only needs LocalStorage semantics: string values under fixed
//! keys, synchronous, and allowed to be missing or garbage. Callers decode
//! with serde_json and fall back to defaults on any failure.

use std::cell::RefCell;
use std::collections::HashMap;

/// Minimal synchronous key-value store
pub trait Storage {
    /// Read a value (None if absent or the backend is unavailable)
    fn get_item(&self, key: &str) -> Option<String>;
    /// Write a value; failures are logged, never returned
    fn set_item(&self, key: &str, value: &str);
}

/// In-memory store for native runs and tests
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set_item(&self, key: &str, value: &str) {
        match Self::storage() {
            Some(storage) => {
                if storage.set_item(key, value).is_err() {
                    log::warn!("LocalStorage write failed for '{}'", key);
                }
            }
            None => log::warn!("LocalStorage unavailable, '{}' not saved", key),
        }
    }
}
