//! In-memory [`KvStore`] implementation.
//!
//! Useful for hosts without a persistence layer and for hermetic tests.
//! Values live for the lifetime of the store instance.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use fedsign_core::{KvStore, Result};

/// KvStore implementation backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    /// Create a new, empty MemoryKvStore.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().expect("lock poisoned").get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .expect("lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
