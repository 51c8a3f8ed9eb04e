use parking_lot::RwLock;
use std::collections::HashMap;

use crate::storage::{Error, StorageBackend};

/// An in-memory storage area.
///
/// Data lives only as long as the process, which makes this the
/// session-scoped area of a [`Storage`](crate::storage::Storage)
/// environment. It also serves as the durable area when the hosting
/// application does not need persistence across restarts.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        self.items.write().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), Error> {
        self.items.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.items.read().keys().cloned().collect())
    }
}
