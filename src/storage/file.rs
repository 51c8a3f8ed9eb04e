use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::storage::{Error, StorageBackend};

/// A JSON-file-backed storage area.
///
/// The whole area is a single JSON object on disk: read once at open,
/// rewritten on every mutation. Writes stay synchronous, so the durable
/// area behaves like its in-memory counterpart apart from surviving
/// process restarts.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    /// Opens the area persisted at `path`, starting empty if the file does
    /// not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let items = match fs::read_to_string(&path) {
            Ok(raw) if !raw.is_empty() => serde_json::from_str(&raw).map_err(|err| {
                Error::Backend(format!("corrupt storage file {}: {err}", path.display()))
            })?,
            Ok(_) => HashMap::new(),
            Err(err) if err.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(Error::Backend(err.to_string())),
        };

        Ok(Self {
            path,
            items: RwLock::new(items),
        })
    }

    fn flush(&self, items: &HashMap<String, String>) -> Result<(), Error> {
        let raw = serde_json::to_string(items).map_err(|err| Error::Backend(err.to_string()))?;
        fs::write(&self.path, raw).map_err(|err| Error::Backend(err.to_string()))
    }
}

impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut items = self.items.write();
        items.insert(key.to_owned(), value.to_owned());
        self.flush(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), Error> {
        let mut items = self.items.write();
        items.remove(key);
        self.flush(&items)
    }

    fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.items.read().keys().cloned().collect())
    }
}
