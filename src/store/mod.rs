//! Per-collection record stores over a key-value storage area.

mod id;
pub use id::RecordId;

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::model::Model;
use crate::storage::{self, Storage, StorageBackend, StorageKind};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("encoding record failed with: {0}")]
    Encode(String),

    #[error("decoding record failed with: {0}")]
    Decode(String),

    #[error(transparent)]
    Storage(#[from] storage::Error),
}

type Result<T> = std::result::Result<T, Error>;

/// CRUD persistence for one logical collection name.
///
/// The store owns two kinds of backend entries: the id index, a
/// comma-joined list under the collection name itself, and one JSON entry
/// per record under `name-<id>`. The index always reflects exactly the
/// record entries this store manages; ids containing commas are
/// unsupported.
///
/// Two stores built over the same name share backend keys but not the
/// in-memory index; no cross-instance coordination is provided.
#[derive(Debug)]
pub struct RecordStore {
    name: String,
    kind: StorageKind,
    backend: Arc<dyn StorageBackend>,
    ids: RwLock<Vec<String>>,
}

impl RecordStore {
    /// Creates a store for `name` bound to the `kind` area of `storage`,
    /// picking up any id index a previous instance persisted.
    pub fn new(storage: &Storage, name: impl Into<String>, kind: StorageKind) -> Result<Self> {
        let name = name.into();
        let backend = storage.area(kind);
        let ids = match backend.get_item(&name)? {
            Some(raw) if !raw.is_empty() => raw.split(',').map(str::to_owned).collect(),
            _ => Vec::new(),
        };

        Ok(Self {
            name,
            kind,
            backend,
            ids: RwLock::new(ids),
        })
    }

    /// Like [`RecordStore::new`], with the name computed by a zero-argument
    /// closure at construction.
    pub fn with_name_fn(
        storage: &Storage,
        name: impl FnOnce() -> String,
        kind: StorageKind,
    ) -> Result<Self> {
        Self::new(storage, name(), kind)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StorageKind {
        self.kind
    }

    /// Ids currently indexed, in insertion order.
    pub fn ids(&self) -> Vec<String> {
        self.ids.read().clone()
    }

    /// Persists `model`, assigning it a generated id first if it does not
    /// carry one, and appends the id to the index. Returns the stored
    /// plain value.
    #[tracing::instrument(name = "creating record", skip(self, model), fields(store = %self.name))]
    pub fn create<M: Model>(&self, model: &mut M) -> Result<Value> {
        let id = match model.id() {
            Some(id) => id,
            None => {
                let id = RecordId::generate();
                model.set_id(id.to_string());
                id.to_string()
            }
        };

        let value = model.to_value();
        self.backend
            .set_item(&self.record_key(&id), &encode(&value)?)?;

        let mut ids = self.ids.write();
        ids.push(id);
        self.save_index(&ids)?;

        Ok(value)
    }

    /// Overwrites the stored copy of `model`, indexing its id if this
    /// store has not seen it before. Expects the model to already carry an
    /// identifier.
    #[tracing::instrument(name = "updating record", skip(self, model), fields(store = %self.name))]
    pub fn update<M: Model>(&self, model: &M) -> Result<Value> {
        let id = model.id().unwrap_or_default();
        let value = model.to_value();
        self.backend
            .set_item(&self.record_key(&id), &encode(&value)?)?;

        let mut ids = self.ids.write();
        if !ids.iter().any(|indexed| indexed == &id) {
            ids.push(id);
        }
        self.save_index(&ids)?;

        Ok(value)
    }

    /// Looks up the stored copy of `model` by id.
    ///
    /// A missing or empty entry comes back as an empty JSON object, not an
    /// error; emptiness is this adapter's not-found signal.
    pub fn find<M: Model>(&self, model: &M) -> Result<Value> {
        let id = model.id().unwrap_or_default();
        decode(&self.safe_get(&self.record_key(&id))?)
    }

    /// Every indexed record, in index order, materialized eagerly. Ids
    /// whose entries were cleared out from under the store are skipped.
    pub fn find_all(&self) -> Result<Vec<Value>> {
        let ids = self.ids.read().clone();
        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            let value = decode(&self.safe_get(&self.record_key(id))?)?;
            if value
                .as_object()
                .is_some_and(|attributes| attributes.is_empty())
            {
                continue;
            }
            records.push(value);
        }

        Ok(records)
    }

    /// Removes `model`'s entry and every index occurrence of its id
    /// (compared as strings). The live record itself is left untouched.
    #[tracing::instrument(name = "destroying record", skip(self, model), fields(store = %self.name))]
    pub fn destroy<M: Model>(&self, model: &M) -> Result<()> {
        let id = model.id().unwrap_or_default();
        self.backend.remove_item(&self.record_key(&id))?;

        let mut ids = self.ids.write();
        ids.retain(|indexed| indexed != &id);
        self.save_index(&ids)?;

        Ok(())
    }

    /// Removes the index entry, every record entry under this store's
    /// prefix, and the in-memory id list. A reset for tests and cleanup,
    /// not part of the normal CRUD flow.
    #[tracing::instrument(name = "clearing store", skip(self), fields(store = %self.name))]
    pub fn clear_all(&self) -> Result<()> {
        self.backend.remove_item(&self.name)?;

        let prefix = format!("{}-", self.name);
        for key in self.backend.keys()? {
            if key.starts_with(&prefix) {
                self.backend.remove_item(&key)?;
            }
        }

        self.ids.write().clear();
        Ok(())
    }

    fn record_key(&self, id: &str) -> String {
        format!("{}-{}", self.name, id)
    }

    fn save_index(&self, ids: &[String]) -> Result<()> {
        self.backend.set_item(&self.name, &ids.join(","))?;
        Ok(())
    }

    fn safe_get(&self, key: &str) -> Result<String> {
        Ok(match self.backend.get_item(key)? {
            Some(raw) if !raw.is_empty() => raw,
            _ => "{}".to_owned(),
        })
    }
}

fn encode(value: &Value) -> Result<String> {
    serde_json::to_string(value).map_err(|err| Error::Encode(err.to_string()))
}

fn decode(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|err| Error::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use serde_json::json;

    fn todos() -> (Storage, RecordStore) {
        let storage = Storage::init().unwrap();
        let store = RecordStore::new(&storage, "todos", StorageKind::Durable).unwrap();
        (storage, store)
    }

    #[test]
    fn test_create_assigns_id_and_round_trips() {
        let (_storage, store) = todos();
        let mut todo = Record::from_value(json!({"title": "a"}));

        let created = store.create(&mut todo).unwrap();
        let id = todo.id().expect("create assigns an id");
        assert_eq!(created, json!({"title": "a", "id": id}));

        assert_eq!(store.find(&todo).unwrap(), created);
    }

    #[test]
    fn test_create_keeps_existing_id() {
        let (_storage, store) = todos();
        let mut todo = Record::from_value(json!({"title": "a", "id": "fixed"}));

        let created = store.create(&mut todo).unwrap();
        assert_eq!(created, json!({"title": "a", "id": "fixed"}));
        assert_eq!(store.ids(), vec!["fixed".to_owned()]);
    }

    #[test]
    fn test_find_missing_returns_empty_object() {
        let (_storage, store) = todos();
        let ghost = Record::from_value(json!({"id": "nope"}));
        assert_eq!(store.find(&ghost).unwrap(), json!({}));
    }

    #[test]
    fn test_update_indexes_unseen_id_once() {
        let (_storage, store) = todos();
        let mut todo = Record::from_value(json!({"title": "a", "id": "x1"}));

        store.update(&todo).unwrap();
        assert_eq!(store.ids(), vec!["x1".to_owned()]);

        todo.set("title", "b");
        store.update(&todo).unwrap();
        assert_eq!(store.ids(), vec!["x1".to_owned()]);
        assert_eq!(store.find(&todo).unwrap(), json!({"title": "b", "id": "x1"}));
    }

    #[test]
    fn test_destroy_removes_duplicate_index_entries() {
        let (_storage, store) = todos();
        let mut todo = Record::from_value(json!({"title": "a", "id": "dup"}));

        // Creating twice with a fixed id appends the id twice.
        store.create(&mut todo).unwrap();
        store.create(&mut todo).unwrap();
        assert_eq!(store.ids(), vec!["dup".to_owned(), "dup".to_owned()]);

        store.destroy(&todo).unwrap();
        assert!(store.ids().is_empty());
        assert_eq!(store.find(&todo).unwrap(), json!({}));
    }

    #[test]
    fn test_find_all_preserves_index_order() {
        let (_storage, store) = todos();
        for title in ["a", "b", "c"] {
            let mut todo = Record::from_value(json!({"title": title}));
            store.create(&mut todo).unwrap();
        }

        let all = store.find_all().unwrap();
        let titles: Vec<&str> = all.iter().map(|v| v["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_find_all_skips_externally_cleared_entries() {
        let (storage, store) = todos();
        let mut kept = Record::from_value(json!({"title": "kept"}));
        let mut gone = Record::from_value(json!({"title": "gone"}));
        store.create(&mut kept).unwrap();
        store.create(&mut gone).unwrap();

        storage
            .area(StorageKind::Durable)
            .remove_item(&format!("todos-{}", gone.id().unwrap()))
            .unwrap();

        let all = store.find_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["title"], json!("kept"));
        // The index still remembers both ids.
        assert_eq!(store.ids().len(), 2);
    }

    #[test]
    fn test_index_survives_reconstruction() {
        let storage = Storage::init().unwrap();
        let id = {
            let store = RecordStore::new(&storage, "todos", StorageKind::Durable).unwrap();
            let mut todo = Record::from_value(json!({"title": "a"}));
            store.create(&mut todo).unwrap();
            todo.id().unwrap()
        };

        let reopened = RecordStore::new(&storage, "todos", StorageKind::Durable).unwrap();
        assert_eq!(reopened.ids(), vec![id]);
        assert_eq!(reopened.find_all().unwrap().len(), 1);
    }

    #[test]
    fn test_clear_all_resets_store_and_backend() {
        let (storage, store) = todos();
        let mut todo = Record::from_value(json!({"title": "a"}));
        store.create(&mut todo).unwrap();

        store.clear_all().unwrap();

        assert!(store.ids().is_empty());
        assert!(store.find_all().unwrap().is_empty());
        assert!(
            storage
                .area(StorageKind::Durable)
                .keys()
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_clear_all_leaves_other_collections_alone() {
        let storage = Storage::init().unwrap();
        let todos = RecordStore::new(&storage, "todos", StorageKind::Durable).unwrap();
        let notes = RecordStore::new(&storage, "notes", StorageKind::Durable).unwrap();

        let mut todo = Record::from_value(json!({"title": "a"}));
        let mut note = Record::from_value(json!({"body": "b"}));
        todos.create(&mut todo).unwrap();
        notes.create(&mut note).unwrap();

        todos.clear_all().unwrap();
        assert_eq!(notes.find_all().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_entry_surfaces_as_decode_error() {
        let (storage, store) = todos();
        let mut todo = Record::from_value(json!({"title": "a"}));
        store.create(&mut todo).unwrap();

        storage
            .area(StorageKind::Durable)
            .set_item(&format!("todos-{}", todo.id().unwrap()), "not json")
            .unwrap();

        assert!(matches!(store.find(&todo), Err(Error::Decode(_))));
        assert!(matches!(store.find_all(), Err(Error::Decode(_))));
    }

    #[test]
    fn test_name_from_closure_and_session_scope() {
        let storage = Storage::init().unwrap();
        let store =
            RecordStore::with_name_fn(&storage, || "scratch".to_owned(), StorageKind::Session)
                .unwrap();
        assert_eq!(store.name(), "scratch");
        assert_eq!(store.kind(), StorageKind::Session);

        let mut item = Record::from_value(json!({"n": 1}));
        store.create(&mut item).unwrap();
        assert!(
            storage
                .area(StorageKind::Durable)
                .get_item("scratch")
                .unwrap()
                .is_none()
        );
    }
}
