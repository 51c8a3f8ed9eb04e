//! The key-value storage environment and its backends.

mod backend_trait;
pub use backend_trait::{Error, StorageBackend};

#[cfg(feature = "file-store")]
pub mod file;
pub mod memory;

#[cfg(feature = "file-store")]
pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::sync::Arc;

/// Which storage area a record store binds to. Chosen at construction and
/// immutable thereafter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Survives beyond the current session, capacity permitting.
    Durable,
    /// Scoped to the current session; gone when the process exits.
    Session,
}

const PROBE_KEY: &str = "__local_persist_probe";

/// Capability handle over the durable and session-scoped storage areas.
///
/// Initialization probes both areas with a test write and remove; a
/// hosting environment without working storage is rejected up front with
/// [`Error::Unsupported`], and no adapter can be built without a handle.
/// The handle is cheap to clone and share.
#[derive(Clone, Debug)]
pub struct Storage {
    durable: Arc<dyn StorageBackend>,
    session: Arc<dyn StorageBackend>,
}

impl Storage {
    /// Initializes an environment with in-memory durable and session areas.
    ///
    /// Durability then only spans the process lifetime; use
    /// [`Storage::with_durable_path`] for storage that survives restarts.
    pub fn init() -> Result<Self, Error> {
        Self::with_backends(
            Arc::new(MemoryStorage::new()),
            Arc::new(MemoryStorage::new()),
        )
    }

    /// Initializes an environment whose durable area is backed by the JSON
    /// file at `path`.
    #[cfg(feature = "file-store")]
    pub fn with_durable_path(path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        Self::with_backends(
            Arc::new(FileStorage::open(path)?),
            Arc::new(MemoryStorage::new()),
        )
    }

    /// Initializes an environment from caller-supplied areas, probing both.
    pub fn with_backends(
        durable: Arc<dyn StorageBackend>,
        session: Arc<dyn StorageBackend>,
    ) -> Result<Self, Error> {
        probe(durable.as_ref())?;
        probe(session.as_ref())?;
        Ok(Self { durable, session })
    }

    /// Returns the backing area for `kind`.
    pub fn area(&self, kind: StorageKind) -> Arc<dyn StorageBackend> {
        match kind {
            StorageKind::Durable => Arc::clone(&self.durable),
            StorageKind::Session => Arc::clone(&self.session),
        }
    }
}

fn probe(backend: &dyn StorageBackend) -> Result<(), Error> {
    backend
        .set_item(PROBE_KEY, "test")
        .and_then(|()| backend.remove_item(PROBE_KEY))
        .map_err(|err| Error::Unsupported(err.to_string()))
}
