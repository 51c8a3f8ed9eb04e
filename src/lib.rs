//! # local-persist: a key-value persistence adapter for client-side records
//!
//! `local-persist` intercepts a framework's synchronize calls
//! (read/create/update/delete on records and collections) and redirects
//! them to local key-value storage, durable or session-scoped, instead of
//! a network endpoint. Records persist transparently without a backend,
//! and calls can still be mirrored to a remote transport when one is
//! registered.
//!
//! # Quick Start
//!
//! ```rust
//! use local_persist::{
//!     Model, Record, RecordStore, Storage, StorageKind, SyncConfig, SyncDispatcher, SyncMethod,
//!     SyncOptions,
//! };
//! use std::sync::Arc;
//!
//! // Initialize the storage environment once; this probes both areas and
//! // fails up front if the environment has no working storage.
//! let storage = Storage::init().unwrap();
//!
//! // One store per logical collection name.
//! let todos = Arc::new(RecordStore::new(&storage, "todos", StorageKind::Durable).unwrap());
//!
//! let config = SyncConfig {
//!     local_store: Some(Arc::clone(&todos)),
//!     disable_remote_sync: true,
//!     ..Default::default()
//! };
//! let dispatcher = SyncDispatcher::new();
//!
//! let mut todo = Record::from_value(serde_json::json!({"title": "write the docs"}));
//! let mut options = SyncOptions::new().on_success(|resp| println!("saved: {resp}"));
//!
//! dispatcher
//!     .dispatch(SyncMethod::Create, &mut todo, &mut options, &config)
//!     .unwrap();
//! assert!(todo.id().is_some());
//! ```
//!
//! # Storage areas
//!
//! A [`Storage`] environment exposes two areas, selected per store with
//! [`StorageKind`]:
//!
//! - `Session` is always an in-memory area scoped to the process.
//! - `Durable` is in-memory under [`Storage::init`], or backed by a JSON
//!   file via [`Storage::with_durable_path`] (the `file-store` feature,
//!   enabled by default).
//!
//! Custom areas plug in through the
//! [`StorageBackend`](storage::StorageBackend) trait and
//! [`Storage::with_backends`].
//!
//! # Records
//!
//! The adapter works against the [`Model`] contract: an identity
//! attribute (`id` by convention), a setter for generated identifiers,
//! and a plain-value serializer. [`Record`] is a ready-made JSON-object
//! implementation for hosts without their own record type.
//!
//! # Dispatch
//!
//! [`SyncDispatcher::dispatch`] routes each call according to an explicit
//! [`SyncConfig`]: to the local [`RecordStore`], to a registered
//! [`RemoteTransport`](sync::RemoteTransport), to both, or to neither.
//! The only operational error callers ever observe is
//! [`SyncError::RecordNotFound`]; every store-level fault collapses into
//! it.

pub mod model;
pub mod storage;
pub mod store;
pub mod sync;

pub use model::{Model, Record};
pub use storage::{Storage, StorageKind};
pub use store::{RecordId, RecordStore};
pub use sync::{SyncConfig, SyncDispatcher, SyncError, SyncMethod, SyncOptions};
