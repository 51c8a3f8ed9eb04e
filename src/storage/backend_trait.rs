use std::fmt::Debug;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The hosting environment has no working key-value storage.
    #[error("environment does not support local storage: {0}")]
    Unsupported(String),

    #[error("{0}")]
    Backend(String),
}

/// A flat, synchronous key-value storage area.
///
/// String keys, string values, no nesting. Every call runs to completion
/// before returning; there is no suspension and no cancellation.
pub trait StorageBackend: Debug + Send + Sync + 'static {
    /// Gets the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>, Error>;

    /// Sets `key` to `value`, overwriting any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), Error>;

    /// All keys currently present, in unspecified order.
    fn keys(&self) -> Result<Vec<String>, Error>;
}
