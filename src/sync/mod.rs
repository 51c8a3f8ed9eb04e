//! Routing of framework synchronize calls to local and remote targets.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::model::Model;
use crate::store::RecordStore;

/// The four synchronize methods a host framework can issue.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SyncMethod {
    Read,
    Create,
    Update,
    Delete,
}

/// The only operational failure the dispatcher exposes. Every record
/// store fault, whatever its cause, collapses into it.
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
pub enum SyncError {
    #[error("Record not found")]
    RecordNotFound,
}

type SuccessHandler = Box<dyn FnMut(&Value) + Send>;
type ErrorHandler = Box<dyn FnMut(&SyncError) + Send>;

/// Completion handlers for one dispatch call.
///
/// Both handlers are optional; the dispatch outcome is also always
/// returned directly, so handlers are only needed when the caller wants
/// callback-style delivery.
#[derive(Default)]
pub struct SyncOptions {
    success: Option<SuccessHandler>,
    error: Option<ErrorHandler>,
}

impl SyncOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, handler: impl FnMut(&Value) + Send + 'static) -> Self {
        self.success = Some(Box::new(handler));
        self
    }

    pub fn on_error(mut self, handler: impl FnMut(&SyncError) + Send + 'static) -> Self {
        self.error = Some(Box::new(handler));
        self
    }

    /// Normalizes a bare success callable into full options, installing a
    /// default error reporter. Kept for callers predating the options
    /// shape.
    pub fn from_success_fn(handler: impl FnMut(&Value) + Send + 'static) -> Self {
        Self::new()
            .on_success(handler)
            .on_error(|err| tracing::error!(err = %err, "sync failed"))
    }

    fn succeed(&mut self, value: &Value) {
        if let Some(handler) = self.success.as_mut() {
            handler(value);
        }
    }

    fn fail(&mut self, err: &SyncError) {
        if let Some(handler) = self.error.as_mut() {
            handler(err);
        }
    }
}

impl fmt::Debug for SyncOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOptions")
            .field("success", &self.success.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

/// Per-call routing configuration: which record store (if any) serves the
/// local path, and which paths are switched off.
#[derive(Clone, Debug, Default)]
pub struct SyncConfig {
    pub local_store: Option<Arc<RecordStore>>,
    pub disable_local_persist: bool,
    pub disable_remote_sync: bool,
}

/// A previously-installed transport handling remote synchronization. It
/// receives the original method, model, and options, unmodified.
pub trait RemoteTransport: Send + Sync {
    fn sync(&self, method: SyncMethod, model: &dyn Model, options: &mut SyncOptions);
}

impl<F> RemoteTransport for F
where
    F: Fn(SyncMethod, &dyn Model, &mut SyncOptions) + Send + Sync,
{
    fn sync(&self, method: SyncMethod, model: &dyn Model, options: &mut SyncOptions) {
        self(method, model, options)
    }
}

/// Routes each synchronize call to the local record store, the remote
/// transport, both, or neither, as the [`SyncConfig`] directs.
///
/// Whether firing both paths in one call is intentional dual-write is an
/// inherited ambiguity; the dispatcher allows it and makes no attempt to
/// reconcile divergent results.
#[derive(Default)]
pub struct SyncDispatcher {
    remote: Option<Box<dyn RemoteTransport>>,
}

impl SyncDispatcher {
    /// A dispatcher with no remote transport; only the local path can
    /// ever fire.
    pub fn new() -> Self {
        Self { remote: None }
    }

    /// A dispatcher forwarding to `remote` whenever remote sync applies.
    pub fn with_remote(remote: impl RemoteTransport + 'static) -> Self {
        Self {
            remote: Some(Box::new(remote)),
        }
    }

    /// Dispatches one synchronize call.
    ///
    /// The local outcome is reported through the handlers in `options`
    /// and also returned. `Ok(None)` means no path applied and the call
    /// had no effect; a remote-only call likewise returns `Ok(None)`
    /// because the transport owns its own delivery.
    #[tracing::instrument(name = "dispatching sync call", skip(self, model, options, config))]
    pub fn dispatch<M: Model>(
        &self,
        method: SyncMethod,
        model: &mut M,
        options: &mut SyncOptions,
        config: &SyncConfig,
    ) -> Result<Option<Value>, SyncError> {
        let local = config
            .local_store
            .as_ref()
            .filter(|_| !config.disable_local_persist);
        let remote = self.remote.as_ref().filter(|_| !config.disable_remote_sync);

        let mut outcome = Ok(None);

        if let Some(store) = local {
            let resp = match method {
                SyncMethod::Read if model.id().is_some() => store.find(model),
                SyncMethod::Read => store.find_all().map(Value::from),
                SyncMethod::Create => store.create(model),
                SyncMethod::Update => store.update(model),
                SyncMethod::Delete => store.destroy(model).map(|()| model.to_value()),
            };

            outcome = match resp {
                Ok(value) => {
                    options.succeed(&value);
                    Ok(Some(value))
                }
                Err(err) => {
                    tracing::error!(err = %err, "record store operation failed");
                    let err = SyncError::RecordNotFound;
                    options.fail(&err);
                    Err(err)
                }
            };
        }

        if let Some(transport) = remote {
            transport.sync(method, &*model, options);
        }

        if local.is_none() && remote.is_none() {
            tracing::debug!("no sync path applies; call has no effect");
        }

        outcome
    }
}
