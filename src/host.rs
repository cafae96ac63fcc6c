//! Host-facing entry points.
//!
//! [`ObjectModule`] is the context object an embedding host keeps for the
//! lifetime of the process. It owns the worker runtime, the backend registry
//! and the dispatcher, and exposes the two boundary calls:
//!
//! - `init(args)`: one argument (service URL) or five (`kind, host,
//!   database, username, password`). Fails synchronously.
//! - `get(path, callback)`: error-first completion, `(None, Some(json))` on
//!   success and `(Some(error), None)` on failure.

use crate::retrieval::{
    adapters::DefaultBackendConnector,
    domain::{BackendConfig, ConfigurationError, RequestId},
    ports::{BackendConnector, RetrievalError, RetrievalOutcome},
    services::{BackendRegistry, DispatchError, InitializationError, RetrievalDispatcher},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Runtime;

const WORKER_THREAD_NAME: &str = "tobject2json-worker";
const SHUTDOWN_TIMEOUT_SECS: u64 = 5;

/// Errors raised synchronously by host entry points.
#[derive(Debug, Error)]
pub enum HostError {
    /// The `init` arguments do not form a valid configuration.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The backend could not be initialized.
    #[error(transparent)]
    Initialization(#[from] InitializationError),
    /// The retrieval could not be submitted.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    /// The timestamp does not fit a calendar date.
    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(u64),
    /// The worker runtime could not be started.
    #[error("failed to start retrieval runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Error value handed to host callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDescriptor {
    /// Stable error kind, see [`RetrievalError::code`].
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl From<&RetrievalError> for ErrorDescriptor {
    fn from(err: &RetrievalError) -> Self {
        Self {
            code: err.code().to_owned(),
            message: err.to_string(),
        }
    }
}

/// Process-wide retrieval context for an embedding host.
///
/// Must be created and dropped outside of any async context, since it owns
/// its own runtime.
#[derive(Debug)]
pub struct ObjectModule {
    runtime: Runtime,
    registry: Arc<BackendRegistry>,
    dispatcher: RetrievalDispatcher,
}

impl ObjectModule {
    /// Creates a module connecting through [`DefaultBackendConnector`].
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Runtime`] when the worker runtime cannot start.
    pub fn new() -> Result<Self, HostError> {
        Self::with_connector(Arc::new(DefaultBackendConnector))
    }

    /// Creates a module connecting through `connector`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Runtime`] when the worker runtime cannot start.
    pub fn with_connector(connector: Arc<dyn BackendConnector>) -> Result<Self, HostError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name(WORKER_THREAD_NAME)
            .build()
            .map_err(HostError::Runtime)?;
        let registry = Arc::new(BackendRegistry::new(connector));
        let dispatcher = RetrievalDispatcher::new(Arc::clone(&registry), runtime.handle().clone());
        Ok(Self {
            runtime,
            registry,
            dispatcher,
        })
    }

    /// Bounds every retrieval by `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.dispatcher = self.dispatcher.with_timeout(timeout);
        self
    }

    /// Initializes the backend from positional arguments.
    ///
    /// Arguments are validated on every call; once a backend exists the
    /// configuration is otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Configuration`] for a wrong argument count or
    /// invalid field, and [`HostError::Initialization`] when connecting fails.
    pub fn init(&self, args: &[&str]) -> Result<(), HostError> {
        let config = BackendConfig::from_args(args)?;
        self.registry.initialize(&config)?;
        Ok(())
    }

    /// Returns whether `init` has succeeded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.registry.is_initialized()
    }

    /// Fetches the latest version of `path` in the background.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Dispatch`] when the path is empty or `init` has
    /// not succeeded; `callback` is then never called.
    pub fn get<F>(&self, path: &str, callback: F) -> Result<RequestId, HostError>
    where
        F: FnOnce(Option<ErrorDescriptor>, Option<String>) + Send + 'static,
    {
        self.submit(path, None, callback)
    }

    /// Fetches the version of `path` current at `timestamp_ms` (Unix
    /// milliseconds) in the background; `0` selects the latest version.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidTimestamp`] for an unrepresentable
    /// timestamp, otherwise as [`ObjectModule::get`].
    pub fn get_at<F>(
        &self,
        path: &str,
        timestamp_ms: u64,
        callback: F,
    ) -> Result<RequestId, HostError>
    where
        F: FnOnce(Option<ErrorDescriptor>, Option<String>) + Send + 'static,
    {
        let as_of = if timestamp_ms == 0 {
            None
        } else {
            Some(timestamp_from_millis(timestamp_ms)?)
        };
        self.submit(path, as_of, callback)
    }

    /// Stops the worker runtime and releases the backend.
    ///
    /// Retrievals still in flight are cancelled and their callbacks receive
    /// an `abandoned` error. Blocking database calls get a short grace
    /// period. Dropping the module behaves the same way without the wait.
    pub fn shutdown(self) {
        let Self {
            runtime,
            registry,
            dispatcher,
        } = self;
        drop(dispatcher);
        drop(registry);
        runtime.shutdown_timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS));
        tracing::info!("retrieval runtime shut down");
    }

    fn submit<F>(
        &self,
        path: &str,
        as_of: Option<DateTime<Utc>>,
        callback: F,
    ) -> Result<RequestId, HostError>
    where
        F: FnOnce(Option<ErrorDescriptor>, Option<String>) + Send + 'static,
    {
        let id = self.dispatcher.submit_at(path, as_of, move |outcome| {
            let (error, result) = callback_args(outcome);
            callback(error, result);
        })?;
        Ok(id)
    }
}

fn callback_args(outcome: RetrievalOutcome) -> (Option<ErrorDescriptor>, Option<String>) {
    match outcome {
        RetrievalOutcome::Success(payload) => (None, Some(payload)),
        RetrievalOutcome::Failure(err) => (Some(ErrorDescriptor::from(&err)), None),
    }
}

fn timestamp_from_millis(timestamp_ms: u64) -> Result<DateTime<Utc>, HostError> {
    i64::try_from(timestamp_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or(HostError::InvalidTimestamp(timestamp_ms))
}
