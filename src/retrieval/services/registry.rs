//! Service holding the single backend handle of a process.
//!
//! Provides [`BackendRegistry`], which creates the backend lazily on the
//! first successful [`BackendRegistry::initialize`] and hands out shared
//! references to it afterwards.

use crate::retrieval::{
    domain::{BackendConfig, ConfigurationError},
    ports::{BackendConnector, ConnectError, ObjectBackend},
};
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use thiserror::Error;

/// The registry has no backend yet.
///
/// Callers should treat this as a programming error rather than retry.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("object backend has not been initialized")]
pub struct NotInitializedError;

/// Errors returned by [`BackendRegistry::initialize`].
#[derive(Debug, Error)]
pub enum InitializationError {
    /// The configuration is invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The connector could not reach the repository.
    #[error(transparent)]
    Connect(ConnectError),
}

impl From<ConnectError> for InitializationError {
    fn from(err: ConnectError) -> Self {
        match err {
            ConnectError::Configuration(config) => Self::Configuration(config),
            other @ ConnectError::Connection { .. } => Self::Connect(other),
        }
    }
}

/// Owner of the process-wide backend handle.
///
/// Creation happens at most once: concurrent first-time initializers are
/// serialized by a guard, and reads after initialization are lock-free.
/// Dropping the registry drops the handle.
pub struct BackendRegistry {
    connector: Arc<dyn BackendConnector>,
    handle: OnceLock<Arc<dyn ObjectBackend>>,
    init_guard: Mutex<()>,
}

impl BackendRegistry {
    /// Creates an empty registry that will connect through `connector`.
    #[must_use]
    pub fn new(connector: Arc<dyn BackendConnector>) -> Self {
        Self {
            connector,
            handle: OnceLock::new(),
            init_guard: Mutex::new(()),
        }
    }

    /// Connects the backend on first call; later calls are no-ops.
    ///
    /// Once a handle exists, `config` is ignored entirely: no reconnect, no
    /// error, and no comparison with the configuration that created it. A
    /// failed connect leaves the registry empty so a later call may retry.
    ///
    /// # Errors
    ///
    /// Returns [`InitializationError`] when the connector rejects the
    /// configuration or cannot reach the repository.
    pub fn initialize(&self, config: &BackendConfig) -> Result<(), InitializationError> {
        if self.is_initialized() {
            tracing::debug!(
                backend = config.label(),
                "backend already initialized, ignoring configuration"
            );
            return Ok(());
        }

        // The guard protects no data, so a panicked initializer leaves
        // nothing to repair.
        let _guard = self
            .init_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.is_initialized() {
            return Ok(());
        }

        let backend = self.connector.connect(config)?;
        if self.handle.set(backend).is_err() {
            tracing::warn!("backend handle was set concurrently, keeping the existing one");
        }
        tracing::info!(backend = config.label(), "object backend initialized");
        Ok(())
    }

    /// Returns a shared reference to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`NotInitializedError`] before a successful
    /// [`BackendRegistry::initialize`].
    pub fn handle(&self) -> Result<Arc<dyn ObjectBackend>, NotInitializedError> {
        self.handle.get().cloned().ok_or(NotInitializedError)
    }

    /// Returns whether a backend handle exists.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.handle.get().is_some()
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}
