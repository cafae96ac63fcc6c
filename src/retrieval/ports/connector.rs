//! Connector port: builds a backend from configuration.

use super::ObjectBackend;
use crate::retrieval::domain::{BackendConfig, ConfigurationError};
use std::sync::Arc;
use thiserror::Error;

/// Factory that establishes a backend for a configuration.
///
/// Connecting is synchronous so that configuration and connection failures
/// surface to the caller of `initialize` rather than to a background task.
pub trait BackendConnector: Send + Sync {
    /// Constructs a backend and establishes connectivity.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError`] when the configuration cannot be used or the
    /// repository is unreachable.
    fn connect(&self, config: &BackendConfig) -> Result<Arc<dyn ObjectBackend>, ConnectError>;
}

/// Errors returned while establishing a backend.
#[derive(Debug, Clone, Error)]
pub enum ConnectError {
    /// The configuration is not usable by this connector.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The repository could not be reached or the client could not be built.
    #[error("unable to connect to {backend} object repository: {reason}")]
    Connection {
        /// Backend label, such as `ccdb` or `postgres`.
        backend: &'static str,
        /// Underlying failure.
        reason: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl ConnectError {
    /// Wraps a connection failure for the named backend.
    pub fn connection(
        backend: &'static str,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            backend,
            reason: Arc::new(err),
        }
    }
}
