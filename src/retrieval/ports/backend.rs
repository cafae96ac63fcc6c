//! Backend port: the capability that turns a request into a JSON payload.

use crate::retrieval::domain::RetrievalRequest;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for backend retrieval operations.
pub type RetrievalResult<T> = Result<T, RetrievalError>;

/// Object repository contract.
///
/// Implementations are shared by every in-flight retrieval and must be safe
/// for concurrent calls to [`ObjectBackend::retrieve`]; any synchronization
/// they need is their own.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Fetches the object named by `request` and returns it JSON-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::NotFound`] when no such object exists, or
    /// another [`RetrievalError`] variant for transport, status and decoding
    /// failures.
    async fn retrieve(&self, request: &RetrievalRequest) -> RetrievalResult<String>;
}

/// Errors produced while retrieving one object.
///
/// These never cross the background boundary as a panic or a return value of
/// `submit`; they only reach callers through the completion sink.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    /// The repository holds no object at this path.
    #[error("object not found: {namespace}/{name}")]
    NotFound {
        /// Requested namespace.
        namespace: String,
        /// Requested object name.
        name: String,
    },

    /// The repository could not be reached.
    #[error("object repository connection failed: {0}")]
    Connection(Arc<dyn std::error::Error + Send + Sync>),

    /// The repository answered with an unexpected status.
    #[error("object repository returned status {status} for {path}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested `namespace/name`.
        path: String,
    },

    /// The stored payload could not be read as JSON.
    #[error("object payload is not valid JSON: {0}")]
    Decode(Arc<dyn std::error::Error + Send + Sync>),

    /// Any other repository-side failure.
    #[error("object repository error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),

    /// The retrieval exceeded the dispatcher timeout.
    #[error("retrieval timed out after {0:?}")]
    Timeout(Duration),

    /// The background worker terminated without producing a result.
    #[error("retrieval worker aborted: {0}")]
    Aborted(String),

    /// The outcome was dropped before it could be delivered.
    #[error("retrieval was abandoned before an outcome was delivered")]
    Abandoned,
}

impl RetrievalError {
    /// Builds a not-found error for `request`.
    #[must_use]
    pub fn not_found(request: &RetrievalRequest) -> Self {
        Self::NotFound {
            namespace: request.namespace().to_owned(),
            name: request.name().to_owned(),
        }
    }

    /// Wraps a transport error.
    pub fn connection(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Connection(Arc::new(err))
    }

    /// Wraps a JSON decoding error.
    pub fn decode(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Decode(Arc::new(err))
    }

    /// Wraps a repository error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }

    /// Returns a stable machine-readable code for this error kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Connection(_) => "connection",
            Self::Status { .. } => "status",
            Self::Decode(_) => "decode",
            Self::Backend(_) => "backend",
            Self::Timeout(_) => "timeout",
            Self::Aborted(_) => "aborted",
            Self::Abandoned => "abandoned",
        }
    }
}

/// Outcome of one retrieval, produced and consumed exactly once.
#[derive(Debug, Clone)]
pub enum RetrievalOutcome {
    /// JSON-encoded object.
    Success(String),
    /// Why no payload is available.
    Failure(RetrievalError),
}

impl RetrievalOutcome {
    /// Returns whether this outcome carries a payload.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Converts the outcome into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the carried [`RetrievalError`] for a failure outcome.
    pub fn into_result(self) -> RetrievalResult<String> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Failure(err) => Err(err),
        }
    }
}

impl From<RetrievalResult<String>> for RetrievalOutcome {
    fn from(result: RetrievalResult<String>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(err) => Self::Failure(err),
        }
    }
}
