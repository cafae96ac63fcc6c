//! Port contracts for object retrieval.
//!
//! Ports define infrastructure-agnostic interfaces used by the registry and
//! dispatcher services.

pub mod backend;
pub mod connector;

pub use backend::{ObjectBackend, RetrievalError, RetrievalOutcome, RetrievalResult};
pub use connector::{BackendConnector, ConnectError};
