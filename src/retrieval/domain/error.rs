//! Error types for retrieval domain validation and parsing.

use super::RequestState;
use thiserror::Error;

/// Errors returned while constructing backend configuration values.
///
/// These are always raised synchronously to the caller, before any backend
/// is constructed or any retrieval is scheduled.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A mandatory field is empty after trimming.
    #[error("backend configuration field '{0}' must not be empty")]
    EmptyField(&'static str),

    /// The backend kind is not one this crate can connect to.
    #[error("unsupported backend kind '{0}' (expected 'ccdb' or 'postgres')")]
    UnsupportedKind(String),

    /// The service URL is not an absolute `http://` or `https://` URL.
    #[error("service URL '{0}' must be an absolute http:// or https:// URL")]
    InvalidUrl(String),

    /// The database host cannot form a valid connection address.
    #[error("backend host '{0}' is not a valid host[:port]")]
    InvalidHost(String),

    /// The host boundary received the wrong number of arguments.
    #[error(
        "expected 1 argument (url) or 5 arguments (kind, host, database, username, password), got {0}"
    )]
    ArgumentCount(usize),
}

/// Errors returned while turning a caller path into a retrieval request.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RequestError {
    /// The object path is the empty string.
    #[error("object path must not be empty")]
    EmptyPath,
}

/// A request lifecycle transition that the state machine does not permit.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("invalid retrieval state transition: {from} -> {to}")]
pub struct InvalidStateTransition {
    /// Current state.
    pub from: RequestState,
    /// Requested target state.
    pub to: RequestState,
}
