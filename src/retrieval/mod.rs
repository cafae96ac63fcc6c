//! Asynchronous retrieval of named objects as JSON.
//!
//! A [`services::BackendRegistry`] owns the single backend handle of the
//! process; a [`services::RetrievalDispatcher`] turns `namespace/name` paths
//! into background retrievals against it and reports each outcome exactly
//! once. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
