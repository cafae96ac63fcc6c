//! Adapter implementations for object retrieval ports.

pub mod ccdb;
pub mod memory;
pub mod postgres;

mod connector;

pub use connector::DefaultBackendConnector;
