//! tobject2json: fetch named objects as JSON without blocking the caller.
//!
//! Objects live in an external repository (a `PostgreSQL` table or an HTTP
//! object service) and are addressed by `<namespace>/<name>` paths. This
//! crate owns the surrounding lifecycle: one lazily created backend per
//! process, and a dispatcher that runs every retrieval on a background task
//! and reports its outcome exactly once.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Requests, lifecycle states and configuration values
//! - **Ports**: The backend and connector traits
//! - **Adapters**: HTTP, `PostgreSQL` and in-memory backends
//!
//! # Modules
//!
//! - [`retrieval`]: Backend registry and retrieval dispatch
//! - [`host`]: Boundary entry points for an embedding host

pub mod host;
pub mod retrieval;
