//! `PostgreSQL` adapter for object retrieval.

mod backend;
mod models;
pub(crate) mod schema;

pub(crate) use backend::latest_version_query;
pub use backend::{ObjectPgPool, PostgresObjectBackend};
