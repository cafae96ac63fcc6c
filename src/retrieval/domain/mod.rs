//! Domain model for object retrieval.
//!
//! Requests, their lifecycle states, and backend configuration. All
//! infrastructure concerns are kept outside the domain boundary.

mod config;
mod error;
mod ids;
mod request;
mod state;

pub use config::{
    BackendConfig, BackendKind, DatabaseConfig, ENV_DATABASE, ENV_HOST, ENV_KIND, ENV_PASSWORD,
    ENV_URL, ENV_USERNAME, ServiceConfig,
};
pub use error::{ConfigurationError, InvalidStateTransition, RequestError};
pub use ids::RequestId;
pub use request::RetrievalRequest;
pub use state::RequestState;
