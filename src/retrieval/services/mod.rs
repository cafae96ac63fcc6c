//! Application services for backend lifecycle and retrieval dispatch.

mod dispatcher;
mod registry;

pub use dispatcher::{DispatchError, DispatchResult, PendingRetrieval, RetrievalDispatcher};
pub use registry::{BackendRegistry, InitializationError, NotInitializedError};
