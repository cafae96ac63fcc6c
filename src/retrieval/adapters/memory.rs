//! In-memory object backend for tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::retrieval::{
    domain::RetrievalRequest,
    ports::{ObjectBackend, RetrievalError, RetrievalResult},
};

/// Thread-safe, versioned in-memory object store.
///
/// Every request it receives is recorded so tests can assert exactly which
/// `(namespace, name)` pair reached the backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryObjectBackend {
    state: Arc<RwLock<InMemoryObjectState>>,
}

#[derive(Debug, Default)]
struct InMemoryObjectState {
    objects: HashMap<(String, String), Vec<StoredVersion>>,
    received: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct StoredVersion {
    created_at: DateTime<Utc>,
    payload: Value,
}

impl InMemoryObjectBackend {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new version of an object, timestamped now.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Backend`] when lock acquisition fails.
    pub fn insert(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        payload: Value,
    ) -> RetrievalResult<()> {
        self.insert_at(namespace, name, Utc::now(), payload)
    }

    /// Stores a new version of an object with an explicit creation time.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Backend`] when lock acquisition fails.
    pub fn insert_at(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        payload: Value,
    ) -> RetrievalResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| RetrievalError::backend(std::io::Error::other(err.to_string())))?;
        state
            .objects
            .entry((namespace.into(), name.into()))
            .or_default()
            .push(StoredVersion {
                created_at,
                payload,
            });
        Ok(())
    }

    /// Returns every `(namespace, name)` pair received so far, in order.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Backend`] when lock acquisition fails.
    pub fn received_requests(&self) -> RetrievalResult<Vec<(String, String)>> {
        let state = self
            .state
            .read()
            .map_err(|err| RetrievalError::backend(std::io::Error::other(err.to_string())))?;
        Ok(state.received.clone())
    }
}

#[async_trait]
impl ObjectBackend for InMemoryObjectBackend {
    async fn retrieve(&self, request: &RetrievalRequest) -> RetrievalResult<String> {
        let mut state = self
            .state
            .write()
            .map_err(|err| RetrievalError::backend(std::io::Error::other(err.to_string())))?;
        state
            .received
            .push((request.namespace().to_owned(), request.name().to_owned()));

        let key = (request.namespace().to_owned(), request.name().to_owned());
        let selected = state
            .objects
            .get(&key)
            .into_iter()
            .flatten()
            .filter(|version| request.as_of().is_none_or(|as_of| version.created_at <= as_of))
            .max_by_key(|version| version.created_at)
            .ok_or_else(|| RetrievalError::not_found(request))?;

        serde_json::to_string(&selected.payload).map_err(RetrievalError::decode)
    }
}
