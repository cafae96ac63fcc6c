//! HTTP object backend for CCDB-style repositories.
//!
//! Objects are addressed as `<base>/<namespace>/<name>` with an optional
//! trailing `/<millis>` version selector. The response body is returned
//! verbatim once it has been checked to be well-formed JSON.

use crate::retrieval::{
    domain::RetrievalRequest,
    ports::{ConnectError, ObjectBackend, RetrievalError, RetrievalResult},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::de::IgnoredAny;
use std::time::Duration;
use url::Url;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// Object backend talking to an HTTP object repository.
#[derive(Debug, Clone)]
pub struct CcdbObjectBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl CcdbObjectBackend {
    /// Creates a backend from an existing client.
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Builds an HTTP client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::Connection`] when the client cannot be built.
    pub fn connect(base_url: Url) -> Result<Self, ConnectError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
            .build()
            .map_err(|err| ConnectError::connection("ccdb", err))?;
        tracing::debug!(%base_url, "built CCDB client");
        Ok(Self::new(client, base_url))
    }

    /// Returns the repository base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the URL an object request resolves to.
    ///
    /// Each `/`-separated part of the name becomes its own percent-encoded
    /// path segment.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Backend`] when the base URL cannot carry a
    /// path.
    pub fn object_url(&self, request: &RetrievalRequest) -> RetrievalResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                RetrievalError::backend(std::io::Error::other(format!(
                    "base URL {} cannot carry a path",
                    self.base_url
                )))
            })?;
            segments
                .pop_if_empty()
                .push(request.namespace())
                .extend(request.name().split('/'));
            if let Some(as_of) = request.as_of() {
                segments.push(&as_of.timestamp_millis().to_string());
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ObjectBackend for CcdbObjectBackend {
    async fn retrieve(&self, request: &RetrievalRequest) -> RetrievalResult<String> {
        let url = self.object_url(request)?;
        tracing::debug!(%url, "requesting object");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(RetrievalError::connection)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RetrievalError::not_found(request));
        }
        if !status.is_success() {
            return Err(RetrievalError::Status {
                status: status.as_u16(),
                path: request.to_string(),
            });
        }

        let body = response.text().await.map_err(RetrievalError::connection)?;
        serde_json::from_str::<IgnoredAny>(&body).map_err(RetrievalError::decode)?;
        Ok(body)
    }
}
