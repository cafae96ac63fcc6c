//! Service that runs retrievals off the caller's thread.
//!
//! [`RetrievalDispatcher::submit`] validates its input synchronously, spawns
//! one background task per accepted request, and returns immediately. The
//! task calls the backend and then invokes the completion sink exactly once
//! with the [`RetrievalOutcome`].

use super::registry::{BackendRegistry, NotInitializedError};
use crate::retrieval::{
    domain::{RequestError, RequestId, RequestState, RetrievalRequest},
    ports::{ObjectBackend, RetrievalError, RetrievalOutcome},
};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::Instrument;

/// Precondition failures raised by `submit` before anything is scheduled.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The path could not form a request.
    #[error(transparent)]
    Request(#[from] RequestError),
    /// No backend has been initialized.
    #[error(transparent)]
    NotInitialized(#[from] NotInitializedError),
}

/// Result type for dispatcher submissions.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Dispatches retrievals against the registry's backend.
#[derive(Debug, Clone)]
pub struct RetrievalDispatcher {
    registry: Arc<BackendRegistry>,
    runtime: Handle,
    timeout: Option<Duration>,
}

impl RetrievalDispatcher {
    /// Creates a dispatcher spawning its work on `runtime`.
    #[must_use]
    pub const fn new(registry: Arc<BackendRegistry>, runtime: Handle) -> Self {
        Self {
            registry,
            runtime,
            timeout: None,
        }
    }

    /// Bounds every retrieval by `timeout`; expiry yields
    /// [`RetrievalError::Timeout`].
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Submits a retrieval of the latest version of `path`.
    ///
    /// On acceptance `on_complete` is invoked exactly once, from a runtime
    /// worker, with the outcome. If the runtime shuts down first it receives
    /// [`RetrievalError::Abandoned`] from the thread dropping the runtime. On
    /// rejection it is dropped uncalled.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Request`] for an empty path and
    /// [`DispatchError::NotInitialized`] when the registry has no backend.
    pub fn submit<F>(&self, path: &str, on_complete: F) -> DispatchResult<RequestId>
    where
        F: FnOnce(RetrievalOutcome) + Send + 'static,
    {
        self.submit_at(path, None, on_complete)
    }

    /// Submits a retrieval of the newest version of `path` created at or
    /// before `as_of`, or the latest version when `as_of` is `None`.
    ///
    /// # Errors
    ///
    /// See [`RetrievalDispatcher::submit`].
    pub fn submit_at<F>(
        &self,
        path: &str,
        as_of: Option<DateTime<Utc>>,
        on_complete: F,
    ) -> DispatchResult<RequestId>
    where
        F: FnOnce(RetrievalOutcome) + Send + 'static,
    {
        let mut request = RetrievalRequest::parse(path)?;
        if let Some(timestamp) = as_of {
            request = request.with_as_of(timestamp);
        }
        let backend = self.registry.handle()?;

        let job = RetrievalJob::new(request);
        let id = job.id;
        let span = tracing::info_span!(
            "retrieval",
            request_id = %id,
            namespace = job.request.namespace(),
            name = job.request.name(),
        );
        let sink = CompletionSink::new(on_complete);
        drop(
            self.runtime
                .spawn(job.run(backend, self.timeout, sink).instrument(span)),
        );
        Ok(id)
    }

    /// Submits a retrieval and returns a future resolving to its outcome.
    ///
    /// # Errors
    ///
    /// See [`RetrievalDispatcher::submit`].
    pub fn retrieve(&self, path: &str) -> DispatchResult<PendingRetrieval> {
        self.retrieve_at(path, None)
    }

    /// Timestamp-selecting variant of [`RetrievalDispatcher::retrieve`].
    ///
    /// # Errors
    ///
    /// See [`RetrievalDispatcher::submit`].
    pub fn retrieve_at(
        &self,
        path: &str,
        as_of: Option<DateTime<Utc>>,
    ) -> DispatchResult<PendingRetrieval> {
        let (sender, receiver) = oneshot::channel();
        let id = self.submit_at(path, as_of, move |outcome| {
            if sender.send(outcome).is_err() {
                tracing::debug!("retrieval receiver dropped before delivery");
            }
        })?;
        Ok(PendingRetrieval { id, receiver })
    }
}

/// Future resolving to the outcome of one submitted retrieval.
#[derive(Debug)]
pub struct PendingRetrieval {
    id: RequestId,
    receiver: oneshot::Receiver<RetrievalOutcome>,
}

impl PendingRetrieval {
    /// Returns the identifier of the underlying submission.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }
}

impl Future for PendingRetrieval {
    type Output = RetrievalOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(|received| {
            received.unwrap_or_else(|_| RetrievalOutcome::Failure(RetrievalError::Abandoned))
        })
    }
}

/// Holds a completion callback until it has been invoked.
///
/// Dropping an undelivered sink, for example when the runtime cancels the
/// job during shutdown, delivers [`RetrievalError::Abandoned`] instead.
struct CompletionSink<F>
where
    F: FnOnce(RetrievalOutcome),
{
    on_complete: Option<F>,
}

impl<F> CompletionSink<F>
where
    F: FnOnce(RetrievalOutcome),
{
    const fn new(on_complete: F) -> Self {
        Self {
            on_complete: Some(on_complete),
        }
    }

    fn deliver(mut self, outcome: RetrievalOutcome) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(outcome);
        }
    }
}

impl<F> Drop for CompletionSink<F>
where
    F: FnOnce(RetrievalOutcome),
{
    fn drop(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            tracing::warn!("retrieval cancelled before completion");
            on_complete(RetrievalOutcome::Failure(RetrievalError::Abandoned));
        }
    }
}

struct RetrievalJob {
    id: RequestId,
    request: RetrievalRequest,
    state: RequestState,
}

impl RetrievalJob {
    fn new(request: RetrievalRequest) -> Self {
        Self {
            id: RequestId::new(),
            request,
            state: RequestState::Created,
        }
    }

    fn advance(&mut self, next: RequestState) {
        match self.state.transition_to(next) {
            Ok(state) => {
                tracing::debug!(from = %self.state, to = %state, "retrieval state changed");
                self.state = state;
            }
            Err(err) => tracing::warn!(%err, "rejected retrieval state change"),
        }
    }

    async fn run<F>(
        mut self,
        backend: Arc<dyn ObjectBackend>,
        timeout: Option<Duration>,
        sink: CompletionSink<F>,
    ) where
        F: FnOnce(RetrievalOutcome) + Send + 'static,
    {
        self.advance(RequestState::Dispatched);
        let outcome = execute(backend, self.request.clone(), timeout).await;
        match &outcome {
            RetrievalOutcome::Success(payload) => {
                tracing::debug!(bytes = payload.len(), "retrieval succeeded");
                self.advance(RequestState::Succeeded);
            }
            RetrievalOutcome::Failure(err) => {
                tracing::warn!(error = %err, code = err.code(), "retrieval failed");
                self.advance(RequestState::Failed);
            }
        }
        sink.deliver(outcome);
        self.advance(RequestState::Delivered);
    }
}

/// Runs the backend call in its own task so a panicking backend still
/// yields an outcome.
async fn execute(
    backend: Arc<dyn ObjectBackend>,
    request: RetrievalRequest,
    timeout: Option<Duration>,
) -> RetrievalOutcome {
    let task = tokio::spawn(async move { backend.retrieve(&request).await });
    let joined = match timeout {
        Some(limit) => {
            let abort = task.abort_handle();
            let Ok(joined) = tokio::time::timeout(limit, task).await else {
                abort.abort();
                return RetrievalOutcome::Failure(RetrievalError::Timeout(limit));
            };
            joined
        }
        None => task.await,
    };

    match joined {
        Ok(result) => result.into(),
        Err(err) => RetrievalOutcome::Failure(RetrievalError::Aborted(err.to_string())),
    }
}
