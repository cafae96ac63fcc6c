//! Per-request lifecycle state machine.

use super::InvalidStateTransition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of one submitted retrieval.
///
/// `Created -> Dispatched -> (Succeeded | Failed) -> Delivered`. No state is
/// skipped and nothing re-enters `Dispatched`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    /// The request has been parsed but not yet handed to a worker.
    Created,
    /// A background worker owns the request.
    Dispatched,
    /// The backend produced a payload.
    Succeeded,
    /// The backend, the worker, or the timeout produced an error.
    Failed,
    /// The completion sink has been invoked.
    Delivered,
}

impl RequestState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Dispatched => "dispatched",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Delivered => "delivered",
        }
    }

    /// Returns whether moving from `self` to `next` is permitted.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Dispatched)
                | (Self::Dispatched, Self::Succeeded | Self::Failed)
                | (Self::Succeeded | Self::Failed, Self::Delivered)
        )
    }

    /// Moves to `next`, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStateTransition`] when the move is not permitted.
    pub const fn transition_to(self, next: Self) -> Result<Self, InvalidStateTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidStateTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Returns whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
