use strum::{AsRefStr, Display};
use tracing::debug;

/// Where a client request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RequestState {
    Received,
    /// Sub-queries were extracted for every source schema involved.
    Extracted,
    Dispatching,
    Merging,
    Completed,
    /// Some sub-dispatches failed, the response carries the data of the others.
    PartiallyFailed,
    Failed,
    Cancelled,
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestState::Completed
                | RequestState::PartiallyFailed
                | RequestState::Failed
                | RequestState::Cancelled
        )
    }

    fn can_advance_to(&self, next: RequestState) -> bool {
        use RequestState::*;

        match (self, next) {
            (_, Cancelled) | (_, Failed) => !self.is_terminal(),
            (Received, Extracted) => true,
            (Extracted, Dispatching) => true,
            // Mutations dispatch one group after the other.
            (Dispatching, Dispatching) => true,
            (Extracted | Dispatching, Merging) => true,
            (Merging, Completed | PartiallyFailed) => true,
            _ => false,
        }
    }
}

/// Records the state transitions of one request.
#[derive(Debug)]
pub struct RequestLifecycle {
    state: RequestState,
}

impl Default for RequestLifecycle {
    fn default() -> Self {
        debug!(state = %RequestState::Received, "request state");
        RequestLifecycle {
            state: RequestState::Received,
        }
    }
}

impl RequestLifecycle {
    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn advance(&mut self, next: RequestState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid request state transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "request state");
        self.state = next;
    }
}
