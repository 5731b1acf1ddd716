//! Convoy Poller
//!
//! A generic state machine that drives a remote long-running operation
//! from "in progress" to exactly one terminal outcome, given an injected
//! status-fetch capability and a poll policy.
//!
//! The same engine serves every remote system the harness waits on; only
//! the [`StatusSource`] and the [`PollPolicy`] budget differ between use
//! sites. A poller value is created per operation, driven to one
//! [`convoy_core::domain::outcome::PollOutcome`], and discarded; sessions
//! share no mutable state and may run concurrently.

mod policy;
mod poller;
mod source;

pub use policy::{CompletionDecision, CompletionPolicy, PollPolicy, StrictCompletion};
pub use poller::OperationPoller;
pub use source::{OperationControl, StartRejected, StatusSource};

// Re-export the cancellation primitive that appears in `poll` signatures
pub use tokio_util::sync::CancellationToken;
