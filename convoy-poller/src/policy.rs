//! Poll policy and completion classification
//!
//! A [`PollPolicy`] fixes the cadence and retry budget of one poll
//! session, plus the completion predicate that decides what a snapshot
//! means. The two harness use sites share everything here except the
//! budget, which is why the budget is configuration and not a constant.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use convoy_core::domain::operation::{OperationStatus, StatusKind};

/// Decision produced by classifying one status snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionDecision {
    /// No terminal decision yet, keep polling
    Pending,
    /// Definitive, corroborated success
    Complete,
    /// Definitive failure, with whatever the remote side disclosed
    Failed {
        kind: StatusKind,
        message: Option<String>,
        progress_percent: Option<u8>,
    },
}

/// Completion predicate over status snapshots
///
/// Decides, from a single snapshot, whether the operation is definitively
/// done, definitively failed, or still ambiguous.
pub trait CompletionPolicy: Send + Sync {
    /// Classifies one snapshot
    fn classify(&self, status: &OperationStatus) -> CompletionDecision;
}

/// Default completion policy requiring corroborated success
///
/// A terminal-looking classification is never trusted alone. The systems
/// this harness polls can report a terminal state while progress is
/// incomplete or an error string is populated, and calling that success
/// would silently pass a broken migration. Success requires all three
/// signals to agree: a terminal-success kind, progress of 100 when a
/// progress figure is present, and no failure message.
///
/// `Stopped` is a terminal-success candidate because the migration
/// service reports a drained full-load task as stopped; a stop with
/// partial progress or a failure message is a failure like any other.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictCompletion;

impl CompletionPolicy for StrictCompletion {
    fn classify(&self, status: &OperationStatus) -> CompletionDecision {
        match status.kind {
            StatusKind::Running => CompletionDecision::Pending,
            StatusKind::Succeeded | StatusKind::Stopped => {
                let progress_ok = status.progress_percent.unwrap_or(100) == 100;
                if progress_ok && status.failure_message.is_none() {
                    CompletionDecision::Complete
                } else {
                    CompletionDecision::Failed {
                        kind: status.kind,
                        message: status.failure_message.clone(),
                        progress_percent: status.progress_percent,
                    }
                }
            }
            StatusKind::Failed => CompletionDecision::Failed {
                kind: status.kind,
                message: status.failure_message.clone(),
                progress_percent: status.progress_percent,
            },
        }
    }
}

/// Immutable configuration for one poll session
///
/// Cloning is cheap; the completion policy is shared behind an `Arc`.
#[derive(Clone)]
pub struct PollPolicy {
    /// Delay between status checks
    pub interval: Duration,
    /// Maximum number of status checks before the session times out
    pub max_attempts: u32,
    completion: Arc<dyn CompletionPolicy>,
}

impl PollPolicy {
    /// Creates a policy using the strict default completion predicate
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            completion: Arc::new(StrictCompletion),
        }
    }

    /// Replaces the completion predicate
    pub fn with_completion(mut self, completion: impl CompletionPolicy + 'static) -> Self {
        self.completion = Arc::new(completion);
        self
    }

    /// The completion predicate for this session
    pub fn completion(&self) -> &dyn CompletionPolicy {
        self.completion.as_ref()
    }

    /// Total nominal wait budget for the session
    pub fn total_budget(&self) -> Duration {
        self.interval * self.max_attempts
    }

    /// Validates the policy
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval.is_zero() {
            anyhow::bail!("poll interval must be greater than 0");
        }

        if self.max_attempts == 0 {
            anyhow::bail!("max_attempts must be greater than 0");
        }

        Ok(())
    }
}

impl fmt::Debug for PollPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollPolicy")
            .field("interval", &self.interval)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}
