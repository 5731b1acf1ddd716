//! Terminal outcomes of a poll session

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::domain::operation::{OperationStatus, StatusKind};

/// Diagnostic payload for an operation that ran and reported failure
///
/// Carries everything the remote side disclosed about what went wrong:
/// the classification that triggered the failure decision, the remote
/// failure text, and the last-seen progress. An inconsistent completion
/// (terminal classification with partial progress or a populated error
/// string) lands here too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFailure {
    /// Classification of the snapshot that failed the session
    pub kind: StatusKind,
    /// Failure text reported by the remote system, if any
    pub message: Option<String>,
    /// Last-seen progress in percent, if reported
    pub progress_percent: Option<u8>,
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "remote operation {}", self.kind)?;
        if let Some(percent) = self.progress_percent {
            write!(f, " at {percent}% progress")?;
        }
        match &self.message {
            Some(message) => write!(f, ": {message}"),
            None => write!(f, ": no failure message reported"),
        }
    }
}

/// Terminal result of one poll session
///
/// A poller emits exactly one of these and is done; it holds no further
/// state and is not reused across operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PollOutcome {
    /// Corroborated success, with the final snapshot
    Completed(OperationStatus),
    /// The operation ran and reported failure or inconsistent completion
    Failed(RemoteFailure),
    /// Budget exhausted before any terminal state was observed
    ///
    /// `elapsed` is the nominal `attempts x interval` figure, not a
    /// wall-clock measurement.
    TimedOut { attempts: u32, elapsed: Duration },
    /// The caller cancelled the session during an inter-poll suspension
    ///
    /// Cancellation stops polling only; the remote operation is never
    /// signalled to stop.
    Cancelled { attempts: u32 },
}

impl PollOutcome {
    /// Whether the session ended in corroborated success
    pub fn is_success(&self) -> bool {
        matches!(self, PollOutcome::Completed(_))
    }
}
