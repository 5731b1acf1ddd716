//! Operation identity and status snapshots

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a remote long-running operation
///
/// Remote systems name operations however they like (a task ARN, a
/// database name, a numeric task id rendered as text); the poller never
/// interprets the contents, it only hands the identifier back to the
/// status source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(String);

impl OperationId {
    /// Creates an identifier from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as the remote system spelled it
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for OperationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Classification of a status snapshot
///
/// Closed vocabulary every status source must map its remote states onto.
/// `Stopped` covers remote systems whose normal terminal state is a stop
/// (a drained full-load task) as well as operator-cancelled operations;
/// whether a stop was a success is decided by the completion policy, not
/// by the classification alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusKind {
    Running,
    Succeeded,
    Failed,
    Stopped,
}

impl StatusKind {
    /// Whether the remote operation will not change state further
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StatusKind::Running)
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusKind::Running => "running",
            StatusKind::Succeeded => "succeeded",
            StatusKind::Failed => "failed",
            StatusKind::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Point-in-time snapshot of a remote operation
///
/// Returned by one status fetch. Successive snapshots for the same
/// operation are only comparable on `kind` and `progress_percent`;
/// progress monotonicity is a property of the specific remote system,
/// not of this contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationStatus {
    pub operation_id: OperationId,
    pub kind: StatusKind,
    /// Progress indicator in percent, when the remote system reports one
    pub progress_percent: Option<u8>,
    /// Remote failure diagnostic, when one is populated
    pub failure_message: Option<String>,
}

impl OperationStatus {
    /// Creates a snapshot with no progress or failure information
    pub fn new(operation_id: impl Into<OperationId>, kind: StatusKind) -> Self {
        Self {
            operation_id: operation_id.into(),
            kind,
            progress_percent: None,
            failure_message: None,
        }
    }

    /// Sets the progress indicator
    pub fn with_progress(mut self, percent: u8) -> Self {
        self.progress_percent = Some(percent);
        self
    }

    /// Sets the failure diagnostic
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }
}
