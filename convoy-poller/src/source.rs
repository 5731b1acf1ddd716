//! Capability contracts around a poll session
//!
//! The poller's only boundary is the status source it consumes in a loop.
//! Starting the remote operation is a separate capability invoked once,
//! before polling begins; the poller itself never starts or stops the
//! remote side.
//!
//! All capabilities are trait-based to enable testing and dependency
//! injection.

use async_trait::async_trait;
use thiserror::Error;

use convoy_core::domain::operation::{OperationId, OperationStatus};
use convoy_core::error::SourceUnavailable;

/// Fetches the current status of a named remote operation
///
/// Implementations own their transport, connection reuse, and
/// thread-safety; the poller only calls [`fetch`](StatusSource::fetch)
/// in a loop and classifies what comes back.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Returns a fresh status snapshot for the operation
    ///
    /// Fails with [`SourceUnavailable`] when the identifier does not
    /// resolve to any known operation. That failure is surfaced to the
    /// caller immediately, never retried.
    async fn fetch(
        &self,
        operation_id: &OperationId,
    ) -> Result<OperationStatus, SourceUnavailable>;
}

/// The remote system refused to start the operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to start operation {operation_id}: {message}")]
pub struct StartRejected {
    pub operation_id: OperationId,
    pub message: String,
}

impl StartRejected {
    /// Creates a rejection for the given operation
    pub fn new(operation_id: impl Into<OperationId>, message: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            message: message.into(),
        }
    }
}

/// Kicks off a remote long-running operation
///
/// Invoked once per check flow before the poll session starts. Cancelling
/// a poll session does not call back into this capability: polling stops,
/// the remote operation keeps running.
#[async_trait]
pub trait OperationControl: Send + Sync {
    /// Asks the remote system to start the operation
    async fn start(&self, operation_id: &OperationId) -> Result<(), StartRejected>;
}
