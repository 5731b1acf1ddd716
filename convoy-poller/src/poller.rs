//! Operation poller
//!
//! Drives a remote long-running operation to a single terminal outcome:
//! fetch status through the injected source, classify the snapshot
//! against the policy's completion predicate, and either finish, keep
//! waiting, time out, or observe cancellation during the inter-poll
//! suspension.

use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use convoy_core::domain::operation::OperationId;
use convoy_core::domain::outcome::{PollOutcome, RemoteFailure};
use convoy_core::error::SourceUnavailable;

use crate::policy::{CompletionDecision, PollPolicy};
use crate::source::StatusSource;

/// Generic poller for remote long-running operations
///
/// One value drives one operation to exactly one [`PollOutcome`] and is
/// then discarded. All session state (the attempt counter and the most
/// recent snapshot) lives on the stack of [`poll`](OperationPoller::poll),
/// so independent sessions share nothing and need no locking.
pub struct OperationPoller {
    policy: PollPolicy,
}

impl OperationPoller {
    /// Creates a poller for one session
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    /// The policy driving this session
    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Polls the operation until the session reaches a terminal outcome
    ///
    /// A [`SourceUnavailable`] from the source propagates immediately with
    /// zero retries: an unresolvable identifier is a caller mistake, not a
    /// transient remote condition. Cancelling the token aborts the session
    /// during the sleep between checks and yields
    /// [`PollOutcome::Cancelled`]; the remote operation itself is never
    /// told to stop.
    pub async fn poll<S>(
        &self,
        source: &S,
        operation_id: &OperationId,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome, SourceUnavailable>
    where
        S: StatusSource + ?Sized,
    {
        let mut attempts: u32 = 0;

        loop {
            let status = source.fetch(operation_id).await?;
            attempts += 1;

            debug!(
                operation = %operation_id,
                attempt = attempts,
                status = %status.kind,
                progress = status.progress_percent,
                "fetched operation status"
            );

            match self.policy.completion().classify(&status) {
                CompletionDecision::Complete => {
                    info!(operation = %operation_id, attempts, "operation completed");
                    return Ok(PollOutcome::Completed(status));
                }
                CompletionDecision::Failed {
                    kind,
                    message,
                    progress_percent,
                } => {
                    let failure = RemoteFailure {
                        kind,
                        message,
                        progress_percent,
                    };
                    warn!(operation = %operation_id, attempts, %failure, "operation failed");
                    return Ok(PollOutcome::Failed(failure));
                }
                CompletionDecision::Pending => {}
            }

            if attempts >= self.policy.max_attempts {
                let elapsed = self.policy.interval * attempts;
                warn!(
                    operation = %operation_id,
                    attempts,
                    ?elapsed,
                    "operation did not reach a terminal state within budget"
                );
                return Ok(PollOutcome::TimedOut { attempts, elapsed });
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(operation = %operation_id, attempts, "poll session cancelled");
                    return Ok(PollOutcome::Cancelled { attempts });
                }
                _ = time::sleep(self.policy.interval) => {}
            }
        }
    }
}
