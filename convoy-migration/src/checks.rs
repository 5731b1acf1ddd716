//! Start-then-await check flows
//!
//! The harness verifies a migration in two waits: restore the backup and
//! wait for the restore task to finish, then start the replication task
//! and wait for it to drain. Each flow returns the poller's terminal
//! outcome, with start rejections and unresolvable identifiers kept
//! distinguishable from remote failures and timeouts.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use convoy_core::domain::operation::OperationId;
use convoy_core::domain::outcome::PollOutcome;
use convoy_core::error::SourceUnavailable;
use convoy_poller::{
    CancellationToken, OperationControl, OperationPoller, PollPolicy, StartRejected,
};

use crate::replication::{
    ReplicationStatusSource, ReplicationTaskApi, ReplicationTaskControl, StartMode,
};
use crate::restore::{RestoreStatusSource, RestoreTaskApi};

/// A check flow failed before reaching a poll outcome
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// The remote system refused to start the operation
    #[error(transparent)]
    Start(#[from] StartRejected),
    /// The operation identifier never resolved to a known operation
    #[error(transparent)]
    Source(#[from] SourceUnavailable),
}

/// Waits for the newest restore task of `database` to finish
///
/// The restore itself is started out of band (the backup upload and the
/// restore procedure call belong to the orchestration layer); this flow
/// only drives the wait.
pub async fn run_restore_check(
    api: Arc<dyn RestoreTaskApi>,
    policy: PollPolicy,
    database: &str,
    cancel: &CancellationToken,
) -> Result<PollOutcome, CheckError> {
    let operation_id = OperationId::new(database);
    info!(database, budget = ?policy.total_budget(), "waiting for restore task");

    let source = RestoreStatusSource::new(api);
    let poller = OperationPoller::new(policy);
    let outcome = poller.poll(&source, &operation_id, cancel).await?;

    info!(database, outcome = ?outcome, "restore wait finished");
    Ok(outcome)
}

/// Starts the replication task and waits for it to drain
pub async fn run_replication_check(
    api: Arc<dyn ReplicationTaskApi>,
    mode: StartMode,
    policy: PollPolicy,
    task_arn: &str,
    cancel: &CancellationToken,
) -> Result<PollOutcome, CheckError> {
    let operation_id = OperationId::new(task_arn);

    let control = ReplicationTaskControl::new(Arc::clone(&api), mode);
    control.start(&operation_id).await?;
    info!(task = %operation_id, %mode, "replication task started");

    let source = ReplicationStatusSource::new(api);
    let poller = OperationPoller::new(policy);
    let outcome = poller.poll(&source, &operation_id, cancel).await?;

    info!(task = %operation_id, outcome = ?outcome, "replication wait finished");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replication::{ReplicationTaskDescription, ReplicationTaskStats, StartMode};
    use crate::restore::{RestoreLifecycle, RestoreTaskRecord};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    struct FakeReplicationApi {
        starts: Mutex<Vec<StartMode>>,
        script: Mutex<VecDeque<ReplicationTaskDescription>>,
        reject_start: bool,
    }

    impl FakeReplicationApi {
        fn new(script: Vec<ReplicationTaskDescription>) -> Self {
            Self {
                starts: Mutex::new(Vec::new()),
                script: Mutex::new(script.into()),
                reject_start: false,
            }
        }

        fn rejecting() -> Self {
            Self {
                starts: Mutex::new(Vec::new()),
                script: Mutex::new(VecDeque::new()),
                reject_start: true,
            }
        }
    }

    #[async_trait]
    impl ReplicationTaskApi for FakeReplicationApi {
        async fn describe_task(
            &self,
            _task_arn: &str,
        ) -> Result<Vec<ReplicationTaskDescription>, SourceUnavailable> {
            let mut script = self.script.lock().unwrap();
            // the last description keeps repeating, like a settled remote task
            let task = match script.len() {
                0 => return Ok(Vec::new()),
                1 => script.front().cloned(),
                _ => script.pop_front(),
            };
            Ok(task.into_iter().collect())
        }

        async fn start_task(
            &self,
            task_arn: &str,
            mode: StartMode,
        ) -> Result<(), StartRejected> {
            if self.reject_start {
                return Err(StartRejected::new(task_arn, "task is already running"));
            }
            self.starts.lock().unwrap().push(mode);
            Ok(())
        }
    }

    struct FakeRestoreApi {
        records: Vec<RestoreTaskRecord>,
    }

    #[async_trait]
    impl RestoreTaskApi for FakeRestoreApi {
        async fn task_status(
            &self,
            _database_name: &str,
        ) -> Result<Vec<RestoreTaskRecord>, SourceUnavailable> {
            Ok(self.records.clone())
        }
    }

    fn task(status: &str, percent: Option<u8>) -> ReplicationTaskDescription {
        ReplicationTaskDescription {
            replication_task_identifier: "conversation-log-full-load".to_string(),
            replication_task_arn: "arn:task/conversation-log".to_string(),
            status: status.to_string(),
            last_failure_message: None,
            stop_reason: None,
            replication_task_creation_date: None,
            replication_task_start_date: None,
            replication_task_stats: percent.map(|p| ReplicationTaskStats {
                full_load_progress_percent: Some(p),
                tables_loaded: 7,
                tables_errored: 0,
                tables_queued: 0,
            }),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_replication_check_starts_then_waits_to_drain() {
        let api = Arc::new(FakeReplicationApi::new(vec![
            task("starting", None),
            task("running", Some(40)),
            task("stopped", Some(100)),
        ]));

        let outcome = run_replication_check(
            Arc::clone(&api) as Arc<dyn ReplicationTaskApi>,
            StartMode::ReloadTarget,
            PollPolicy::new(Duration::from_secs(15), 40),
            "arn:task/conversation-log",
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(outcome.is_success());
        assert_eq!(*api.starts.lock().unwrap(), vec![StartMode::ReloadTarget]);
    }

    #[tokio::test]
    async fn test_replication_check_surfaces_start_rejection() {
        let api = Arc::new(FakeReplicationApi::rejecting());

        let err = run_replication_check(
            api as Arc<dyn ReplicationTaskApi>,
            StartMode::ReloadTarget,
            PollPolicy::new(Duration::from_secs(15), 40),
            "arn:task/conversation-log",
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CheckError::Start(_)));
    }

    #[tokio::test]
    async fn test_replication_check_surfaces_unknown_task() {
        let api = Arc::new(FakeReplicationApi::new(Vec::new()));

        let err = run_replication_check(
            api as Arc<dyn ReplicationTaskApi>,
            StartMode::ReloadTarget,
            PollPolicy::new(Duration::from_secs(15), 40),
            "arn:task/missing",
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CheckError::Source(_)));
    }

    #[tokio::test]
    async fn test_restore_check_fails_on_errored_restore() {
        let api = Arc::new(FakeRestoreApi {
            records: vec![RestoreTaskRecord {
                task_id: 7,
                task_type: "RESTORE_DB".to_string(),
                database_name: "ConversationLog".to_string(),
                lifecycle: RestoreLifecycle::Error,
                percent_complete: Some(30),
                task_info: Some("restore failed: bad media family".to_string()),
                created_at: None,
                last_updated: None,
            }],
        });

        let outcome = run_restore_check(
            api as Arc<dyn RestoreTaskApi>,
            PollPolicy::new(Duration::from_secs(15), 15),
            "ConversationLog",
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        match outcome {
            PollOutcome::Failed(failure) => {
                assert_eq!(
                    failure.message.as_deref(),
                    Some("restore failed: bad media family")
                );
                assert_eq!(failure.progress_percent, Some(30));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
