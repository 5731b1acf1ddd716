//! Managed replication task status
//!
//! Documents mirror the migration service's describe-task responses
//! (PascalCase JSON). A full-load task reports `stopped` when it has
//! drained; whether that stop was a success is decided by progress and
//! failure message, never by the status string alone.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use convoy_core::domain::operation::{OperationId, OperationStatus, StatusKind};
use convoy_core::error::SourceUnavailable;
use convoy_poller::{OperationControl, StartRejected, StatusSource};

/// Start type vocabulary of the replication service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartMode {
    /// First start of a task
    StartReplication,
    /// Continue from where the task last stopped
    ResumeProcessing,
    /// Drop and reload the target, the mode the harness uses
    ReloadTarget,
}

impl StartMode {
    /// The mode as the service spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            StartMode::StartReplication => "start-replication",
            StartMode::ResumeProcessing => "resume-processing",
            StartMode::ReloadTarget => "reload-target",
        }
    }
}

impl fmt::Display for StartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a start type string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown start type: {0}")]
pub struct UnknownStartMode(pub String);

impl FromStr for StartMode {
    type Err = UnknownStartMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start-replication" => Ok(StartMode::StartReplication),
            "resume-processing" => Ok(StartMode::ResumeProcessing),
            "reload-target" => Ok(StartMode::ReloadTarget),
            other => Err(UnknownStartMode(other.to_string())),
        }
    }
}

/// Table counters the service reports while a task runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplicationTaskStats {
    #[serde(default)]
    pub full_load_progress_percent: Option<u8>,
    #[serde(default)]
    pub tables_loaded: u32,
    #[serde(default)]
    pub tables_errored: u32,
    #[serde(default)]
    pub tables_queued: u32,
}

/// One task description from the migration service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplicationTaskDescription {
    pub replication_task_identifier: String,
    pub replication_task_arn: String,
    /// Free-form status string; the service grows this vocabulary over time
    pub status: String,
    #[serde(default)]
    pub last_failure_message: Option<String>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub replication_task_creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub replication_task_start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub replication_task_stats: Option<ReplicationTaskStats>,
}

impl ReplicationTaskDescription {
    /// Maps the service status string onto the core vocabulary
    ///
    /// Anything that is not a known terminal state counts as still
    /// running, so new intermediate states keep the poller waiting
    /// instead of failing the session.
    pub fn kind(&self) -> StatusKind {
        match self.status.as_str() {
            "stopped" => StatusKind::Stopped,
            "failed" | "failed-move" => StatusKind::Failed,
            _ => StatusKind::Running,
        }
    }

    /// Full-load progress, with missing stats pinned to zero
    ///
    /// A stopped task without stats never ran its full load; treating
    /// missing stats as complete would pass an empty migration.
    pub fn progress_percent(&self) -> u8 {
        self.replication_task_stats
            .as_ref()
            .and_then(|stats| stats.full_load_progress_percent)
            .unwrap_or(0)
    }

    /// Converts the description into a status snapshot
    ///
    /// The service reports an empty string where it means "no failure";
    /// that is normalized away so an empty message cannot fail the
    /// completion check.
    pub fn to_status(&self, operation_id: &OperationId) -> OperationStatus {
        OperationStatus {
            operation_id: operation_id.clone(),
            kind: self.kind(),
            progress_percent: Some(self.progress_percent()),
            failure_message: self
                .last_failure_message
                .clone()
                .filter(|message| !message.is_empty()),
        }
    }
}

/// Capability over the migration service's task endpoints
///
/// Stand-in for the service client; the wire protocol belongs to the
/// implementation.
#[async_trait]
pub trait ReplicationTaskApi: Send + Sync {
    /// Returns the task descriptions matching the identifier filter
    async fn describe_task(
        &self,
        task_arn: &str,
    ) -> Result<Vec<ReplicationTaskDescription>, SourceUnavailable>;

    /// Starts the task with the given start type
    async fn start_task(&self, task_arn: &str, mode: StartMode) -> Result<(), StartRejected>;
}

/// Status source for replication tasks, keyed by task identifier
pub struct ReplicationStatusSource {
    api: Arc<dyn ReplicationTaskApi>,
}

impl ReplicationStatusSource {
    /// Creates a source over the given task capability
    pub fn new(api: Arc<dyn ReplicationTaskApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl StatusSource for ReplicationStatusSource {
    async fn fetch(
        &self,
        operation_id: &OperationId,
    ) -> Result<OperationStatus, SourceUnavailable> {
        let descriptions = self.api.describe_task(operation_id.as_str()).await?;

        let task = descriptions.into_iter().next().ok_or_else(|| {
            SourceUnavailable::new(
                operation_id.clone(),
                "replication task not found; check the task identifier and filters",
            )
        })?;

        Ok(task.to_status(operation_id))
    }
}

/// Operation control that starts a replication task with a fixed start type
pub struct ReplicationTaskControl {
    api: Arc<dyn ReplicationTaskApi>,
    mode: StartMode,
}

impl ReplicationTaskControl {
    /// Creates a control that starts tasks with the given mode
    pub fn new(api: Arc<dyn ReplicationTaskApi>, mode: StartMode) -> Self {
        Self { api, mode }
    }
}

#[async_trait]
impl OperationControl for ReplicationTaskControl {
    async fn start(&self, operation_id: &OperationId) -> Result<(), StartRejected> {
        debug!(task = %operation_id, mode = %self.mode, "starting replication task");
        self.api.start_task(operation_id.as_str(), self.mode).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoy_poller::{CompletionDecision, CompletionPolicy, StrictCompletion};

    fn description(status: &str) -> ReplicationTaskDescription {
        ReplicationTaskDescription {
            replication_task_identifier: "conversation-log-full-load".to_string(),
            replication_task_arn: "arn:task/conversation-log".to_string(),
            status: status.to_string(),
            last_failure_message: None,
            stop_reason: None,
            replication_task_creation_date: None,
            replication_task_start_date: None,
            replication_task_stats: None,
        }
    }

    fn with_progress(mut desc: ReplicationTaskDescription, percent: u8) -> ReplicationTaskDescription {
        desc.replication_task_stats = Some(ReplicationTaskStats {
            full_load_progress_percent: Some(percent),
            tables_loaded: 1,
            tables_errored: 0,
            tables_queued: 0,
        });
        desc
    }

    #[test]
    fn test_status_string_mapping() {
        assert_eq!(description("creating").kind(), StatusKind::Running);
        assert_eq!(description("ready").kind(), StatusKind::Running);
        assert_eq!(description("starting").kind(), StatusKind::Running);
        assert_eq!(description("running").kind(), StatusKind::Running);
        assert_eq!(description("stopping").kind(), StatusKind::Running);
        assert_eq!(description("stopped").kind(), StatusKind::Stopped);
        assert_eq!(description("failed").kind(), StatusKind::Failed);
        assert_eq!(description("failed-move").kind(), StatusKind::Failed);
    }

    #[test]
    fn test_missing_stats_pin_progress_to_zero() {
        let stopped = description("stopped");
        assert_eq!(stopped.progress_percent(), 0);

        let status = stopped.to_status(&OperationId::new("arn:task/conversation-log"));
        // a stop without a full load must not pass the strict check
        assert!(matches!(
            StrictCompletion.classify(&status),
            CompletionDecision::Failed { .. }
        ));
    }

    #[test]
    fn test_empty_failure_message_is_normalized() {
        let mut drained = with_progress(description("stopped"), 100);
        drained.last_failure_message = Some(String::new());

        let status = drained.to_status(&OperationId::new("arn:task/conversation-log"));
        assert_eq!(status.failure_message, None);
        assert_eq!(
            StrictCompletion.classify(&status),
            CompletionDecision::Complete
        );
    }

    #[test]
    fn test_drained_full_load_completes() {
        let drained = with_progress(description("stopped"), 100);
        let status = drained.to_status(&OperationId::new("arn:task/conversation-log"));

        assert_eq!(status.kind, StatusKind::Stopped);
        assert_eq!(status.progress_percent, Some(100));
        assert_eq!(
            StrictCompletion.classify(&status),
            CompletionDecision::Complete
        );
    }

    #[test]
    fn test_start_mode_round_trips_the_service_spelling() {
        assert_eq!(StartMode::ReloadTarget.to_string(), "reload-target");
        assert_eq!(
            "resume-processing".parse::<StartMode>().unwrap(),
            StartMode::ResumeProcessing
        );
        assert!("restart".parse::<StartMode>().is_err());
    }

    #[test]
    fn test_deserializes_a_service_payload() {
        let payload = r#"{
            "ReplicationTaskIdentifier": "conversation-log-full-load",
            "ReplicationTaskArn": "arn:task/conversation-log",
            "Status": "stopped",
            "StopReason": "Stop Reason FULL_LOAD_ONLY_FINISHED",
            "LastFailureMessage": "",
            "ReplicationTaskCreationDate": "2024-03-11T09:30:00Z",
            "ReplicationTaskStartDate": "2024-03-11T09:31:12Z",
            "ReplicationTaskStats": {
                "FullLoadProgressPercent": 100,
                "TablesLoaded": 7,
                "TablesErrored": 0,
                "TablesQueued": 0
            }
        }"#;

        let task: ReplicationTaskDescription = serde_json::from_str(payload).unwrap();
        assert_eq!(task.kind(), StatusKind::Stopped);
        assert_eq!(task.progress_percent(), 100);
        assert_eq!(
            task.stop_reason.as_deref(),
            Some("Stop Reason FULL_LOAD_ONLY_FINISHED")
        );

        let status = task.to_status(&OperationId::new("arn:task/conversation-log"));
        assert_eq!(status.failure_message, None);
        assert_eq!(
            StrictCompletion.classify(&status),
            CompletionDecision::Complete
        );
    }
}
