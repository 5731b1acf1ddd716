//! Managed-database restore task status
//!
//! The database vendor exposes backup restores through a stored procedure
//! that returns one record per restore task ever run for a database. The
//! harness waits on the newest record; older records are history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use convoy_core::domain::operation::{OperationId, OperationStatus, StatusKind};
use convoy_core::error::SourceUnavailable;
use convoy_poller::StatusSource;

/// Lifecycle vocabulary reported by the restore procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestoreLifecycle {
    Created,
    InProgress,
    Success,
    Error,
    CancelRequested,
    Cancelled,
}

impl RestoreLifecycle {
    /// Maps the vendor lifecycle onto the core status vocabulary
    pub fn to_kind(self) -> StatusKind {
        match self {
            RestoreLifecycle::Success => StatusKind::Succeeded,
            RestoreLifecycle::Error => StatusKind::Failed,
            RestoreLifecycle::CancelRequested | RestoreLifecycle::Cancelled => StatusKind::Stopped,
            RestoreLifecycle::Created | RestoreLifecycle::InProgress => StatusKind::Running,
        }
    }
}

/// One restore-task record as the stored procedure returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreTaskRecord {
    /// Monotonically increasing task id; the largest is the newest task
    pub task_id: i64,
    pub task_type: String,
    pub database_name: String,
    pub lifecycle: RestoreLifecycle,
    pub percent_complete: Option<u8>,
    /// Free-text field the procedure fills with progress prose on healthy
    /// tasks and with the error description on failed ones
    pub task_info: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl RestoreTaskRecord {
    /// Converts the record into a status snapshot
    ///
    /// `task_info` becomes the failure message only on error and
    /// cancellation lifecycles; on a healthy task the field carries
    /// routine progress prose that must not defeat the success check.
    pub fn to_status(&self, operation_id: &OperationId) -> OperationStatus {
        let failure_message = match self.lifecycle {
            RestoreLifecycle::Error
            | RestoreLifecycle::CancelRequested
            | RestoreLifecycle::Cancelled => {
                self.task_info.clone().filter(|info| !info.is_empty())
            }
            _ => None,
        };

        OperationStatus {
            operation_id: operation_id.clone(),
            kind: self.lifecycle.to_kind(),
            progress_percent: self.percent_complete,
            failure_message,
        }
    }
}

/// Capability that reports restore-task records for a database
///
/// Stand-in for the stored-procedure call; the wire protocol belongs to
/// the implementation.
#[async_trait]
pub trait RestoreTaskApi: Send + Sync {
    /// Returns every restore-task record for the database
    async fn task_status(
        &self,
        database_name: &str,
    ) -> Result<Vec<RestoreTaskRecord>, SourceUnavailable>;
}

/// Status source for restore tasks, keyed by database name
pub struct RestoreStatusSource {
    api: Arc<dyn RestoreTaskApi>,
}

impl RestoreStatusSource {
    /// Creates a source over the given restore-task capability
    pub fn new(api: Arc<dyn RestoreTaskApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl StatusSource for RestoreStatusSource {
    async fn fetch(
        &self,
        operation_id: &OperationId,
    ) -> Result<OperationStatus, SourceUnavailable> {
        let records = self.api.task_status(operation_id.as_str()).await?;

        let newest = records
            .into_iter()
            .max_by_key(|record| record.task_id)
            .ok_or_else(|| {
                SourceUnavailable::new(
                    operation_id.clone(),
                    "no restore task found for database; check the database name",
                )
            })?;

        Ok(newest.to_status(operation_id))
    }
}
