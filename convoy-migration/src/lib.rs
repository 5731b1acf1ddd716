//! Convoy Migration
//!
//! Use-site layer of the migration-verification harness: typed status
//! documents for the two remote operations the harness waits on, their
//! classification into the core status vocabulary, default poll budgets,
//! and start-then-await check flows.
//!
//! The two operations are a managed-database backup restore (reported by
//! a vendor stored procedure) and a managed replication task (reported by
//! the migration service). Both waits run on the same
//! [`convoy_poller::OperationPoller`]; only the status source and the
//! retry budget differ.
//!
//! Transport is injected: [`RestoreTaskApi`] and [`ReplicationTaskApi`]
//! stand in for the vendor clients, which live outside this workspace.

mod checks;
mod config;
mod replication;
mod restore;

pub use checks::{CheckError, run_replication_check, run_restore_check};
pub use config::Config;
pub use replication::{
    ReplicationStatusSource, ReplicationTaskApi, ReplicationTaskControl,
    ReplicationTaskDescription, ReplicationTaskStats, StartMode, UnknownStartMode,
};
pub use restore::{RestoreLifecycle, RestoreStatusSource, RestoreTaskApi, RestoreTaskRecord};
