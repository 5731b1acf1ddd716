//! Harness configuration
//!
//! Poll budgets for both waits are configurable so the harness can be
//! tuned per environment (a production-sized backup restores far slower
//! than the CI fixture). Both use sites share cadence; they differ only
//! in how many checks they are allowed.

use std::time::Duration;

use convoy_poller::PollPolicy;

use crate::replication::StartMode;

/// Harness configuration
///
/// Values come from the environment where set and fall back to the
/// budgets the integration environment was sized for.
#[derive(Debug, Clone)]
pub struct Config {
    /// Delay between restore-task status checks
    pub restore_poll_interval: Duration,

    /// Maximum restore-task status checks before giving up
    pub restore_max_attempts: u32,

    /// Delay between replication-task status checks
    pub replication_poll_interval: Duration,

    /// Maximum replication-task status checks before giving up
    pub replication_max_attempts: u32,

    /// Start type used when kicking off the replication task
    pub start_mode: StartMode,
}

impl Config {
    /// Creates a configuration with defaults
    pub fn new() -> Self {
        Self {
            restore_poll_interval: Duration::from_secs(15),
            restore_max_attempts: 15,
            replication_poll_interval: Duration::from_secs(15),
            replication_max_attempts: 40,
            start_mode: StartMode::ReloadTarget,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - RESTORE_POLL_INTERVAL (seconds, default: 15)
    /// - RESTORE_MAX_ATTEMPTS (default: 15)
    /// - REPLICATION_POLL_INTERVAL (seconds, default: 15)
    /// - REPLICATION_MAX_ATTEMPTS (default: 40)
    /// - REPLICATION_START_MODE (default: reload-target)
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::new();

        let restore_poll_interval = std::env::var("RESTORE_POLL_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.restore_poll_interval);

        let restore_max_attempts = std::env::var("RESTORE_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.restore_max_attempts);

        let replication_poll_interval = std::env::var("REPLICATION_POLL_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.replication_poll_interval);

        let replication_max_attempts = std::env::var("REPLICATION_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.replication_max_attempts);

        let start_mode = match std::env::var("REPLICATION_START_MODE") {
            Ok(raw) => raw
                .parse::<StartMode>()
                .map_err(|e| anyhow::anyhow!("REPLICATION_START_MODE: {e}"))?,
            Err(_) => defaults.start_mode,
        };

        Ok(Self {
            restore_poll_interval,
            restore_max_attempts,
            replication_poll_interval,
            replication_max_attempts,
            start_mode,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.restore_policy().validate()?;
        self.replication_policy().validate()?;
        Ok(())
    }

    /// Poll policy for the restore wait
    pub fn restore_policy(&self) -> PollPolicy {
        PollPolicy::new(self.restore_poll_interval, self.restore_max_attempts)
    }

    /// Poll policy for the replication wait
    pub fn replication_policy(&self) -> PollPolicy {
        PollPolicy::new(
            self.replication_poll_interval,
            self.replication_max_attempts,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
