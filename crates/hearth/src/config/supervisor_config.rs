use crate::config::{
    default_max_restarts, default_poll_interval_ms, default_restart_backoff_ms,
    default_shutdown_grace_ms,
};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// UI host supervision limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Consecutive restarts allowed before giving up.
    #[serde(default = "default_max_restarts")]
    pub max_restarts: u32,
    /// Liveness poll interval.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Fixed delay before each restart attempt.
    #[serde(default = "default_restart_backoff_ms")]
    pub restart_backoff_ms: u64,
    /// How long the UI host gets to exit before it is killed.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_restarts: default_max_restarts(),
            poll_interval_ms: default_poll_interval_ms(),
            restart_backoff_ms: default_restart_backoff_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

impl SupervisorConfig {
    /// Poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Restart backoff as a duration.
    pub fn restart_backoff(&self) -> Duration {
        Duration::from_millis(self.restart_backoff_ms)
    }

    /// Shutdown grace period as a duration.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}
