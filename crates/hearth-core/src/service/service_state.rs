use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of the shell core service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceState {
    /// Not running; the only state `start` is accepted in.
    Stopped,
    /// Acquiring trackers and the hotkey registry.
    Starting,
    /// Fully wired; queries return live data.
    Running,
    /// Releasing resources.
    Stopping,
    /// Startup failed and prior acquisitions were unwound.
    Failed,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceState::Stopped => "stopped",
            ServiceState::Starting => "starting",
            ServiceState::Running => "running",
            ServiceState::Stopping => "stopping",
            ServiceState::Failed => "failed",
        };
        f.write_str(name)
    }
}
