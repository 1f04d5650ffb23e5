use crate::ServiceState;

use serde::{Deserialize, Serialize};

/// Sentinel handle meaning "no window has focus".
pub const NO_WINDOW: &str = "0x0";

/// Summary of authoritative shell state, returned by `getShellState`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellSnapshot {
    /// Current service lifecycle state.
    pub service_state: ServiceState,
    /// Id of the active workspace, if any.
    #[serde(default)]
    pub active_workspace_id: Option<String>,
    /// Handle of the focused window, or [`NO_WINDOW`].
    pub focused_window: String,
    /// Number of tracked windows.
    pub window_count: usize,
    /// Number of workspaces.
    pub workspace_count: usize,
    /// Number of tray icons.
    pub tray_icon_count: usize,
}

impl Default for ShellSnapshot {
    fn default() -> Self {
        Self {
            service_state: ServiceState::Stopped,
            active_workspace_id: None,
            focused_window: NO_WINDOW.to_string(),
            window_count: 0,
            workspace_count: 0,
            tray_icon_count: 0,
        }
    }
}

impl ShellSnapshot {
    /// Focused window handle with the sentinel mapped to `None`.
    pub fn focused(&self) -> Option<&str> {
        focused_handle(&self.focused_window)
    }
}

/// Map a raw focus handle to `None` when it is empty or the sentinel.
pub fn focused_handle(raw: &str) -> Option<&str> {
    if raw.is_empty() || raw == NO_WINDOW {
        None
    } else {
        Some(raw)
    }
}
