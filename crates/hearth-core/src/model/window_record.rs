use serde::{Deserialize, Serialize};

/// How a window is currently presented by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowState {
    /// Restored to its normal frame.
    #[default]
    Normal,
    /// Minimized to the taskbar.
    Minimized,
    /// Maximized on its monitor.
    Maximized,
    /// Hidden (e.g. parked on an inactive workspace).
    Hidden,
}

/// A top-level window observed by the trackers.
///
/// Identity is the `handle`. Records are created on first observation,
/// updated in place, and removed when the window is destroyed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRecord {
    /// Opaque OS window handle, rendered as text (e.g. `"0x1a2b"`).
    pub handle: String,
    /// Window caption.
    #[serde(default)]
    pub title: String,
    /// Owning process id.
    #[serde(default)]
    pub process_id: u32,
    /// Workspace the window belongs to. Empty means "not yet assigned".
    #[serde(default)]
    pub workspace_id: String,
    /// Presentation state.
    #[serde(default)]
    pub state: WindowState,
    /// Whether the window is currently visible.
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    /// Application identity (package family or executable name).
    #[serde(default)]
    pub app_id: Option<String>,
    /// Window class name.
    #[serde(default)]
    pub class_name: String,
    /// Encoded icon image, if one was captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Vec<u8>>,
}

fn default_visible() -> bool {
    true
}

impl WindowRecord {
    /// Create a visible, normal-state window record with only the identity
    /// and caption filled in.
    pub fn new(handle: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            title: title.into(),
            process_id: 0,
            workspace_id: String::new(),
            state: WindowState::Normal,
            is_visible: true,
            app_id: None,
            class_name: String::new(),
            icon: None,
        }
    }

    /// Builder-style workspace assignment.
    pub fn in_workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_id = workspace_id.into();
        self
    }
}
