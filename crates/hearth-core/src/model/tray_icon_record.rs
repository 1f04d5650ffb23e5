use serde::{Deserialize, Serialize};

/// A status indicator contributed by a background application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrayIconRecord {
    /// Stable tray icon id.
    pub id: String,
    /// Hover text.
    #[serde(default)]
    pub tooltip: String,
    /// Owning process id.
    #[serde(default)]
    pub process_id: u32,
    /// Whether the icon is shown (vs. collapsed into overflow).
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    /// Encoded icon image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Vec<u8>>,
}

fn default_visible() -> bool {
    true
}

impl TrayIconRecord {
    /// Create a visible tray icon record without image data.
    pub fn new(id: impl Into<String>, tooltip: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tooltip: tooltip.into(),
            process_id: 0,
            is_visible: true,
            icon: None,
        }
    }
}
