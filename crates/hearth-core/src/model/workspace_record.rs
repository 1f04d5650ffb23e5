use serde::{Deserialize, Serialize};

/// A virtual desktop grouping windows. Exactly one workspace is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceRecord {
    /// Stable workspace id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Handles of member windows, in join order.
    #[serde(default)]
    pub windows: Vec<String>,
    /// Whether this is the active workspace.
    #[serde(default)]
    pub is_active: bool,
}

impl WorkspaceRecord {
    /// Create an inactive, empty workspace.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            windows: Vec::new(),
            is_active: false,
        }
    }
}
