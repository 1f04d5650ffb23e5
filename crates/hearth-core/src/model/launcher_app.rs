use serde::{Deserialize, Serialize};

/// An entry in the application launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LauncherApp {
    /// Launcher id, accepted by `launchApp`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Executable or document path.
    pub path: String,
    /// Encoded icon image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Vec<u8>>,
}
