use serde::{Deserialize, Serialize};

/// Host status shown in the shell's status area.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    /// Master volume, 0..=100, when known.
    #[serde(default)]
    pub volume_percent: Option<u8>,
    /// Whether audio output is muted.
    #[serde(default)]
    pub muted: bool,
    /// Preferred network kind (e.g. `"wifi"`, `"ethernet"`).
    #[serde(default)]
    pub network: Option<String>,
    /// Whether global hotkeys are backed by the OS (false in degraded mode).
    #[serde(default)]
    pub hotkeys_available: bool,
}
