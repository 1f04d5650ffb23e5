use crate::config::LAUNCHER_HOTKEY_ID;

use serde::{Deserialize, Serialize};

/// A global shortcut registered once the shell core is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyBinding {
    /// Logical id delivered in `hotkeyPressed`.
    pub id: String,
    /// Shortcut text, e.g. `"super+Space"`.
    pub shortcut: String,
}

impl HotkeyBinding {
    /// Bindings written into a fresh config.
    pub fn defaults() -> Vec<Self> {
        vec![Self {
            id: LAUNCHER_HOTKEY_ID.to_string(),
            shortcut: "super+Space".to_string(),
        }]
    }
}
