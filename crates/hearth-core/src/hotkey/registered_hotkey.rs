use crate::hotkey::format_shortcut;

use std::time::SystemTime;

use global_hotkey::hotkey::{Code, Modifiers};
use serde::Serialize;

/// One active hotkey registration, owned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredHotkey {
    /// Logical id chosen by the caller (e.g. `"toggle-launcher"`).
    pub id: String,
    /// Registry-assigned atom id. Monotonic and never reused while active.
    pub atom: u32,
    /// Modifier mask.
    pub modifiers: Modifiers,
    /// Key code.
    pub key: Code,
    /// When the OS accepted the registration.
    pub registered_at: SystemTime,
}

/// Serializable view of a registration, returned by `listHotkeys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotkeyInfo {
    /// Logical id.
    pub id: String,
    /// Atom id.
    pub atom: u32,
    /// Canonical shortcut text, e.g. `"ctrl+shift+Space"`.
    pub shortcut: String,
}

impl From<&RegisteredHotkey> for HotkeyInfo {
    fn from(hotkey: &RegisteredHotkey) -> Self {
        Self {
            id: hotkey.id.clone(),
            atom: hotkey.atom,
            shortcut: format_shortcut(hotkey.modifiers, hotkey.key),
        }
    }
}
