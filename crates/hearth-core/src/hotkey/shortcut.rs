use crate::{CoreError, CoreResult};

use std::{panic::Location, str::FromStr};

use error_location::ErrorLocation;
use global_hotkey::hotkey::{Code, HotKey, Modifiers};

/// Parse a shortcut such as `"ctrl+shift+space"` or `"super+KeyL"`.
#[track_caller]
pub fn parse_shortcut(shortcut: &str) -> CoreResult<(Modifiers, Code)> {
    let hotkey = HotKey::from_str(shortcut).map_err(|e| CoreError::InvalidShortcut {
        shortcut: shortcut.to_string(),
        reason: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok((hotkey.mods, hotkey.key))
}

/// Render a modifier mask and key back into shortcut text.
pub fn format_shortcut(modifiers: Modifiers, key: Code) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(5);
    for (flag, name) in [
        (Modifiers::CONTROL, "ctrl"),
        (Modifiers::ALT, "alt"),
        (Modifiers::SHIFT, "shift"),
        (Modifiers::SUPER, "super"),
    ] {
        if modifiers.contains(flag) {
            parts.push(name.to_string());
        }
    }
    parts.push(key.to_string());
    parts.join("+")
}
