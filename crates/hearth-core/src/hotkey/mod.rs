mod backend;
mod registered_hotkey;
mod registry;
mod shortcut;

pub use {
    backend::{AtomSink, HotkeyBackend},
    registered_hotkey::{HotkeyInfo, RegisteredHotkey},
    registry::{HotkeyRegistry, RegisterOutcome, UnregisterOutcome},
    shortcut::{format_shortcut, parse_shortcut},
};
