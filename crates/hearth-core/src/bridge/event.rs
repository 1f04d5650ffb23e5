use crate::{CoreResult, TrayIconRecord, WindowRecord, WorkspaceRecord};

use std::{fmt, str::FromStr};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Bridge protocol version announced in the `connected` handshake.
pub const PROTOCOL_VERSION: u32 = 1;

/// Native → UI event with a typed payload.
///
/// Serializes adjacently tagged as `{"type": ..., "data": ...}`, which is the
/// envelope layout minus the timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ShellEvent {
    /// A window was observed for the first time.
    WindowCreated(WindowRecord),
    /// A window was destroyed.
    WindowDestroyed {
        /// Handle of the destroyed window.
        handle: String,
    },
    /// A known window changed.
    WindowUpdated(WindowRecord),
    /// Foreground window changed. Carries the "no window" sentinel when
    /// focus left all tracked windows.
    WindowFocusChanged {
        /// Handle of the focused window.
        handle: String,
    },
    /// The active workspace changed.
    #[serde(rename_all = "camelCase")]
    WorkspaceSwitched {
        /// Newly active workspace.
        new_workspace_id: String,
        /// Previously active workspace.
        #[serde(default)]
        old_workspace_id: Option<String>,
    },
    /// A workspace was created.
    WorkspaceCreated(WorkspaceRecord),
    /// A window changed workspace.
    #[serde(rename_all = "camelCase")]
    WindowMovedToWorkspace {
        /// Handle of the moved window.
        handle: String,
        /// Destination workspace.
        workspace_id: String,
    },
    /// A tray icon appeared.
    TrayIconAdded(TrayIconRecord),
    /// A tray icon changed.
    TrayIconUpdated(TrayIconRecord),
    /// A tray icon went away.
    TrayIconRemoved {
        /// Id of the removed icon.
        id: String,
    },
    /// A registered global hotkey was pressed.
    HotkeyPressed {
        /// Logical hotkey id.
        id: String,
    },
    /// Handshake: the native endpoint is attached.
    #[serde(rename_all = "camelCase")]
    Connected {
        /// Protocol version spoken by the native side.
        protocol_version: u32,
    },
}

impl ShellEvent {
    /// Dispatch key for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            ShellEvent::WindowCreated(_) => EventKind::WindowCreated,
            ShellEvent::WindowDestroyed { .. } => EventKind::WindowDestroyed,
            ShellEvent::WindowUpdated(_) => EventKind::WindowUpdated,
            ShellEvent::WindowFocusChanged { .. } => EventKind::WindowFocusChanged,
            ShellEvent::WorkspaceSwitched { .. } => EventKind::WorkspaceSwitched,
            ShellEvent::WorkspaceCreated(_) => EventKind::WorkspaceCreated,
            ShellEvent::WindowMovedToWorkspace { .. } => EventKind::WindowMovedToWorkspace,
            ShellEvent::TrayIconAdded(_) => EventKind::TrayIconAdded,
            ShellEvent::TrayIconUpdated(_) => EventKind::TrayIconUpdated,
            ShellEvent::TrayIconRemoved { .. } => EventKind::TrayIconRemoved,
            ShellEvent::HotkeyPressed { .. } => EventKind::HotkeyPressed,
            ShellEvent::Connected { .. } => EventKind::Connected,
        }
    }

    /// The handshake event for this protocol version.
    pub fn connected() -> Self {
        ShellEvent::Connected {
            protocol_version: PROTOCOL_VERSION,
        }
    }
}

/// Enumerated event types, used as the static dispatch key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// `windowCreated`
    WindowCreated,
    /// `windowDestroyed`
    WindowDestroyed,
    /// `windowUpdated`
    WindowUpdated,
    /// `windowFocusChanged`
    WindowFocusChanged,
    /// `workspaceSwitched`
    WorkspaceSwitched,
    /// `workspaceCreated`
    WorkspaceCreated,
    /// `windowMovedToWorkspace`
    WindowMovedToWorkspace,
    /// `trayIconAdded`
    TrayIconAdded,
    /// `trayIconUpdated`
    TrayIconUpdated,
    /// `trayIconRemoved`
    TrayIconRemoved,
    /// `hotkeyPressed`
    HotkeyPressed,
    /// `connected`
    Connected,
}

impl EventKind {
    /// Every event kind, in protocol order.
    pub const ALL: [EventKind; 12] = [
        EventKind::WindowCreated,
        EventKind::WindowDestroyed,
        EventKind::WindowUpdated,
        EventKind::WindowFocusChanged,
        EventKind::WorkspaceSwitched,
        EventKind::WorkspaceCreated,
        EventKind::WindowMovedToWorkspace,
        EventKind::TrayIconAdded,
        EventKind::TrayIconUpdated,
        EventKind::TrayIconRemoved,
        EventKind::HotkeyPressed,
        EventKind::Connected,
    ];

    /// Wire name of the event type.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::WindowCreated => "windowCreated",
            EventKind::WindowDestroyed => "windowDestroyed",
            EventKind::WindowUpdated => "windowUpdated",
            EventKind::WindowFocusChanged => "windowFocusChanged",
            EventKind::WorkspaceSwitched => "workspaceSwitched",
            EventKind::WorkspaceCreated => "workspaceCreated",
            EventKind::WindowMovedToWorkspace => "windowMovedToWorkspace",
            EventKind::TrayIconAdded => "trayIconAdded",
            EventKind::TrayIconUpdated => "trayIconUpdated",
            EventKind::TrayIconRemoved => "trayIconRemoved",
            EventKind::HotkeyPressed => "hotkeyPressed",
            EventKind::Connected => "connected",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// One event on the wire: `{type, data, timestamp}`.
///
/// `kind` stays a string so envelopes with types this build does not know
/// can still be routed to string-keyed handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event type name.
    #[serde(rename = "type")]
    pub kind: String,
    /// Event payload.
    #[serde(default)]
    pub data: Value,
    /// Unix milliseconds at emission.
    pub timestamp: i64,
}

impl Envelope {
    /// Wrap an event, stamping the current time.
    pub fn from_event(event: &ShellEvent) -> CoreResult<Self> {
        let mut value = serde_json::to_value(event)?;
        let data = value.get_mut("data").map(Value::take).unwrap_or(Value::Null);

        Ok(Self {
            kind: event.kind().as_str().to_string(),
            data,
            timestamp: Utc::now().timestamp_millis(),
        })
    }

    /// Known event kind, if this build recognizes the type name.
    pub fn event_kind(&self) -> Option<EventKind> {
        self.kind.parse().ok()
    }

    /// Decode the typed event.
    pub fn decode(&self) -> CoreResult<ShellEvent> {
        let tagged = json!({ "type": self.kind, "data": self.data });
        Ok(serde_json::from_value(tagged)?)
    }
}
