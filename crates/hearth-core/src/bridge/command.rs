//! UI → native commands: named methods with positional JSON arguments.

use crate::{CoreError, CoreResult};

use std::panic::Location;

use error_location::ErrorLocation;
use serde_json::{Value, json};

/// A typed bridge command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCommand {
    /// `listWindows()`
    ListWindows,
    /// `listWorkspaces()`
    ListWorkspaces,
    /// `getTrayIcons()`
    GetTrayIcons,
    /// `getLauncherApps()`
    GetLauncherApps,
    /// `getShellState()`
    GetShellState,
    /// `getSystemStatus()`
    GetSystemStatus,
    /// `focusWindow(handle)`
    FocusWindow {
        /// Target window.
        handle: String,
    },
    /// `minimizeWindow(handle)`
    MinimizeWindow {
        /// Target window.
        handle: String,
    },
    /// `restoreWindow(handle)`
    RestoreWindow {
        /// Target window.
        handle: String,
    },
    /// `closeWindow(handle)`
    CloseWindow {
        /// Target window.
        handle: String,
    },
    /// `switchWorkspace(id)`
    SwitchWorkspace {
        /// Workspace to activate.
        id: String,
    },
    /// `createWorkspace(id, name)`
    CreateWorkspace {
        /// New workspace id.
        id: String,
        /// Display name.
        name: String,
    },
    /// `moveWindowToWorkspace(handle, id)`
    MoveWindowToWorkspace {
        /// Window to move.
        handle: String,
        /// Destination workspace.
        workspace_id: String,
    },
    /// `trayIconClick(id, kind)`
    TrayIconClick {
        /// Tray icon id.
        id: String,
        /// Click kind (`left`, `right`, `double`).
        kind: String,
    },
    /// `launchApp(idOrPath)`
    LaunchApp {
        /// Launcher id or path.
        id_or_path: String,
    },
    /// `setSystemVolume(percent)`
    SetSystemVolume {
        /// Volume, clamped to 0..=100.
        percent: u8,
    },
    /// `toggleSystemMute()`
    ToggleSystemMute,
    /// `preferNetwork(kind)`
    PreferNetwork {
        /// Network kind.
        kind: String,
    },
    /// `restoreExplorerShell()`
    RestoreExplorerShell,
    /// `registerHotkey(id, shortcut)`
    RegisterHotkey {
        /// Logical hotkey id.
        id: String,
        /// Shortcut text.
        shortcut: String,
    },
    /// `unregisterHotkey(id)`
    UnregisterHotkey {
        /// Logical hotkey id.
        id: String,
    },
    /// `listHotkeys()`
    ListHotkeys,
}

impl BridgeCommand {
    /// Wire method name.
    pub fn method(&self) -> &'static str {
        match self {
            BridgeCommand::ListWindows => "listWindows",
            BridgeCommand::ListWorkspaces => "listWorkspaces",
            BridgeCommand::GetTrayIcons => "getTrayIcons",
            BridgeCommand::GetLauncherApps => "getLauncherApps",
            BridgeCommand::GetShellState => "getShellState",
            BridgeCommand::GetSystemStatus => "getSystemStatus",
            BridgeCommand::FocusWindow { .. } => "focusWindow",
            BridgeCommand::MinimizeWindow { .. } => "minimizeWindow",
            BridgeCommand::RestoreWindow { .. } => "restoreWindow",
            BridgeCommand::CloseWindow { .. } => "closeWindow",
            BridgeCommand::SwitchWorkspace { .. } => "switchWorkspace",
            BridgeCommand::CreateWorkspace { .. } => "createWorkspace",
            BridgeCommand::MoveWindowToWorkspace { .. } => "moveWindowToWorkspace",
            BridgeCommand::TrayIconClick { .. } => "trayIconClick",
            BridgeCommand::LaunchApp { .. } => "launchApp",
            BridgeCommand::SetSystemVolume { .. } => "setSystemVolume",
            BridgeCommand::ToggleSystemMute => "toggleSystemMute",
            BridgeCommand::PreferNetwork { .. } => "preferNetwork",
            BridgeCommand::RestoreExplorerShell => "restoreExplorerShell",
            BridgeCommand::RegisterHotkey { .. } => "registerHotkey",
            BridgeCommand::UnregisterHotkey { .. } => "unregisterHotkey",
            BridgeCommand::ListHotkeys => "listHotkeys",
        }
    }

    /// Positional arguments, in wire order.
    pub fn args(&self) -> Vec<Value> {
        match self {
            BridgeCommand::ListWindows
            | BridgeCommand::ListWorkspaces
            | BridgeCommand::GetTrayIcons
            | BridgeCommand::GetLauncherApps
            | BridgeCommand::GetShellState
            | BridgeCommand::GetSystemStatus
            | BridgeCommand::ToggleSystemMute
            | BridgeCommand::RestoreExplorerShell
            | BridgeCommand::ListHotkeys => Vec::new(),
            BridgeCommand::FocusWindow { handle }
            | BridgeCommand::MinimizeWindow { handle }
            | BridgeCommand::RestoreWindow { handle }
            | BridgeCommand::CloseWindow { handle } => vec![json!(handle)],
            BridgeCommand::SwitchWorkspace { id } | BridgeCommand::UnregisterHotkey { id } => {
                vec![json!(id)]
            }
            BridgeCommand::CreateWorkspace { id, name } => vec![json!(id), json!(name)],
            BridgeCommand::MoveWindowToWorkspace {
                handle,
                workspace_id,
            } => vec![json!(handle), json!(workspace_id)],
            BridgeCommand::TrayIconClick { id, kind } => vec![json!(id), json!(kind)],
            BridgeCommand::LaunchApp { id_or_path } => vec![json!(id_or_path)],
            BridgeCommand::SetSystemVolume { percent } => vec![json!(percent)],
            BridgeCommand::PreferNetwork { kind } => vec![json!(kind)],
            BridgeCommand::RegisterHotkey { id, shortcut } => vec![json!(id), json!(shortcut)],
        }
    }

    /// Parse a method name and positional arguments.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownMethod`] for unrecognized names and
    /// [`CoreError::InvalidArguments`] when arguments are missing or mistyped.
    #[track_caller]
    pub fn parse(method: &str, args: &[Value]) -> CoreResult<Self> {
        let args = Args { method, args };

        let command = match method {
            "listWindows" => BridgeCommand::ListWindows,
            "listWorkspaces" => BridgeCommand::ListWorkspaces,
            "getTrayIcons" => BridgeCommand::GetTrayIcons,
            "getLauncherApps" => BridgeCommand::GetLauncherApps,
            "getShellState" => BridgeCommand::GetShellState,
            "getSystemStatus" => BridgeCommand::GetSystemStatus,
            "focusWindow" => BridgeCommand::FocusWindow {
                handle: args.string(0, "handle")?,
            },
            "minimizeWindow" => BridgeCommand::MinimizeWindow {
                handle: args.string(0, "handle")?,
            },
            "restoreWindow" => BridgeCommand::RestoreWindow {
                handle: args.string(0, "handle")?,
            },
            "closeWindow" => BridgeCommand::CloseWindow {
                handle: args.string(0, "handle")?,
            },
            "switchWorkspace" => BridgeCommand::SwitchWorkspace {
                id: args.string(0, "id")?,
            },
            "createWorkspace" => {
                let id = args.string(0, "id")?;
                let name = args.optional_string(1).unwrap_or_else(|| id.clone());
                BridgeCommand::CreateWorkspace { id, name }
            }
            "moveWindowToWorkspace" => BridgeCommand::MoveWindowToWorkspace {
                handle: args.string(0, "handle")?,
                workspace_id: args.string(1, "workspaceId")?,
            },
            "trayIconClick" => BridgeCommand::TrayIconClick {
                id: args.string(0, "id")?,
                kind: args.optional_string(1).unwrap_or_else(|| "left".to_string()),
            },
            "launchApp" => BridgeCommand::LaunchApp {
                id_or_path: args.string(0, "idOrPath")?,
            },
            "setSystemVolume" => BridgeCommand::SetSystemVolume {
                percent: args.percent(0)?,
            },
            "toggleSystemMute" => BridgeCommand::ToggleSystemMute,
            "preferNetwork" => BridgeCommand::PreferNetwork {
                kind: args.string(0, "kind")?,
            },
            "restoreExplorerShell" => BridgeCommand::RestoreExplorerShell,
            "registerHotkey" => BridgeCommand::RegisterHotkey {
                id: args.string(0, "id")?,
                shortcut: args.string(1, "shortcut")?,
            },
            "unregisterHotkey" => BridgeCommand::UnregisterHotkey {
                id: args.string(0, "id")?,
            },
            "listHotkeys" => BridgeCommand::ListHotkeys,
            _ => {
                return Err(CoreError::UnknownMethod {
                    method: method.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        Ok(command)
    }
}

struct Args<'a> {
    method: &'a str,
    args: &'a [Value],
}

impl Args<'_> {
    #[track_caller]
    fn string(&self, index: usize, name: &str) -> CoreResult<String> {
        match self.args.get(index) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            other => Err(self.invalid(format!(
                "argument {index} ({name}) must be a string, got {}",
                describe(other)
            ))),
        }
    }

    fn optional_string(&self, index: usize) -> Option<String> {
        self.args.get(index).and_then(Value::as_str).map(String::from)
    }

    #[track_caller]
    fn percent(&self, index: usize) -> CoreResult<u8> {
        let value = self.args.get(index);
        let number = value
            .and_then(Value::as_f64)
            .or_else(|| value.and_then(Value::as_str).and_then(|s| s.parse().ok()))
            .ok_or_else(|| {
                self.invalid(format!(
                    "argument {index} (percent) must be a number, got {}",
                    describe(value)
                ))
            })?;
        Ok(number.round().clamp(0.0, 100.0) as u8)
    }

    #[track_caller]
    fn invalid(&self, reason: String) -> CoreError {
        CoreError::InvalidArguments {
            method: self.method.to_string(),
            reason,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

fn describe(value: Option<&Value>) -> &'static str {
    match value {
        None => "nothing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "a boolean",
        Some(Value::Number(_)) => "a number",
        Some(Value::String(_)) => "a string",
        Some(Value::Array(_)) => "an array",
        Some(Value::Object(_)) => "an object",
    }
}
