//! Authoritative aggregation of tracker observations and workspace commands.
//!
//! Every mutation returns the bridge events it implies, so the caller can emit
//! them after releasing whatever lock guards this state.

use crate::{
    CoreError, CoreResult, NO_WINDOW, ServiceState, ShellEvent, ShellSnapshot, TrackerEvent,
    TrayIconRecord, WindowRecord, WorkspaceRecord,
};

use std::panic::Location;

use error_location::ErrorLocation;

/// Id of the workspace every session starts with.
pub const DEFAULT_WORKSPACE_ID: &str = "ws-main";
/// Display name of the default workspace.
pub const DEFAULT_WORKSPACE_NAME: &str = "Main";

/// Windows, workspaces, tray icons and focus, in observation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopState {
    windows: Vec<WindowRecord>,
    workspaces: Vec<WorkspaceRecord>,
    tray_icons: Vec<TrayIconRecord>,
    focused: Option<String>,
}

impl Default for DesktopState {
    fn default() -> Self {
        let mut main = WorkspaceRecord::new(DEFAULT_WORKSPACE_ID, DEFAULT_WORKSPACE_NAME);
        main.is_active = true;

        Self {
            windows: Vec::new(),
            workspaces: vec![main],
            tray_icons: Vec::new(),
            focused: None,
        }
    }
}

impl DesktopState {
    /// Fold one tracker observation into the state.
    pub fn apply(&mut self, event: TrackerEvent) -> Vec<ShellEvent> {
        match event {
            TrackerEvent::WindowObserved(record) => self.observe_window(record),
            TrackerEvent::WindowDestroyed { handle } => self.destroy_window(&handle),
            TrackerEvent::FocusChanged { handle } => self.change_focus(handle),
            TrackerEvent::WorkspaceObserved(record) => self.observe_workspace(record),
            TrackerEvent::WorkspaceActivated { id } => self.activate_workspace(&id),
            TrackerEvent::WindowWorkspaceChanged {
                handle,
                workspace_id,
            } => self
                .move_window(&handle, &workspace_id)
                .ok()
                .flatten()
                .into_iter()
                .collect(),
            TrackerEvent::TrayIconObserved(record) => self.observe_tray_icon(record),
            TrackerEvent::TrayIconRemoved { id } => self.remove_tray_icon(&id),
        }
    }

    fn observe_window(&mut self, mut record: WindowRecord) -> Vec<ShellEvent> {
        if let Some(existing) = self.windows.iter_mut().find(|w| w.handle == record.handle) {
            // Workspace membership is owned by the shell, not the tracker.
            record.workspace_id = existing.workspace_id.clone();
            if *existing == record {
                return Vec::new();
            }
            *existing = record.clone();
            return vec![ShellEvent::WindowUpdated(record)];
        }

        if record.workspace_id.is_empty() || self.workspace(&record.workspace_id).is_none() {
            record.workspace_id = self.active_workspace_id().unwrap_or_default();
        }
        if let Some(ws) = self
            .workspaces
            .iter_mut()
            .find(|ws| ws.id == record.workspace_id)
        {
            ws.windows.push(record.handle.clone());
        }
        self.windows.push(record.clone());
        vec![ShellEvent::WindowCreated(record)]
    }

    fn destroy_window(&mut self, handle: &str) -> Vec<ShellEvent> {
        let Some(idx) = self.windows.iter().position(|w| w.handle == handle) else {
            return Vec::new();
        };
        self.windows.remove(idx);
        for ws in &mut self.workspaces {
            ws.windows.retain(|h| h != handle);
        }

        let mut events = vec![ShellEvent::WindowDestroyed {
            handle: handle.to_string(),
        }];
        if self.focused.as_deref() == Some(handle) {
            self.focused = None;
            events.push(ShellEvent::WindowFocusChanged {
                handle: NO_WINDOW.to_string(),
            });
        }
        events
    }

    fn change_focus(&mut self, handle: Option<String>) -> Vec<ShellEvent> {
        let handle = handle.filter(|h| self.windows.iter().any(|w| &w.handle == h));
        if handle == self.focused {
            return Vec::new();
        }
        self.focused = handle;
        vec![ShellEvent::WindowFocusChanged {
            handle: self.focused.clone().unwrap_or_else(|| NO_WINDOW.to_string()),
        }]
    }

    fn observe_workspace(&mut self, record: WorkspaceRecord) -> Vec<ShellEvent> {
        let mut events: Vec<ShellEvent> = self
            .create_workspace(&record.id, &record.name)
            .into_iter()
            .collect();
        if record.is_active {
            events.extend(self.activate_workspace(&record.id));
        }
        events
    }

    /// Observations naming an unknown workspace are dropped.
    fn activate_workspace(&mut self, id: &str) -> Vec<ShellEvent> {
        self.switch_workspace(id).ok().flatten().into_iter().collect()
    }

    fn observe_tray_icon(&mut self, record: TrayIconRecord) -> Vec<ShellEvent> {
        match self.tray_icons.iter_mut().find(|t| t.id == record.id) {
            Some(existing) if *existing == record => Vec::new(),
            Some(existing) => {
                *existing = record.clone();
                vec![ShellEvent::TrayIconUpdated(record)]
            }
            None => {
                self.tray_icons.push(record.clone());
                vec![ShellEvent::TrayIconAdded(record)]
            }
        }
    }

    fn remove_tray_icon(&mut self, id: &str) -> Vec<ShellEvent> {
        let before = self.tray_icons.len();
        self.tray_icons.retain(|t| t.id != id);
        if self.tray_icons.len() == before {
            return Vec::new();
        }
        vec![ShellEvent::TrayIconRemoved { id: id.to_string() }]
    }

    /// Make `id` the single active workspace.
    ///
    /// Returns `None` when it is already active.
    #[track_caller]
    pub fn switch_workspace(&mut self, id: &str) -> CoreResult<Option<ShellEvent>> {
        if self.workspace(id).is_none() {
            return Err(CoreError::WorkspaceNotFound {
                id: id.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let old = self.active_workspace_id();
        if old.as_deref() == Some(id) {
            return Ok(None);
        }

        for ws in &mut self.workspaces {
            ws.is_active = ws.id == id;
        }

        Ok(Some(ShellEvent::WorkspaceSwitched {
            new_workspace_id: id.to_string(),
            old_workspace_id: old,
        }))
    }

    /// Create an inactive workspace. Returns `None` when the id exists.
    pub fn create_workspace(&mut self, id: &str, name: &str) -> Option<ShellEvent> {
        if id.is_empty() || self.workspace(id).is_some() {
            return None;
        }
        let record = WorkspaceRecord::new(id, name);
        self.workspaces.push(record.clone());
        Some(ShellEvent::WorkspaceCreated(record))
    }

    /// Move a window into another workspace.
    ///
    /// Returns `None` when the window is already there.
    #[track_caller]
    pub fn move_window(&mut self, handle: &str, workspace_id: &str) -> CoreResult<Option<ShellEvent>> {
        let location = ErrorLocation::from(Location::caller());
        if self.workspace(workspace_id).is_none() {
            return Err(CoreError::WorkspaceNotFound {
                id: workspace_id.to_string(),
                location,
            });
        }
        let Some(window) = self.windows.iter_mut().find(|w| w.handle == handle) else {
            return Err(CoreError::WindowNotFound {
                handle: handle.to_string(),
                location,
            });
        };
        if window.workspace_id == workspace_id {
            return Ok(None);
        }
        window.workspace_id = workspace_id.to_string();

        for ws in &mut self.workspaces {
            ws.windows.retain(|h| h != handle);
            if ws.id == workspace_id {
                ws.windows.push(handle.to_string());
            }
        }

        Ok(Some(ShellEvent::WindowMovedToWorkspace {
            handle: handle.to_string(),
            workspace_id: workspace_id.to_string(),
        }))
    }

    /// Tracked windows.
    pub fn windows(&self) -> &[WindowRecord] {
        &self.windows
    }

    /// Workspaces.
    pub fn workspaces(&self) -> &[WorkspaceRecord] {
        &self.workspaces
    }

    /// Tray icons.
    pub fn tray_icons(&self) -> &[TrayIconRecord] {
        &self.tray_icons
    }

    /// Focused window handle.
    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Id of the active workspace.
    pub fn active_workspace_id(&self) -> Option<String> {
        self.workspaces
            .iter()
            .find(|ws| ws.is_active)
            .map(|ws| ws.id.clone())
    }

    fn workspace(&self, id: &str) -> Option<&WorkspaceRecord> {
        self.workspaces.iter().find(|ws| ws.id == id)
    }

    /// Summary for `getShellState`.
    pub fn snapshot(&self, service_state: ServiceState) -> ShellSnapshot {
        ShellSnapshot {
            service_state,
            active_workspace_id: self.active_workspace_id(),
            focused_window: self
                .focused
                .clone()
                .unwrap_or_else(|| NO_WINDOW.to_string()),
            window_count: self.windows.len(),
            workspace_count: self.workspaces.len(),
            tray_icon_count: self.tray_icons.len(),
        }
    }
}
