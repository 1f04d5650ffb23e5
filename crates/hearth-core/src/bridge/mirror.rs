//! UI-side projection of native shell state.
//!
//! The mirror rebuilds state from one bulk sync plus incremental events and
//! publishes a complete [`Projection`] after every mutation, so observers
//! never see a half-applied update.

use crate::{
    BridgeClient, BridgeCommand, CoreError, EventKind, LauncherApp, ShellEvent, ShellSnapshot,
    TrayIconRecord, WindowRecord, WindowState, WorkspaceRecord, focused_handle,
};

use std::{
    sync::{
        Arc, Weak,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Status text while the first sync is outstanding.
pub const STATUS_CONNECTING: &str = "Connecting";
/// Status text once synced.
pub const STATUS_CONNECTED: &str = "Connected";
/// Status text after a failed sync.
pub const STATUS_DISCONNECTED: &str = "Disconnected";

/// Outcome of a sync attempt, shared between concurrent callers.
pub type SyncResult = Result<(), Arc<CoreError>>;

type SharedSync = Shared<BoxFuture<'static, SyncResult>>;

/// Denormalized desktop state plus UI-only fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// Windows in native order.
    pub windows: Vec<WindowRecord>,
    /// Workspaces in native order.
    pub workspaces: Vec<WorkspaceRecord>,
    /// Tray icons in native order.
    pub tray_icons: Vec<TrayIconRecord>,
    /// Launcher catalogue.
    pub launcher_apps: Vec<LauncherApp>,
    /// Active workspace id.
    pub active_workspace_id: Option<String>,
    /// Focused window handle.
    pub focused_window: Option<String>,
    /// Connection status line.
    pub status_text: String,
    /// Whether the launcher panel is open.
    pub launcher_open: bool,
    /// True until the first successful sync.
    pub bootstrapping: bool,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            windows: Vec::new(),
            workspaces: Vec::new(),
            tray_icons: Vec::new(),
            launcher_apps: Vec::new(),
            active_workspace_id: None,
            focused_window: None,
            status_text: STATUS_CONNECTING.to_string(),
            launcher_open: false,
            bootstrapping: true,
        }
    }
}

impl Projection {
    /// Insert a window or replace it in place, keeping membership consistent.
    pub fn upsert_window(&mut self, record: WindowRecord) {
        self.place_in_workspace(&record.handle, &record.workspace_id);
        match self.windows.iter_mut().find(|w| w.handle == record.handle) {
            Some(existing) => *existing = record,
            None => self.windows.push(record),
        }
    }

    /// Remove a window and any reference to it.
    pub fn remove_window(&mut self, handle: &str) {
        self.windows.retain(|w| w.handle != handle);
        for ws in &mut self.workspaces {
            ws.windows.retain(|h| h != handle);
        }
        if self.focused_window.as_deref() == Some(handle) {
            self.focused_window = None;
        }
    }

    /// Set focus from a raw handle; the "no window" sentinel clears it.
    pub fn set_focused(&mut self, raw_handle: &str) {
        self.focused_window = focused_handle(raw_handle).map(String::from);
    }

    /// Make `id` the single active workspace.
    pub fn set_active_workspace(&mut self, id: &str) {
        for ws in &mut self.workspaces {
            ws.is_active = ws.id == id;
        }
        self.active_workspace_id = Some(id.to_string());
    }

    /// Move a window into a workspace.
    pub fn move_window(&mut self, handle: &str, workspace_id: &str) {
        if let Some(window) = self.windows.iter_mut().find(|w| w.handle == handle) {
            window.workspace_id = workspace_id.to_string();
        }
        self.place_in_workspace(handle, workspace_id);
    }

    /// Replace the workspace list, re-deriving the active id from it.
    pub fn replace_workspaces(&mut self, workspaces: Vec<WorkspaceRecord>) {
        if let Some(active) = workspaces.iter().find(|ws| ws.is_active) {
            self.active_workspace_id = Some(active.id.clone());
        }
        self.workspaces = workspaces;
    }

    /// Remove one tray icon, leaving the others in order.
    pub fn remove_tray_icon(&mut self, id: &str) {
        self.tray_icons.retain(|t| t.id != id);
    }

    fn set_window_state(&mut self, handle: &str, state: WindowState) {
        if let Some(window) = self.windows.iter_mut().find(|w| w.handle == handle) {
            window.state = state;
        }
    }

    fn place_in_workspace(&mut self, handle: &str, workspace_id: &str) {
        if workspace_id.is_empty() {
            return;
        }
        for ws in &mut self.workspaces {
            if ws.id == workspace_id {
                if !ws.windows.iter().any(|h| h == handle) {
                    ws.windows.push(handle.to_string());
                }
            } else {
                ws.windows.retain(|h| h != handle);
            }
        }
    }
}

/// Tunables for [`ShellMirror`].
#[derive(Debug, Clone)]
pub struct MirrorSettings {
    /// How long bulk sync waits for the handshake.
    pub connect_timeout: Duration,
    /// Hotkey id that toggles the launcher.
    pub launcher_hotkey_id: String,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            launcher_hotkey_id: "toggle-launcher".to_string(),
        }
    }
}

/// UI-side state mirror driven by a [`BridgeClient`].
pub struct ShellMirror {
    client: Arc<BridgeClient>,
    settings: MirrorSettings,
    state: watch::Sender<Projection>,
    sync: Mutex<Option<SharedSync>>,
    workspace_fetches: AtomicU64,
    tray_fetches: AtomicU64,
}

impl ShellMirror {
    /// Create a mirror and register its event handlers on `client`.
    pub fn new(client: Arc<BridgeClient>, settings: MirrorSettings) -> Arc<Self> {
        let (state, _) = watch::channel(Projection::default());
        let mirror = Arc::new(Self {
            client,
            settings,
            state,
            sync: Mutex::new(None),
            workspace_fetches: AtomicU64::new(0),
            tray_fetches: AtomicU64::new(0),
        });
        mirror.register_handlers();
        mirror
    }

    fn register_handlers(self: &Arc<Self>) {
        for kind in EventKind::ALL {
            let weak: Weak<Self> = Arc::downgrade(self);
            self.client.on(kind, move |event| {
                if let Some(mirror) = weak.upgrade() {
                    mirror.handle_event(event);
                }
                Ok(())
            });
        }
    }

    /// Current projection.
    pub fn snapshot(&self) -> Projection {
        self.state.borrow().clone()
    }

    /// Watch the projection; every change is a complete state.
    pub fn subscribe(&self) -> watch::Receiver<Projection> {
        self.state.subscribe()
    }

    fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut Projection),
    {
        self.state.send_modify(mutate);
    }

    // --- bulk sync ---------------------------------------------------------

    /// Run the bulk sync, sharing one in-flight attempt between callers.
    ///
    /// A successful result stays memoized until [`resync`](Self::resync);
    /// a failed one is forgotten so the next caller tries again.
    pub async fn initialize(self: &Arc<Self>) -> SyncResult {
        let attempt = {
            let mut slot = self.sync.lock();
            match slot.as_ref() {
                Some(existing) => existing.clone(),
                None => {
                    let this = Arc::clone(self);
                    let fresh = async move { this.initial_sync().await.map_err(Arc::new) }
                        .boxed()
                        .shared();
                    *slot = Some(fresh.clone());
                    fresh
                }
            }
        };

        let result = attempt.clone().await;
        if result.is_err() {
            let mut slot = self.sync.lock();
            if slot.as_ref().is_some_and(|current| current.ptr_eq(&attempt)) {
                *slot = None;
            }
        }
        result
    }

    /// Invalidate the memoized sync and run a fresh one.
    pub async fn resync(self: &Arc<Self>) -> SyncResult {
        self.sync.lock().take();
        self.initialize().await
    }

    #[instrument(skip(self))]
    async fn initial_sync(&self) -> Result<(), CoreError> {
        self.update(|p| p.status_text = STATUS_CONNECTING.to_string());

        if let Err(e) = self
            .client
            .wait_for_connection(self.settings.connect_timeout)
            .await
        {
            warn!(error = %e, "Bridge handshake did not arrive");
            self.update(|p| p.status_text = STATUS_DISCONNECTED.to_string());
            return Err(e);
        }

        let client = &self.client;
        let (windows, workspaces, tray_icons, launcher_apps, shell) = tokio::join!(
            client.send_or_default::<Vec<WindowRecord>>(BridgeCommand::ListWindows),
            client.send_or_default::<Vec<WorkspaceRecord>>(BridgeCommand::ListWorkspaces),
            client.send_or_default::<Vec<TrayIconRecord>>(BridgeCommand::GetTrayIcons),
            client.send_or_default::<Vec<LauncherApp>>(BridgeCommand::GetLauncherApps),
            client.send_or_default::<ShellSnapshot>(BridgeCommand::GetShellState),
        );

        let window_count = windows.len();
        self.update(move |p| {
            p.windows = windows;
            p.replace_workspaces(workspaces);
            p.tray_icons = tray_icons;
            p.launcher_apps = launcher_apps;
            if let Some(active) = shell.active_workspace_id.as_deref() {
                p.set_active_workspace(active);
            }
            p.focused_window = shell.focused().map(String::from);
            p.status_text = STATUS_CONNECTED.to_string();
            p.bootstrapping = false;
        });

        info!(windows = window_count, "Initial sync complete");
        Ok(())
    }

    /// Re-request the workspace list.
    ///
    /// A response is dropped when a later refetch was issued before it
    /// arrived.
    pub async fn refresh_workspaces(&self) {
        let issued = self.workspace_fetches.fetch_add(1, Ordering::SeqCst) + 1;
        let workspaces = self
            .client
            .send_or_default::<Vec<WorkspaceRecord>>(BridgeCommand::ListWorkspaces)
            .await;
        self.apply_fetch(&self.workspace_fetches, issued, "workspaces", move |p| {
            p.replace_workspaces(workspaces)
        });
    }

    /// Re-request the tray icon list. Stale responses are dropped as for
    /// [`refresh_workspaces`](Self::refresh_workspaces).
    pub async fn refresh_tray_icons(&self) {
        let issued = self.tray_fetches.fetch_add(1, Ordering::SeqCst) + 1;
        let tray_icons = self
            .client
            .send_or_default::<Vec<TrayIconRecord>>(BridgeCommand::GetTrayIcons)
            .await;
        self.apply_fetch(&self.tray_fetches, issued, "tray icons", move |p| {
            p.tray_icons = tray_icons
        });
    }

    fn apply_fetch<F>(&self, fetches: &AtomicU64, issued: u64, list: &str, mutate: F)
    where
        F: FnOnce(&mut Projection),
    {
        // Checked under the watch lock so a newer response cannot land in between.
        self.state.send_if_modified(|p| {
            if fetches.load(Ordering::SeqCst) != issued {
                debug!(list, issued, "Dropping superseded refetch");
                return false;
            }
            mutate(p);
            true
        });
    }

    // --- incremental events ------------------------------------------------

    fn handle_event(self: &Arc<Self>, event: &ShellEvent) {
        match event {
            ShellEvent::WindowCreated(record) | ShellEvent::WindowUpdated(record) => {
                let record = record.clone();
                self.update(move |p| p.upsert_window(record));
            }
            ShellEvent::WindowDestroyed { handle } => self.update(|p| p.remove_window(handle)),
            ShellEvent::WindowFocusChanged { handle } => self.update(|p| p.set_focused(handle)),
            ShellEvent::WorkspaceSwitched {
                new_workspace_id, ..
            } => self.update(|p| p.set_active_workspace(new_workspace_id)),
            ShellEvent::WindowMovedToWorkspace {
                handle,
                workspace_id,
            } => self.update(|p| p.move_window(handle, workspace_id)),
            ShellEvent::TrayIconRemoved { id } => self.update(|p| p.remove_tray_icon(id)),
            // Payloads cannot express list ordering; refetch the whole list.
            ShellEvent::WorkspaceCreated(_) => {
                self.spawn_refresh(|mirror| async move { mirror.refresh_workspaces().await });
            }
            ShellEvent::TrayIconAdded(_) | ShellEvent::TrayIconUpdated(_) => {
                self.spawn_refresh(|mirror| async move { mirror.refresh_tray_icons().await });
            }
            ShellEvent::HotkeyPressed { id } => {
                if *id == self.settings.launcher_hotkey_id {
                    self.update(|p| p.launcher_open = !p.launcher_open);
                }
            }
            ShellEvent::Connected { protocol_version } => {
                debug!(protocol_version, "Bridge handshake received");
                let synced = !self.state.borrow().bootstrapping;
                if synced {
                    self.spawn_refresh(|mirror| async move {
                        if let Err(e) = mirror.resync().await {
                            warn!(error = %e, "Resync after reconnect failed");
                        }
                    });
                }
            }
        }
    }

    fn spawn_refresh<F, Fut>(self: &Arc<Self>, refresh: F)
    where
        F: FnOnce(Arc<Self>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(refresh(Arc::clone(self)));
            }
            Err(_) => warn!("No async runtime to refetch on, skipping"),
        }
    }

    // --- outward commands --------------------------------------------------

    /// Call a command; on failure log it. Returns whether native accepted it.
    async fn best_effort(&self, command: BridgeCommand) -> bool {
        let method = command.method();
        match self.client.send(command).await {
            Ok(value) => value.as_bool().unwrap_or(true),
            Err(e) => {
                warn!(method, error = %e, "Bridge command failed, applying locally");
                false
            }
        }
    }

    /// Focus a window.
    pub async fn focus_window(&self, handle: &str) -> bool {
        let accepted = self
            .best_effort(BridgeCommand::FocusWindow {
                handle: handle.to_string(),
            })
            .await;
        self.update(|p| p.set_focused(handle));
        accepted
    }

    /// Minimize a window.
    pub async fn minimize_window(&self, handle: &str) -> bool {
        let accepted = self
            .best_effort(BridgeCommand::MinimizeWindow {
                handle: handle.to_string(),
            })
            .await;
        self.update(|p| p.set_window_state(handle, WindowState::Minimized));
        accepted
    }

    /// Restore a window.
    pub async fn restore_window(&self, handle: &str) -> bool {
        let accepted = self
            .best_effort(BridgeCommand::RestoreWindow {
                handle: handle.to_string(),
            })
            .await;
        self.update(|p| p.set_window_state(handle, WindowState::Normal));
        accepted
    }

    /// Ask a window to close. The window stays until `windowDestroyed`.
    pub async fn close_window(&self, handle: &str) -> bool {
        self.best_effort(BridgeCommand::CloseWindow {
            handle: handle.to_string(),
        })
        .await
    }

    /// Switch workspace.
    pub async fn switch_workspace(&self, id: &str) -> bool {
        let accepted = self
            .best_effort(BridgeCommand::SwitchWorkspace { id: id.to_string() })
            .await;
        self.update(|p| p.set_active_workspace(id));
        accepted
    }

    /// Create a workspace.
    pub async fn create_workspace(&self, id: &str, name: &str) -> bool {
        let accepted = self
            .best_effort(BridgeCommand::CreateWorkspace {
                id: id.to_string(),
                name: name.to_string(),
            })
            .await;
        self.update(|p| {
            if !p.workspaces.iter().any(|ws| ws.id == id) {
                p.workspaces.push(WorkspaceRecord::new(id, name));
            }
        });
        accepted
    }

    /// Move a window to a workspace.
    pub async fn move_window_to_workspace(&self, handle: &str, workspace_id: &str) -> bool {
        let accepted = self
            .best_effort(BridgeCommand::MoveWindowToWorkspace {
                handle: handle.to_string(),
                workspace_id: workspace_id.to_string(),
            })
            .await;
        self.update(|p| p.move_window(handle, workspace_id));
        accepted
    }

    /// Launch an app and close the launcher.
    pub async fn launch_app(&self, id_or_path: &str) -> bool {
        let accepted = self
            .best_effort(BridgeCommand::LaunchApp {
                id_or_path: id_or_path.to_string(),
            })
            .await;
        self.update(|p| p.launcher_open = false);
        accepted
    }

    /// Open or close the launcher panel.
    pub fn set_launcher_open(&self, open: bool) {
        self.update(|p| p.launcher_open = open);
    }

    /// Replace the status line.
    pub fn set_status_text(&self, text: &str) {
        self.update(|p| p.status_text = text.to_string());
    }
}
