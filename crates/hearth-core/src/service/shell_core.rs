//! Process-wide shell core lifecycle.
//!
//! Composes the desktop trackers and the hotkey registry into one service with
//! a single-writer state machine, an aggregation task that serializes every
//! OS-originated event, a snapshot query surface, and a broadcast of
//! [`ShellEvent`]s for the bridge.

use crate::{
    CoreError, CoreResult, HotkeyInfo, HotkeyRegistry, LauncherApp, RegisterOutcome,
    ServiceState, ShellEvent, ShellSnapshot, SystemStatus, TrackerEvent, TrayIconRecord,
    UnregisterOutcome, WindowRecord, WorkspaceRecord,
    hotkey::parse_shortcut,
    service::{DesktopState, ShellEnvironment, DesktopTracker},
};

use std::{
    error::Error as StdError,
    panic::{AssertUnwindSafe, Location, catch_unwind},
    sync::Arc,
};

use error_location::ErrorLocation;
use global_hotkey::hotkey::{Code, Modifiers};
use parking_lot::{Mutex, RwLock};
use tokio::{
    sync::{Mutex as AsyncMutex, broadcast, mpsc},
    task::JoinHandle,
};
use tracing::{debug, error, info, instrument, warn};

/// Capacity of the event broadcast; slow subscribers lag rather than block.
const EVENT_CAPACITY: usize = 1024;

/// Error type observers may return.
pub type ObserverError = Box<dyn StdError + Send + Sync>;

/// Callback invoked synchronously on every state transition.
pub type StateObserver = Box<dyn Fn(ServiceState) -> Result<(), ObserverError> + Send + Sync>;

type SharedObserver = Arc<dyn Fn(ServiceState) -> Result<(), ObserverError> + Send + Sync>;

/// The authoritative shell core.
pub struct ShellCoreService {
    env: ShellEnvironment,
    state: Mutex<ServiceState>,
    observers: RwLock<Vec<SharedObserver>>,
    transition: AsyncMutex<()>,
    desktop: Arc<Mutex<DesktopState>>,
    registry: Mutex<Option<Arc<HotkeyRegistry>>>,
    started_trackers: Mutex<Vec<Arc<dyn DesktopTracker>>>,
    pump: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<ShellEvent>,
}

impl ShellCoreService {
    /// Create a stopped service over the given collaborators.
    pub fn new(env: ShellEnvironment) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            env,
            state: Mutex::new(ServiceState::Stopped),
            observers: RwLock::new(Vec::new()),
            transition: AsyncMutex::new(()),
            desktop: Arc::new(Mutex::new(DesktopState::default())),
            registry: Mutex::new(None),
            started_trackers: Mutex::new(Vec::new()),
            pump: Mutex::new(None),
            events,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServiceState {
        *self.state.lock()
    }

    /// Register a state observer. Observers run in registration order.
    ///
    /// An observer registered from inside another observer is first called
    /// on the next transition.
    pub fn on_state_changed(&self, observer: StateObserver) {
        self.observers.write().push(Arc::from(observer));
    }

    /// Subscribe to shell events.
    pub fn subscribe(&self) -> broadcast::Receiver<ShellEvent> {
        self.events.subscribe()
    }

    /// Start the service: trackers, then hotkey registry, then event wiring.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidOperation`] if not `Stopped`,
    /// [`CoreError::TransitionInProgress`] if another transition is running,
    /// or the acquisition error that moved the service to `Failed`.
    #[track_caller]
    #[instrument(skip(self))]
    pub async fn start(&self) -> CoreResult<()> {
        let location = ErrorLocation::from(Location::caller());
        let Ok(_guard) = self.transition.try_lock() else {
            return Err(CoreError::TransitionInProgress { location });
        };

        let current = self.state();
        if current != ServiceState::Stopped {
            return Err(CoreError::InvalidOperation {
                operation: "start",
                state: current,
                location,
            });
        }

        self.set_state(ServiceState::Starting);

        match self.acquire().await {
            Ok(()) => {
                self.set_state(ServiceState::Running);
                info!("Shell core running");
                Ok(())
            }
            Err(e) => {
                error!(error = ?e, "Shell core failed to start");
                self.set_state(ServiceState::Failed);
                Err(e)
            }
        }
    }

    async fn acquire(&self) -> CoreResult<()> {
        let (tracker_tx, tracker_rx) = mpsc::unbounded_channel();

        let mut started: Vec<Arc<dyn DesktopTracker>> = Vec::with_capacity(self.env.trackers.len());
        for tracker in &self.env.trackers {
            if let Err(e) = tracker.start(tracker_tx.clone()).await {
                warn!(tracker = tracker.name(), "Tracker failed, unwinding");
                stop_trackers(&started).await;
                return Err(e);
            }
            debug!(tracker = tracker.name(), "Tracker started");
            started.push(Arc::clone(tracker));
        }
        drop(tracker_tx);

        let (press_tx, press_rx) = mpsc::unbounded_channel();
        let registry = match HotkeyRegistry::open(self.env.hotkeys.clone(), press_tx).await {
            Ok(registry) => Arc::new(registry),
            Err(e) => {
                stop_trackers(&started).await;
                return Err(e);
            }
        };

        *self.desktop.lock() = DesktopState::default();
        let pump = tokio::spawn(pump_events(
            tracker_rx,
            press_rx,
            Arc::clone(&self.desktop),
            self.events.clone(),
        ));

        *self.started_trackers.lock() = started;
        *self.registry.lock() = Some(registry);
        *self.pump.lock() = Some(pump);

        Ok(())
    }

    /// Stop the service and release every acquired resource.
    ///
    /// Idempotent: stopping a stopped service is a no-op. Stopping a failed
    /// service clears it back to `Stopped`.
    #[track_caller]
    #[instrument(skip(self))]
    pub async fn stop(&self) -> CoreResult<()> {
        let location = ErrorLocation::from(Location::caller());
        let Ok(_guard) = self.transition.try_lock() else {
            return Err(CoreError::TransitionInProgress { location });
        };

        match self.state() {
            ServiceState::Stopped => Ok(()),
            ServiceState::Running => {
                self.set_state(ServiceState::Stopping);
                self.teardown().await;
                self.set_state(ServiceState::Stopped);
                info!("Shell core stopped");
                Ok(())
            }
            ServiceState::Failed => {
                self.teardown().await;
                self.set_state(ServiceState::Stopped);
                Ok(())
            }
            state @ (ServiceState::Starting | ServiceState::Stopping) => {
                Err(CoreError::InvalidOperation {
                    operation: "stop",
                    state,
                    location,
                })
            }
        }
    }

    /// Release in reverse acquisition order: registry, trackers, pump.
    async fn teardown(&self) {
        let registry = self.registry.lock().take();
        if let Some(registry) = registry {
            registry.teardown().await;
        }

        let trackers = std::mem::take(&mut *self.started_trackers.lock());
        stop_trackers(&trackers).await;

        if let Some(pump) = self.pump.lock().take() {
            pump.abort();
        }

        *self.desktop.lock() = DesktopState::default();
    }

    fn set_state(&self, next: ServiceState) {
        let previous = std::mem::replace(&mut *self.state.lock(), next);
        debug!(from = %previous, to = %next, "Service state changed");

        let observers = self.observers.read().clone();
        for (index, observer) in observers.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| observer(next))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(observer = index, error = %e, "State observer failed"),
                Err(_) => warn!(observer = index, "State observer panicked"),
            }
        }
    }

    fn is_running(&self) -> bool {
        self.state() == ServiceState::Running
    }

    #[track_caller]
    fn ensure_running(&self, operation: &'static str) -> CoreResult<()> {
        let state = self.state();
        if state == ServiceState::Running {
            Ok(())
        } else {
            Err(CoreError::InvalidOperation {
                operation,
                state,
                location: ErrorLocation::from(Location::caller()),
            })
        }
    }

    fn emit(&self, event: ShellEvent) {
        debug!(kind = %event.kind(), "Emitting shell event");
        // No subscribers is fine; the bridge may not be attached yet.
        let _ = self.events.send(event);
    }

    fn registry(&self) -> Option<Arc<HotkeyRegistry>> {
        self.registry.lock().clone()
    }

    // --- queries -----------------------------------------------------------

    /// Tracked windows; empty unless running.
    pub fn list_windows(&self) -> Vec<WindowRecord> {
        if !self.is_running() {
            return Vec::new();
        }
        self.desktop.lock().windows().to_vec()
    }

    /// Workspaces; empty unless running.
    pub fn list_workspaces(&self) -> Vec<WorkspaceRecord> {
        if !self.is_running() {
            return Vec::new();
        }
        self.desktop.lock().workspaces().to_vec()
    }

    /// Tray icons; empty unless running.
    pub fn list_tray_icons(&self) -> Vec<TrayIconRecord> {
        if !self.is_running() {
            return Vec::new();
        }
        self.desktop.lock().tray_icons().to_vec()
    }

    /// Launcher catalogue; empty unless running.
    pub async fn launcher_apps(&self) -> Vec<LauncherApp> {
        if !self.is_running() {
            return Vec::new();
        }
        self.env.system.launcher_apps().await
    }

    /// Full state summary; default unless running.
    pub fn shell_state(&self) -> ShellSnapshot {
        if !self.is_running() {
            return ShellSnapshot {
                service_state: self.state(),
                ..ShellSnapshot::default()
            };
        }
        self.desktop.lock().snapshot(ServiceState::Running)
    }

    /// Host status; default unless running.
    pub async fn system_status(&self) -> SystemStatus {
        if !self.is_running() {
            return SystemStatus::default();
        }
        let mut status = self.env.system.status().await;
        status.hotkeys_available = self.registry().is_some_and(|r| !r.is_degraded());
        status
    }

    /// Active hotkey registrations; empty unless running.
    pub fn hotkeys(&self) -> Vec<HotkeyInfo> {
        self.registry().map(|r| r.registered()).unwrap_or_default()
    }

    // --- window commands ---------------------------------------------------

    /// Bring a window to the foreground.
    pub async fn focus_window(&self, handle: &str) -> CoreResult<bool> {
        self.ensure_running("focusWindow")?;
        self.env.windows.focus(handle).await
    }

    /// Minimize a window.
    pub async fn minimize_window(&self, handle: &str) -> CoreResult<bool> {
        self.ensure_running("minimizeWindow")?;
        self.env.windows.minimize(handle).await
    }

    /// Restore a window.
    pub async fn restore_window(&self, handle: &str) -> CoreResult<bool> {
        self.ensure_running("restoreWindow")?;
        self.env.windows.restore(handle).await
    }

    /// Ask a window to close.
    pub async fn close_window(&self, handle: &str) -> CoreResult<bool> {
        self.ensure_running("closeWindow")?;
        self.env.windows.close(handle).await
    }

    // --- workspace commands ------------------------------------------------

    /// Make `id` the active workspace.
    #[instrument(skip(self))]
    pub fn switch_workspace(&self, id: &str) -> CoreResult<bool> {
        self.ensure_running("switchWorkspace")?;
        let event = self.desktop.lock().switch_workspace(id)?;
        if let Some(event) = event {
            self.emit(event);
        }
        Ok(true)
    }

    /// Create a workspace. Returns `false` if the id already exists.
    #[instrument(skip(self))]
    pub fn create_workspace(&self, id: &str, name: &str) -> CoreResult<bool> {
        self.ensure_running("createWorkspace")?;
        let event = self.desktop.lock().create_workspace(id, name);
        match event {
            Some(event) => {
                self.emit(event);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Move a window into a workspace.
    #[instrument(skip(self))]
    pub fn move_window_to_workspace(&self, handle: &str, workspace_id: &str) -> CoreResult<bool> {
        self.ensure_running("moveWindowToWorkspace")?;
        let event = self.desktop.lock().move_window(handle, workspace_id)?;
        if let Some(event) = event {
            self.emit(event);
        }
        Ok(true)
    }

    // --- system commands ---------------------------------------------------

    /// Forward a click to a tray icon's owner.
    pub async fn tray_icon_click(&self, id: &str, kind: &str) -> CoreResult<bool> {
        self.ensure_running("trayIconClick")?;
        self.env.system.tray_icon_click(id, kind).await
    }

    /// Launch by launcher id or path.
    pub async fn launch_app(&self, id_or_path: &str) -> CoreResult<bool> {
        self.ensure_running("launchApp")?;
        self.env.system.launch(id_or_path).await
    }

    /// Set master volume, clamped to 0..=100.
    pub async fn set_system_volume(&self, percent: u8) -> CoreResult<bool> {
        self.ensure_running("setSystemVolume")?;
        self.env.system.set_volume(percent.min(100)).await
    }

    /// Toggle master mute.
    pub async fn toggle_system_mute(&self) -> CoreResult<bool> {
        self.ensure_running("toggleSystemMute")?;
        self.env.system.toggle_mute().await
    }

    /// Prefer a network kind.
    pub async fn prefer_network(&self, kind: &str) -> CoreResult<bool> {
        self.ensure_running("preferNetwork")?;
        self.env.system.prefer_network(kind).await
    }

    /// Hand the desktop back to the OS default shell.
    ///
    /// Allowed in any state so a broken session can always be escaped.
    pub async fn restore_default_shell(&self) -> CoreResult<bool> {
        self.env.system.restore_default_shell().await
    }

    // --- hotkeys -----------------------------------------------------------

    /// Register a hotkey from shortcut text such as `"super+space"`.
    pub async fn register_hotkey(&self, id: &str, shortcut: &str) -> CoreResult<RegisterOutcome> {
        let (modifiers, key) = parse_shortcut(shortcut)?;
        self.register_hotkey_keys(id, modifiers, key).await
    }

    /// Register a hotkey from a modifier mask and key code.
    #[track_caller]
    pub async fn register_hotkey_keys(
        &self,
        id: &str,
        modifiers: Modifiers,
        key: Code,
    ) -> CoreResult<RegisterOutcome> {
        let location = ErrorLocation::from(Location::caller());
        let Some(registry) = self.registry() else {
            return Err(CoreError::InvalidOperation {
                operation: "registerHotkey",
                state: self.state(),
                location,
            });
        };
        registry.register(id, modifiers, key).await
    }

    /// Unregister a hotkey.
    pub async fn unregister_hotkey(&self, id: &str) -> UnregisterOutcome {
        match self.registry() {
            Some(registry) => registry.unregister(id).await,
            None => UnregisterOutcome::NotRegistered,
        }
    }
}

async fn stop_trackers(trackers: &[Arc<dyn DesktopTracker>]) {
    for tracker in trackers.iter().rev() {
        tracker.stop().await;
        debug!(tracker = tracker.name(), "Tracker stopped");
    }
}

/// Serialize tracker observations and hotkey presses into the desktop state.
async fn pump_events(
    mut tracker_rx: mpsc::UnboundedReceiver<TrackerEvent>,
    mut press_rx: mpsc::UnboundedReceiver<String>,
    desktop: Arc<Mutex<DesktopState>>,
    events: broadcast::Sender<ShellEvent>,
) {
    let mut trackers_open = true;
    let mut presses_open = true;

    while trackers_open || presses_open {
        tokio::select! {
            observed = tracker_rx.recv(), if trackers_open => match observed {
                Some(observed) => {
                    let emitted = desktop.lock().apply(observed);
                    for event in emitted {
                        let _ = events.send(event);
                    }
                }
                None => trackers_open = false,
            },
            pressed = press_rx.recv(), if presses_open => match pressed {
                Some(id) => {
                    let _ = events.send(ShellEvent::HotkeyPressed { id });
                }
                None => presses_open = false,
            },
        }
    }

    debug!("Shell event pump finished");
}
