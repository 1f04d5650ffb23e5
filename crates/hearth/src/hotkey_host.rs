//! Main-thread owner of the OS hotkey manager.
//!
//! `GlobalHotKeyManager` must live on the thread that pumps OS messages, so
//! registration requests arrive here through the event loop proxy. Presses are
//! read from the crate's global event channel on a forwarder thread and mapped
//! from the crate's hotkey ids to registry atoms.

use crate::{AppError, AppResult, HotkeyRequest};

use hearth_core::hotkey::AtomSink;

use std::{collections::HashMap, panic::Location, sync::Arc};

use error_location::ErrorLocation;
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, trace, warn};

/// OS hotkey id → registry atom.
type Routes = Arc<Mutex<HashMap<u32, u32>>>;

/// Owns the OS hotkey manager. Lives on the main thread for the whole run.
pub struct HotkeyHost {
    manager: GlobalHotKeyManager,
    by_atom: HashMap<u32, HotKey>,
    routes: Routes,
    sink: Arc<Mutex<Option<AtomSink>>>,
}

impl HotkeyHost {
    /// Create the OS manager and start the press forwarder.
    ///
    /// Must be called on a thread with a message pump (the `tao` event loop
    /// thread) so that `WM_HOTKEY` messages are dispatched on Windows.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let manager = GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyUnavailable {
            reason: format!("Failed to create manager: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let routes: Routes = Arc::new(Mutex::new(HashMap::new()));
        let sink = Arc::new(Mutex::new(None));
        spawn_forwarder(Arc::clone(&routes), Arc::clone(&sink))?;

        info!("Global hotkey manager ready");

        Ok(Self {
            manager,
            by_atom: HashMap::new(),
            routes,
            sink,
        })
    }

    /// Execute one request and reply on its channel.
    pub fn handle(&mut self, request: HotkeyRequest) {
        match request {
            HotkeyRequest::Register {
                atom,
                modifiers,
                key,
                reply,
            } => {
                let _ = reply.send(self.register(atom, modifiers, key));
            }
            HotkeyRequest::Unregister { atom, reply } => {
                let _ = reply.send(self.unregister(atom));
            }
            HotkeyRequest::OpenSink { sink, reply } => {
                *self.sink.lock() = Some(sink);
                debug!("Hotkey sink opened");
                let _ = reply.send(Ok(()));
            }
            HotkeyRequest::CloseSink { reply } => {
                self.sink.lock().take();
                debug!("Hotkey sink closed");
                let _ = reply.send(());
            }
        }
    }

    fn register(&mut self, atom: u32, modifiers: Modifiers, key: Code) -> Result<(), String> {
        let mods = (!modifiers.is_empty()).then_some(modifiers);
        let hotkey = HotKey::new(mods, key);
        self.manager.register(hotkey).map_err(|e| e.to_string())?;

        self.routes.lock().insert(hotkey.id(), atom);
        self.by_atom.insert(atom, hotkey);
        debug!(atom, os_id = hotkey.id(), "OS hotkey registered");
        Ok(())
    }

    fn unregister(&mut self, atom: u32) -> Result<(), String> {
        let Some(hotkey) = self.by_atom.remove(&atom) else {
            return Err(format!("atom {atom} is not registered with the OS"));
        };
        self.routes.lock().remove(&hotkey.id());
        self.manager.unregister(hotkey).map_err(|e| e.to_string())
    }
}

impl Drop for HotkeyHost {
    fn drop(&mut self) {
        self.sink.lock().take();
        for (atom, hotkey) in self.by_atom.drain() {
            if let Err(e) = self.manager.unregister(hotkey) {
                warn!(atom, error = %e, "Failed to release OS hotkey on exit");
            }
        }
    }
}

/// Forward OS presses to the sink.
///
/// `GlobalHotKeyEvent::receiver()` is a blocking crossbeam receiver shared by
/// the whole process; one dedicated thread drains it for the process lifetime.
fn spawn_forwarder(routes: Routes, sink: Arc<Mutex<Option<AtomSink>>>) -> AppResult<()> {
    std::thread::Builder::new()
        .name("hotkey-forwarder".to_string())
        .spawn(move || {
            let receiver = GlobalHotKeyEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if event.state != HotKeyState::Pressed {
                    continue;
                }
                let Some(atom) = routes.lock().get(&event.id).copied() else {
                    trace!(os_id = event.id, "Press for unrouted hotkey");
                    continue;
                };
                if let Some(sink) = sink.lock().as_ref() {
                    let _ = sink.send(atom);
                }
            }
        })?;
    Ok(())
}
