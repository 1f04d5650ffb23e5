//! Global hotkey registry.
//!
//! Maps caller-chosen logical ids onto registry-assigned atom ids, drives the
//! OS backend, and turns atom notifications from the backend's sink back into
//! logical press notifications.

use crate::{
    CoreError, CoreResult,
    hotkey::{HotkeyBackend, HotkeyInfo, RegisteredHotkey},
};

use std::{
    collections::{HashMap, HashSet},
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, Ordering},
    },
    time::SystemTime,
};

use error_location::ErrorLocation;
use global_hotkey::hotkey::{Code, Modifiers};
use parking_lot::Mutex;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, instrument, trace, warn};

/// Result of [`HotkeyRegistry::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The OS accepted the hotkey (or the registry is bookkeeping-only).
    Registered {
        /// Atom assigned to the registration.
        atom: u32,
    },
    /// The id is already registered or being registered; nothing changed.
    AlreadyRegistered,
    /// The OS rejected the hotkey; nothing was stored.
    Rejected {
        /// Reason reported by the backend.
        reason: String,
    },
}

/// Result of [`HotkeyRegistry::unregister`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnregisterOutcome {
    /// Mappings removed and the OS registration released.
    Released,
    /// Mappings removed but the OS refused the release.
    ReleaseFailed {
        /// Reason reported by the backend.
        reason: String,
    },
    /// The id was not registered.
    NotRegistered,
}

#[derive(Default)]
struct Mappings {
    by_id: HashMap<String, RegisteredHotkey>,
    by_atom: HashMap<u32, String>,
    /// Ids whose OS registration is in flight.
    pending: HashSet<String>,
}

/// Owner of all global hotkey registrations for the process.
pub struct HotkeyRegistry {
    backend: Option<Arc<dyn HotkeyBackend>>,
    mappings: Arc<Mutex<Mappings>>,
    next_atom: AtomicU32,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl HotkeyRegistry {
    /// Open the registry and its notification sink.
    ///
    /// With `backend == None` the registry runs bookkeeping-only: registrations
    /// are tracked but no OS call is made and no press is ever delivered.
    /// Logical presses are sent on `presses`.
    #[track_caller]
    #[instrument(skip_all, fields(degraded = backend.is_none()))]
    pub async fn open(
        backend: Option<Arc<dyn HotkeyBackend>>,
        presses: mpsc::UnboundedSender<String>,
    ) -> CoreResult<Self> {
        let location = ErrorLocation::from(Location::caller());
        let mappings = Arc::new(Mutex::new(Mappings::default()));

        let dispatcher = match &backend {
            Some(backend) => {
                let (atom_tx, atom_rx) = mpsc::unbounded_channel();
                backend
                    .open_sink(atom_tx)
                    .await
                    .map_err(|reason| CoreError::HotkeySinkFailed { reason, location })?;
                Some(tokio::spawn(dispatch_presses(
                    atom_rx,
                    Arc::clone(&mappings),
                    presses,
                )))
            }
            None => {
                warn!("Hotkey hooks unavailable, registry is bookkeeping-only");
                None
            }
        };

        info!("Hotkey registry opened");

        Ok(Self {
            backend,
            mappings,
            next_atom: AtomicU32::new(1),
            dispatcher: Mutex::new(dispatcher),
            closed: AtomicBool::new(false),
        })
    }

    /// Whether presses can never be delivered (no OS hook capability).
    pub fn is_degraded(&self) -> bool {
        self.backend.is_none()
    }

    /// Register `modifiers + key` under the logical `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyHotkeyId`] if `id` is empty. OS rejection is
    /// not an error; it is reported as [`RegisterOutcome::Rejected`].
    #[track_caller]
    #[instrument(skip(self))]
    pub async fn register(
        &self,
        id: &str,
        modifiers: Modifiers,
        key: Code,
    ) -> CoreResult<RegisterOutcome> {
        if id.is_empty() {
            return Err(CoreError::EmptyHotkeyId {
                location: ErrorLocation::from(Location::caller()),
            });
        }
        if self.closed.load(Ordering::SeqCst) {
            return Ok(RegisterOutcome::Rejected {
                reason: "registry is closed".to_string(),
            });
        }

        let atom = {
            let mut mappings = self.mappings.lock();
            if mappings.by_id.contains_key(id) || mappings.pending.contains(id) {
                debug!(id, "Hotkey already registered");
                return Ok(RegisterOutcome::AlreadyRegistered);
            }
            mappings.pending.insert(id.to_string());
            self.next_atom.fetch_add(1, Ordering::SeqCst)
        };

        let os_result = match &self.backend {
            Some(backend) => backend.register(atom, modifiers, key).await,
            None => Ok(()),
        };

        let stored = {
            let mut mappings = self.mappings.lock();
            mappings.pending.remove(id);
            match &os_result {
                Ok(()) if !self.closed.load(Ordering::SeqCst) => {
                    mappings.by_atom.insert(atom, id.to_string());
                    mappings.by_id.insert(
                        id.to_string(),
                        RegisteredHotkey {
                            id: id.to_string(),
                            atom,
                            modifiers,
                            key,
                            registered_at: SystemTime::now(),
                        },
                    );
                    true
                }
                _ => false,
            }
        };

        match os_result {
            Ok(()) if stored => {
                info!(id, atom, "Hotkey registered");
                Ok(RegisterOutcome::Registered { atom })
            }
            Ok(()) => {
                // Registry was torn down while the OS call was in flight.
                if let Some(backend) = &self.backend {
                    let _ = backend.unregister(atom).await;
                }
                Ok(RegisterOutcome::Rejected {
                    reason: "registry closed during registration".to_string(),
                })
            }
            Err(reason) => {
                warn!(id, atom, reason = %reason, "OS rejected hotkey registration");
                Ok(RegisterOutcome::Rejected { reason })
            }
        }
    }

    /// Remove the registration for `id`.
    ///
    /// Both mapping directions are removed regardless of whether the OS
    /// release succeeds.
    #[instrument(skip(self))]
    pub async fn unregister(&self, id: &str) -> UnregisterOutcome {
        let removed = {
            let mut mappings = self.mappings.lock();
            let removed = mappings.by_id.remove(id);
            if let Some(hotkey) = &removed {
                mappings.by_atom.remove(&hotkey.atom);
            }
            removed
        };

        let Some(hotkey) = removed else {
            debug!(id, "Unregister of unknown hotkey");
            return UnregisterOutcome::NotRegistered;
        };

        if let Some(backend) = &self.backend
            && let Err(reason) = backend.unregister(hotkey.atom).await
        {
            warn!(id, atom = hotkey.atom, reason = %reason, "OS refused hotkey release");
            return UnregisterOutcome::ReleaseFailed { reason };
        }

        info!(id, atom = hotkey.atom, "Hotkey unregistered");
        UnregisterOutcome::Released
    }

    /// Atom currently mapped to `id`.
    pub fn atom_for(&self, id: &str) -> Option<u32> {
        self.mappings.lock().by_id.get(id).map(|h| h.atom)
    }

    /// Logical id currently mapped to `atom`.
    pub fn id_for(&self, atom: u32) -> Option<String> {
        self.mappings.lock().by_atom.get(&atom).cloned()
    }

    /// Snapshot of every active registration, ordered by atom.
    pub fn registered(&self) -> Vec<HotkeyInfo> {
        let mappings = self.mappings.lock();
        let mut list: Vec<HotkeyInfo> = mappings.by_id.values().map(HotkeyInfo::from).collect();
        list.sort_by_key(|h| h.atom);
        list
    }

    /// Unregister everything, then release the notification sink.
    ///
    /// Idempotent: later calls return immediately.
    #[instrument(skip(self))]
    pub async fn teardown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let ids: Vec<String> = self.mappings.lock().by_id.keys().cloned().collect();
        for id in ids {
            let _ = self.unregister(&id).await;
        }

        if let Some(backend) = &self.backend {
            backend.close_sink().await;
        }

        if let Some(handle) = self.dispatcher.lock().take() {
            handle.abort();
        }

        info!("Hotkey registry torn down");
    }
}

impl Drop for HotkeyRegistry {
    fn drop(&mut self) {
        if let Some(handle) = self.dispatcher.lock().take() {
            handle.abort();
        }
    }
}

async fn dispatch_presses(
    mut atom_rx: mpsc::UnboundedReceiver<u32>,
    mappings: Arc<Mutex<Mappings>>,
    presses: mpsc::UnboundedSender<String>,
) {
    while let Some(atom) = atom_rx.recv().await {
        let id = mappings.lock().by_atom.get(&atom).cloned();
        match id {
            Some(id) => {
                debug!(id = %id, atom, "Hotkey pressed");
                if presses.send(id).is_err() {
                    break;
                }
            }
            None => trace!(atom, "Dropping press for unknown atom"),
        }
    }
}
