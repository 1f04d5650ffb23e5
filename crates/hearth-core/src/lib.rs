//! Hearth Core Library
//!
//! Control plane of a replacement desktop shell: the shell core lifecycle,
//! the global hotkey registry, and the bridge protocol that keeps a remote UI
//! consistent with native desktop state.
//!
//! # Example
//!
//! ```no_run
//! use hearth_core::{BridgeClient, BridgeHost, CoreResult, MirrorSettings, ShellCoreService, ShellMirror};
//!
//! use std::sync::Arc;
//!
//! async fn run(shell: Arc<ShellCoreService>) -> CoreResult<()> {
//!     shell.start().await?;
//!
//!     let client = Arc::new(BridgeClient::new());
//!     let mirror = ShellMirror::new(Arc::clone(&client), MirrorSettings::default());
//!     let _pump = BridgeHost::new(Arc::clone(&shell)).connect_local(client);
//!
//!     let _ = mirror.initialize().await;
//!     println!("windows: {}", mirror.snapshot().windows.len());
//!
//!     shell.stop().await
//! }
//! ```

mod bridge;
mod error;
pub mod hotkey;
mod model;
pub mod service;

pub use {
    bridge::{
        BridgeClient, BridgeCommand, BridgeEndpoint, BridgeHost, CommandRequest, CommandResponse,
        Envelope, EventHandler, EventKind, HandlerError, MirrorSettings, PROTOCOL_VERSION,
        Projection, RawHandler, STATUS_CONNECTED, STATUS_CONNECTING, STATUS_DISCONNECTED,
        ShellEvent, ShellMirror, SyncResult,
    },
    error::{CoreError, Result as CoreResult},
    hotkey::{HotkeyBackend, HotkeyInfo, HotkeyRegistry, RegisterOutcome, UnregisterOutcome},
    model::{
        LauncherApp, NO_WINDOW, ShellSnapshot, SystemStatus, TrayIconRecord, WindowRecord,
        WindowState, WorkspaceRecord, focused_handle,
    },
    service::{
        DesktopTracker, ServiceState, ShellCoreService, ShellEnvironment, SystemActions,
        TrackerEvent, TrackerSink, WindowOps,
    },
};
