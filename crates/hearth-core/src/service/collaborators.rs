use crate::{CoreResult, LauncherApp, SystemStatus};

use async_trait::async_trait;

/// Window actions delegated to the OS.
#[async_trait]
pub trait WindowOps: Send + Sync {
    /// Bring a window to the foreground.
    async fn focus(&self, handle: &str) -> CoreResult<bool>;
    /// Minimize a window.
    async fn minimize(&self, handle: &str) -> CoreResult<bool>;
    /// Restore a minimized or maximized window.
    async fn restore(&self, handle: &str) -> CoreResult<bool>;
    /// Ask a window to close.
    async fn close(&self, handle: &str) -> CoreResult<bool>;
}

/// Host pass-through actions: launching, audio, network, tray clicks.
#[async_trait]
pub trait SystemActions: Send + Sync {
    /// Launcher catalogue.
    async fn launcher_apps(&self) -> Vec<LauncherApp>;
    /// Current audio/network status.
    async fn status(&self) -> SystemStatus;
    /// Launch by launcher id or by path.
    async fn launch(&self, id_or_path: &str) -> CoreResult<bool>;
    /// Forward a click (`"left"`, `"right"`, `"double"`) to a tray icon owner.
    async fn tray_icon_click(&self, id: &str, kind: &str) -> CoreResult<bool>;
    /// Set master volume.
    async fn set_volume(&self, percent: u8) -> CoreResult<bool>;
    /// Toggle master mute.
    async fn toggle_mute(&self) -> CoreResult<bool>;
    /// Prefer a network kind.
    async fn prefer_network(&self, kind: &str) -> CoreResult<bool>;
    /// Hand the desktop back to the OS default shell.
    async fn restore_default_shell(&self) -> CoreResult<bool>;
}
