//! Host-side collaborators handed to the shell core.

use crate::{
    StartupMode,
    config::LauncherEntry,
    supervisor::{ShutdownReason, ShutdownRequester},
};

use hearth_core::{CoreError, CoreResult, LauncherApp, SystemActions, SystemStatus, WindowOps};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

/// System actions this binary can perform on any host.
///
/// Launching goes through the platform opener; restoring the default shell
/// ends the supervised run. Device controls have no portable backend and
/// report `false`.
pub struct HostSystemActions {
    apps: Vec<LauncherApp>,
    shutdown: ShutdownRequester,
}

impl HostSystemActions {
    /// Actions over the configured launcher catalogue.
    pub fn new(launcher: &[LauncherEntry], shutdown: ShutdownRequester) -> Self {
        Self {
            apps: launcher.iter().map(LauncherApp::from).collect(),
            shutdown,
        }
    }

    fn resolve<'a>(&'a self, id_or_path: &'a str) -> &'a str {
        self.apps
            .iter()
            .find(|app| app.id == id_or_path)
            .map_or(id_or_path, |app| app.path.as_str())
    }

    fn unsupported(action: &str) -> CoreResult<bool> {
        debug!(action, "Not supported on this host");
        Ok(false)
    }
}

#[async_trait]
impl SystemActions for HostSystemActions {
    async fn launcher_apps(&self) -> Vec<LauncherApp> {
        self.apps.clone()
    }

    async fn status(&self) -> SystemStatus {
        SystemStatus::default()
    }

    #[instrument(skip(self))]
    async fn launch(&self, id_or_path: &str) -> CoreResult<bool> {
        let target = self.resolve(id_or_path);
        if target.is_empty() {
            return Err(CoreError::action_failed("launchApp", "empty target"));
        }

        open::that_detached(target)
            .map_err(|e| CoreError::action_failed("launchApp", format!("{target}: {e}")))?;
        info!(target, "Launched");
        Ok(true)
    }

    async fn tray_icon_click(&self, _id: &str, _kind: &str) -> CoreResult<bool> {
        Self::unsupported("trayIconClick")
    }

    async fn set_volume(&self, _percent: u8) -> CoreResult<bool> {
        Self::unsupported("setSystemVolume")
    }

    async fn toggle_mute(&self) -> CoreResult<bool> {
        Self::unsupported("toggleSystemMute")
    }

    async fn prefer_network(&self, _kind: &str) -> CoreResult<bool> {
        Self::unsupported("preferNetwork")
    }

    async fn restore_default_shell(&self) -> CoreResult<bool> {
        info!("Default shell requested by UI");
        self.shutdown
            .send(ShutdownReason::RestoreDefaultShell)
            .map_err(|_| {
                CoreError::action_failed("restoreExplorerShell", "shutdown already in progress")
            })?;
        Ok(true)
    }
}

/// Window operations for hosts without a native window backend.
#[derive(Debug, Default)]
pub struct UnsupportedWindowOps;

#[async_trait]
impl WindowOps for UnsupportedWindowOps {
    async fn focus(&self, handle: &str) -> CoreResult<bool> {
        debug!(handle, "focusWindow not supported on this host");
        Ok(false)
    }

    async fn minimize(&self, handle: &str) -> CoreResult<bool> {
        debug!(handle, "minimizeWindow not supported on this host");
        Ok(false)
    }

    async fn restore(&self, handle: &str) -> CoreResult<bool> {
        debug!(handle, "restoreWindow not supported on this host");
        Ok(false)
    }

    async fn close(&self, handle: &str) -> CoreResult<bool> {
        debug!(handle, "closeWindow not supported on this host");
        Ok(false)
    }
}

/// Hand the session back to the OS default shell unless `mode` runs
/// alongside it.
#[instrument]
pub fn launch_default_shell(mode: StartupMode) {
    if !mode.restores_default_shell() {
        debug!(%mode, "Default shell left untouched");
        return;
    }

    #[cfg(target_os = "windows")]
    match std::process::Command::new("explorer.exe").spawn() {
        Ok(_) => info!("Default shell relaunched"),
        Err(e) => warn!(error = %e, "Failed to relaunch default shell"),
    }

    #[cfg(not(target_os = "windows"))]
    warn!("No default shell to relaunch on this platform");
}
