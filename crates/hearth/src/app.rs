use crate::{
    AppResult, BridgeServer, EventLoopHotkeyBackend, ShellLoopCommand, StartupMode,
    config::{Config, HotkeyBinding},
    desktop_actions::{HostSystemActions, UnsupportedWindowOps, launch_default_shell},
    supervisor::{BootstrapSupervisor, ProcessLauncher, ShutdownReason, shutdown_channel},
};

use hearth_core::{
    BridgeHost, HotkeyBackend, RegisterOutcome, ServiceState, ShellCoreService, ShellEnvironment,
    service::ObserverError,
};

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tao::event_loop::EventLoopProxy;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

/// The supervised run.
///
/// Runs on the async runtime thread. Hotkey OS calls go back to the main
/// thread through `proxy`, which also receives the final exit code.
pub struct App {
    pub(crate) config: Config,
    pub(crate) mode: StartupMode,
    pub(crate) proxy: EventLoopProxy<ShellLoopCommand>,
    pub(crate) hotkeys_available: bool,
}

impl App {
    /// Run until shutdown and return the process exit code.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub(crate) async fn run(self) -> i32 {
        info!("Hearth starting");
        let mode = self.mode;

        match self.supervise().await {
            Ok(reason) => {
                info!(%reason, "Hearth stopped");
                if reason != ShutdownReason::Interrupted {
                    launch_default_shell(mode);
                }
                reason.exit_code()
            }
            Err(e) => {
                error!(error = %e, "Bootstrap failed");
                launch_default_shell(mode);
                1
            }
        }
    }

    async fn supervise(self) -> AppResult<ShutdownReason> {
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();

        let hotkeys: Option<Arc<dyn HotkeyBackend>> = if self.hotkeys_available {
            Some(Arc::new(EventLoopHotkeyBackend::new(self.proxy.clone())))
        } else {
            warn!("Global hotkeys unavailable, registry runs bookkeeping-only");
            None
        };

        let shell = Arc::new(ShellCoreService::new(ShellEnvironment {
            trackers: Vec::new(),
            hotkeys,
            windows: Arc::new(UnsupportedWindowOps),
            system: Arc::new(HostSystemActions::new(
                &self.config.launcher,
                shutdown_tx.clone(),
            )),
        }));
        shell.on_state_changed(Box::new(|state: ServiceState| -> Result<(), ObserverError> {
            info!(%state, "Shell core state changed");
            Ok(())
        }));

        shell.start().await?;
        register_hotkeys(&shell, &self.config.hotkeys).await;

        let supervisor = Arc::new(BootstrapSupervisor::new(
            shell,
            Arc::new(ProcessLauncher::new(self.config.bridge.ui_environment())),
            &self.config.ui_host,
            &executable_dir(),
            self.config.supervisor.clone(),
            shutdown_tx,
        ));

        let host = BridgeHost::new(Arc::clone(supervisor.shell()));
        let bridge = match BridgeServer::start(host, &self.config.bridge).await {
            Ok(bridge) => {
                info!(addr = %bridge.local_addr(), "UI bridge ready");
                bridge
            }
            Err(e) => {
                supervisor.shutdown().await;
                return Err(e);
            }
        };

        if let Err(e) = supervisor.start().await {
            supervisor.shutdown().await;
            bridge.stop().await;
            return Err(e);
        }

        let reason = wait_for_shutdown(&mut shutdown_rx).await;
        info!(%reason, "Shutdown requested");

        supervisor.shutdown().await;
        bridge.stop().await;

        Ok(reason)
    }
}

async fn register_hotkeys(shell: &ShellCoreService, bindings: &[HotkeyBinding]) {
    for binding in bindings {
        let HotkeyBinding { id, shortcut } = binding;
        match shell.register_hotkey(id, shortcut).await {
            Ok(RegisterOutcome::Registered { atom }) => {
                info!(%id, %shortcut, atom, "Hotkey registered");
            }
            Ok(outcome) => warn!(%id, %shortcut, ?outcome, "Hotkey not registered"),
            Err(e) => warn!(%id, %shortcut, error = %e, "Invalid hotkey binding"),
        }
    }
}

fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

async fn wait_for_shutdown(
    requests: &mut mpsc::UnboundedReceiver<ShutdownReason>,
) -> ShutdownReason {
    tokio::select! {
        reason = requests.recv() => reason.unwrap_or(ShutdownReason::Interrupted),
        () = interrupted() => ShutdownReason::Interrupted,
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix. Never resolves if no handler can
/// be installed.
async fn interrupted() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        if let Ok(mut terminate) = signal(SignalKind::terminate()) {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if result.is_err() {
                        let _ = terminate.recv().await;
                    }
                }
                _ = terminate.recv() => {}
            }
            return;
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
