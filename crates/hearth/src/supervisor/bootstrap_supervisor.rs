//! UI host supervision.
//!
//! Keeps one UI host child alive while the shell core runs: probes the
//! configured candidates, polls liveness on a fixed interval, restarts with a
//! bounded budget, and owns the ordered shutdown of the whole run.

use crate::{
    AppError, AppResult,
    config::{SupervisorConfig, UiHostConfig},
    supervisor::{HostLauncher, HostProcess, HostStatus, ShutdownReason, ShutdownRequester},
};

use hearth_core::ShellCoreService;

use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
};

use error_location::ErrorLocation;
use parking_lot::Mutex;
use tokio::{
    sync::Mutex as AsyncMutex,
    task::JoinHandle,
    time::{MissedTickBehavior, interval, sleep},
};
use tracing::{error, info, instrument, warn};

/// Result of one [`BootstrapSupervisor::restart_ui_host`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOutcome {
    /// A new UI host is running.
    Restarted,
    /// The attempt failed; budget remains.
    Failed,
    /// The budget was already spent; shutdown has been requested.
    Exhausted,
}

/// Supervises the UI host process.
pub struct BootstrapSupervisor {
    shell: Arc<ShellCoreService>,
    launcher: Arc<dyn HostLauncher>,
    candidates: Vec<PathBuf>,
    args: Vec<String>,
    settings: SupervisorConfig,
    restarts: AtomicU32,
    host: AsyncMutex<Option<Box<dyn HostProcess>>>,
    poller: Mutex<Option<JoinHandle<()>>>,
    shutdown: ShutdownRequester,
}

impl BootstrapSupervisor {
    /// Create a supervisor. Relative UI host candidates resolve against
    /// `base_dir`.
    pub fn new(
        shell: Arc<ShellCoreService>,
        launcher: Arc<dyn HostLauncher>,
        ui_host: &UiHostConfig,
        base_dir: &Path,
        settings: SupervisorConfig,
        shutdown: ShutdownRequester,
    ) -> Self {
        Self {
            shell,
            launcher,
            candidates: ui_host.resolved_candidates(base_dir),
            args: ui_host.args.clone(),
            settings,
            restarts: AtomicU32::new(0),
            host: AsyncMutex::new(None),
            poller: Mutex::new(None),
            shutdown,
        }
    }

    /// The supervised shell core.
    pub fn shell(&self) -> &Arc<ShellCoreService> {
        &self.shell
    }

    /// Consecutive restart attempts since the last successful start.
    pub fn restarts(&self) -> u32 {
        self.restarts.load(Ordering::SeqCst)
    }

    /// Start the UI host, then begin liveness polling.
    ///
    /// # Errors
    ///
    /// Fails when no candidate exists or the chosen one cannot be spawned.
    pub async fn start(self: &Arc<Self>) -> AppResult<()> {
        self.start_ui_host().await?;

        let supervisor = Arc::clone(self);
        let poller = tokio::spawn(async move { supervisor.poll_liveness().await });
        *self.poller.lock() = Some(poller);
        Ok(())
    }

    /// Launch the first existing candidate. Success resets the restart count.
    #[track_caller]
    #[instrument(skip(self))]
    pub async fn start_ui_host(&self) -> AppResult<()> {
        let location = ErrorLocation::from(Location::caller());

        let Some(path) = self
            .candidates
            .iter()
            .find(|candidate| self.launcher.exists(candidate))
            .cloned()
        else {
            return Err(AppError::UiHostNotFound {
                candidates: self.candidates.clone(),
                location,
            });
        };

        let process = self
            .launcher
            .spawn(&path, &self.args)
            .map_err(|source| AppError::UiHostSpawnFailed {
                path: path.clone(),
                source,
                location,
            })?;

        *self.host.lock().await = Some(process);
        self.restarts.store(0, Ordering::SeqCst);
        info!(path = ?path, "UI host started");
        Ok(())
    }

    /// One bounded restart attempt after the UI host went away.
    #[instrument(skip(self))]
    pub async fn restart_ui_host(&self) -> RestartOutcome {
        let attempts = self.restarts();
        if attempts >= self.settings.max_restarts {
            error!(attempts, "UI host restart limit reached, requesting shutdown");
            let _ = self.shutdown.send(ShutdownReason::RestartsExhausted);
            return RestartOutcome::Exhausted;
        }

        let attempt = attempts + 1;
        self.restarts.store(attempt, Ordering::SeqCst);
        warn!(
            attempt,
            max_restarts = self.settings.max_restarts,
            "Restarting UI host"
        );

        sleep(self.settings.restart_backoff()).await;

        match self.start_ui_host().await {
            Ok(()) => RestartOutcome::Restarted,
            Err(e) => {
                error!(attempt, error = %e, "UI host restart failed");
                RestartOutcome::Failed
            }
        }
    }

    async fn poll_liveness(&self) {
        let mut ticker = interval(self.settings.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if self.host_alive().await {
                continue;
            }
            if self.restart_ui_host().await == RestartOutcome::Exhausted {
                break;
            }
        }
    }

    async fn host_alive(&self) -> bool {
        let mut host = self.host.lock().await;
        let Some(process) = host.as_mut() else {
            return false;
        };

        match process.status() {
            HostStatus::Running => true,
            HostStatus::Exited { code } => {
                warn!(exit_code = ?code, "UI host exited");
                *host = None;
                false
            }
        }
    }

    /// Ordered shutdown: stop polling, close the UI host (forced after the
    /// grace period), then stop the shell core.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        let poller = self.poller.lock().take();
        if let Some(poller) = poller {
            poller.abort();
            let _ = poller.await;
        }

        let host = self.host.lock().await.take();
        if let Some(host) = host {
            self.terminate(host).await;
        }

        match self.shell.stop().await {
            Ok(()) => info!("Shell core stopped"),
            Err(e) => warn!(error = %e, "Shell core stop failed during shutdown"),
        }
    }

    async fn terminate(&self, mut host: Box<dyn HostProcess>) {
        if matches!(host.status(), HostStatus::Exited { .. }) {
            return;
        }

        if host.request_close() && host.wait_exit(self.settings.shutdown_grace()).await {
            info!("UI host exited gracefully");
            return;
        }

        warn!("UI host did not exit in time, forcing termination");
        if let Err(e) = host.kill().await {
            warn!(error = %e, "Failed to kill UI host");
        }
    }
}
