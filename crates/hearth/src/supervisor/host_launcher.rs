//! UI host process seam.
//!
//! The supervisor only sees [`HostLauncher`] and [`HostProcess`]; the real
//! implementation wraps `tokio::process`.

use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Liveness of a spawned UI host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStatus {
    /// Still running.
    Running,
    /// Exited; `code` is `None` when killed by a signal or unknown.
    Exited {
        /// Exit code, when the platform reports one.
        code: Option<i32>,
    },
}

/// Locates and spawns UI host executables.
pub trait HostLauncher: Send + Sync {
    /// Whether `path` names an existing executable file.
    fn exists(&self, path: &Path) -> bool;

    /// Spawn `path` with `args`.
    fn spawn(&self, path: &Path, args: &[String]) -> io::Result<Box<dyn HostProcess>>;
}

/// A running UI host.
#[async_trait]
pub trait HostProcess: Send {
    /// Non-blocking liveness check.
    fn status(&mut self) -> HostStatus;

    /// Ask the process to exit. Returns false when the platform has no
    /// graceful request to deliver.
    fn request_close(&mut self) -> bool;

    /// Wait up to `timeout` for exit. Returns true if the process exited.
    async fn wait_exit(&mut self, timeout: Duration) -> bool;

    /// Force-terminate and reap.
    async fn kill(&mut self) -> io::Result<()>;
}

/// [`HostLauncher`] backed by `tokio::process`.
#[derive(Debug, Default)]
pub struct ProcessLauncher {
    env: Vec<(String, String)>,
}

impl ProcessLauncher {
    /// Launcher that adds `env` to the inherited environment of every child.
    pub fn new(env: Vec<(String, String)>) -> Self {
        Self { env }
    }
}

impl HostLauncher for ProcessLauncher {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn spawn(&self, path: &Path, args: &[String]) -> io::Result<Box<dyn HostProcess>> {
        let child = Command::new(path)
            .args(args)
            .envs(self.env.iter().map(|(key, value)| (key, value)))
            .kill_on_drop(true)
            .spawn()?;
        debug!(path = ?path, pid = ?child.id(), "UI host process spawned");

        Ok(Box::new(ChildProcess {
            child,
            path: path.to_path_buf(),
        }))
    }
}

struct ChildProcess {
    child: Child,
    path: PathBuf,
}

#[async_trait]
impl HostProcess for ChildProcess {
    fn status(&mut self) -> HostStatus {
        match self.child.try_wait() {
            Ok(Some(status)) => HostStatus::Exited {
                code: status.code(),
            },
            Ok(None) => HostStatus::Running,
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Failed to query UI host status");
                HostStatus::Exited { code: None }
            }
        }
    }

    #[cfg(unix)]
    fn request_close(&mut self) -> bool {
        let Some(pid) = self.child.id() else {
            return false;
        };
        // SAFETY: `pid` belongs to a child we have not reaped yet.
        unsafe {
            libc::kill(pid as libc::pid_t, libc::SIGTERM);
        }
        true
    }

    #[cfg(not(unix))]
    fn request_close(&mut self) -> bool {
        false
    }

    async fn wait_exit(&mut self, timeout: Duration) -> bool {
        matches!(
            tokio::time::timeout(timeout, self.child.wait()).await,
            Ok(Ok(_))
        )
    }

    async fn kill(&mut self) -> io::Result<()> {
        self.child.kill().await
    }
}
