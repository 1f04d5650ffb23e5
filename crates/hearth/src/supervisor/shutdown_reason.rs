use std::fmt;

use tokio::sync::mpsc;

/// Sender half used by anything that may end the run.
pub type ShutdownRequester = mpsc::UnboundedSender<ShutdownReason>;

/// Why the supervised run is ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Ctrl-C or SIGTERM delivered to this process.
    Interrupted,
    /// The UI asked to hand the desktop back to the OS default shell.
    RestoreDefaultShell,
    /// The UI host kept failing and the restart budget is spent.
    RestartsExhausted,
}

impl ShutdownReason {
    /// Process exit code for this reason.
    pub fn exit_code(self) -> i32 {
        match self {
            ShutdownReason::Interrupted | ShutdownReason::RestoreDefaultShell => 0,
            ShutdownReason::RestartsExhausted => 1,
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ShutdownReason::Interrupted => "interrupted",
            ShutdownReason::RestoreDefaultShell => "default shell requested",
            ShutdownReason::RestartsExhausted => "UI host restarts exhausted",
        };
        write!(f, "{text}")
    }
}

/// Create the shutdown channel.
pub fn shutdown_channel() -> (ShutdownRequester, mpsc::UnboundedReceiver<ShutdownReason>) {
    mpsc::unbounded_channel()
}
