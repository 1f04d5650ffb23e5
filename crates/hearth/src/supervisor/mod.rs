mod bootstrap_supervisor;
mod host_launcher;
mod shutdown_reason;

pub(crate) use {
    bootstrap_supervisor::{BootstrapSupervisor, RestartOutcome},
    host_launcher::{HostLauncher, HostProcess, HostStatus, ProcessLauncher},
    shutdown_reason::{ShutdownReason, ShutdownRequester, shutdown_channel},
};
