mod collaborators;
mod desktop_state;
mod environment;
mod service_state;
mod shell_core;
mod tracker;

pub use {
    collaborators::{SystemActions, WindowOps},
    desktop_state::{DEFAULT_WORKSPACE_ID, DEFAULT_WORKSPACE_NAME, DesktopState},
    environment::ShellEnvironment,
    service_state::ServiceState,
    shell_core::{ObserverError, ShellCoreService, StateObserver},
    tracker::{DesktopTracker, TrackerEvent, TrackerSink},
};
