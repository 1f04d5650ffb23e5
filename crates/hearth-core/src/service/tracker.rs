use crate::{CoreResult, TrayIconRecord, WindowRecord, WorkspaceRecord};

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Raw lifecycle observations produced by desktop trackers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    /// A window was seen; creates the record on first sight, updates otherwise.
    WindowObserved(WindowRecord),
    /// A window was destroyed.
    WindowDestroyed {
        /// Handle of the destroyed window.
        handle: String,
    },
    /// Foreground window changed. `None` when focus went to the desktop.
    FocusChanged {
        /// Handle of the newly focused window.
        handle: Option<String>,
    },
    /// An OS virtual desktop was seen. Unknown ids are created; an active
    /// record also becomes the single active workspace.
    WorkspaceObserved(WorkspaceRecord),
    /// The OS switched to another virtual desktop.
    WorkspaceActivated {
        /// Id of the now active workspace.
        id: String,
    },
    /// The OS moved a window to another virtual desktop.
    WindowWorkspaceChanged {
        /// Handle of the moved window.
        handle: String,
        /// Id of the destination workspace.
        workspace_id: String,
    },
    /// A tray icon was seen; creates or updates the record.
    TrayIconObserved(TrayIconRecord),
    /// A tray icon was removed.
    TrayIconRemoved {
        /// Id of the removed icon.
        id: String,
    },
}

/// Channel trackers push observations into. Safe to use from any thread.
pub type TrackerSink = mpsc::UnboundedSender<TrackerEvent>;

/// An OS hook source (window, workspace, tray or focus) feeding the shell core.
///
/// Hook mechanics are platform details; the service only needs to start a
/// tracker with a sink and stop it again.
#[async_trait]
pub trait DesktopTracker: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Install hooks and begin delivering events into `sink`.
    async fn start(&self, sink: TrackerSink) -> CoreResult<()>;

    /// Remove hooks. Called once per successful `start`.
    async fn stop(&self);
}
