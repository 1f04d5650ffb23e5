use crate::{
    HotkeyBackend,
    service::{DesktopTracker, SystemActions, WindowOps},
};

use std::sync::Arc;

/// External collaborators the shell core composes.
///
/// Built once by the composition root and handed to
/// [`ShellCoreService::new`](crate::ShellCoreService::new).
pub struct ShellEnvironment {
    /// Trackers, acquired in order and released in reverse.
    pub trackers: Vec<Arc<dyn DesktopTracker>>,
    /// OS hotkey adapter. `None` runs the registry bookkeeping-only.
    pub hotkeys: Option<Arc<dyn HotkeyBackend>>,
    /// Window actions.
    pub windows: Arc<dyn WindowOps>,
    /// Host pass-through actions.
    pub system: Arc<dyn SystemActions>,
}
