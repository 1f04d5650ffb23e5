use hearth_core::LauncherApp;

use serde::{Deserialize, Serialize};

/// One launcher catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherEntry {
    /// Stable id used by `launchApp`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Executable, document or URL to open.
    pub path: String,
}

impl From<&LauncherEntry> for LauncherApp {
    fn from(entry: &LauncherEntry) -> Self {
        LauncherApp {
            id: entry.id.clone(),
            name: entry.name.clone(),
            path: entry.path.clone(),
            icon: None,
        }
    }
}
