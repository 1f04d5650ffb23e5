use std::fmt;

/// How this process was asked to run. Resolved once at entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupMode {
    /// Replace the default shell and supervise the UI host.
    Normal,
    /// Supervise the UI host alongside the default shell; never touch it.
    Development,
    /// Do nothing but hand the session to the default shell.
    Safe,
}

impl StartupMode {
    /// Resolve from the safe-mode and development flags. Safe mode wins.
    pub fn resolve(safe_mode: bool, dev: bool) -> Self {
        match (safe_mode, dev) {
            (true, _) => StartupMode::Safe,
            (false, true) => StartupMode::Development,
            (false, false) => StartupMode::Normal,
        }
    }

    /// Whether this process is responsible for bringing the default shell
    /// back. Development mode runs alongside it and never touches it.
    pub fn restores_default_shell(self) -> bool {
        self != StartupMode::Development
    }

    /// Default tracing filter for this mode.
    pub fn default_log_filter(self) -> &'static str {
        match self {
            StartupMode::Development => "hearth=debug,hearth_core=debug",
            StartupMode::Normal | StartupMode::Safe => "hearth=info,hearth_core=info",
        }
    }
}

impl fmt::Display for StartupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StartupMode::Normal => "normal",
            StartupMode::Development => "development",
            StartupMode::Safe => "safe",
        })
    }
}
