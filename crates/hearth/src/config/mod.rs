mod bridge_config;
#[allow(clippy::module_inception)]
mod config;
mod hotkey_binding;
mod launcher_entry;
mod supervisor_config;
mod ui_host_config;

pub(crate) use {
    bridge_config::BridgeConfig, config::Config, hotkey_binding::HotkeyBinding,
    launcher_entry::LauncherEntry, supervisor_config::SupervisorConfig,
    ui_host_config::UiHostConfig,
};

pub(crate) const DEFAULT_PORT: u16 = 7878;
pub(crate) const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
pub(crate) const DEFAULT_MAX_RESTARTS: u32 = 5;
pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
pub(crate) const DEFAULT_RESTART_BACKOFF_MS: u64 = 1_000;
pub(crate) const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 5_000;
pub(crate) const LAUNCHER_HOTKEY_ID: &str = "toggle-launcher";

pub(crate) fn default_port() -> u16 {
    DEFAULT_PORT
}

pub(crate) fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

pub(crate) fn default_max_restarts() -> u32 {
    DEFAULT_MAX_RESTARTS
}

pub(crate) fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

pub(crate) fn default_restart_backoff_ms() -> u64 {
    DEFAULT_RESTART_BACKOFF_MS
}

pub(crate) fn default_shutdown_grace_ms() -> u64 {
    DEFAULT_SHUTDOWN_GRACE_MS
}
