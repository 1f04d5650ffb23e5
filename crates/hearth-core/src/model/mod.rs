mod launcher_app;
mod shell_snapshot;
mod system_status;
mod tray_icon_record;
mod window_record;
mod workspace_record;

pub use {
    launcher_app::LauncherApp,
    shell_snapshot::{NO_WINDOW, ShellSnapshot, focused_handle},
    system_status::SystemStatus,
    tray_icon_record::TrayIconRecord,
    window_record::{WindowRecord, WindowState},
    workspace_record::WorkspaceRecord,
};
