//! Native end of the bridge.
//!
//! Executes commands against the shell core and turns its event broadcast
//! into envelopes for whichever transport is attached.

use crate::{
    BridgeClient, BridgeCommand, BridgeEndpoint, CommandRequest, CommandResponse, CoreResult,
    Envelope, RegisterOutcome, ShellCoreService, ShellEvent, UnregisterOutcome,
};

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::{debug, info, instrument, warn};

/// Command executor and event source over a [`ShellCoreService`].
#[derive(Clone)]
pub struct BridgeHost {
    shell: Arc<ShellCoreService>,
}

impl BridgeHost {
    /// Create a host for `shell`.
    pub fn new(shell: Arc<ShellCoreService>) -> Self {
        Self { shell }
    }

    /// The shell core this host serves.
    pub fn shell(&self) -> &Arc<ShellCoreService> {
        &self.shell
    }

    /// Subscribe to native events.
    pub fn subscribe(&self) -> broadcast::Receiver<ShellEvent> {
        self.shell.subscribe()
    }

    /// Execute a typed command.
    #[instrument(skip(self), fields(method = command.method()))]
    pub async fn execute(&self, command: BridgeCommand) -> CoreResult<Value> {
        let shell = &self.shell;

        let value = match command {
            BridgeCommand::ListWindows => serde_json::to_value(shell.list_windows())?,
            BridgeCommand::ListWorkspaces => serde_json::to_value(shell.list_workspaces())?,
            BridgeCommand::GetTrayIcons => serde_json::to_value(shell.list_tray_icons())?,
            BridgeCommand::GetLauncherApps => serde_json::to_value(shell.launcher_apps().await)?,
            BridgeCommand::GetShellState => serde_json::to_value(shell.shell_state())?,
            BridgeCommand::GetSystemStatus => serde_json::to_value(shell.system_status().await)?,
            BridgeCommand::FocusWindow { handle } => json!(shell.focus_window(&handle).await?),
            BridgeCommand::MinimizeWindow { handle } => {
                json!(shell.minimize_window(&handle).await?)
            }
            BridgeCommand::RestoreWindow { handle } => json!(shell.restore_window(&handle).await?),
            BridgeCommand::CloseWindow { handle } => json!(shell.close_window(&handle).await?),
            BridgeCommand::SwitchWorkspace { id } => json!(shell.switch_workspace(&id)?),
            BridgeCommand::CreateWorkspace { id, name } => {
                json!(shell.create_workspace(&id, &name)?)
            }
            BridgeCommand::MoveWindowToWorkspace {
                handle,
                workspace_id,
            } => json!(shell.move_window_to_workspace(&handle, &workspace_id)?),
            BridgeCommand::TrayIconClick { id, kind } => {
                json!(shell.tray_icon_click(&id, &kind).await?)
            }
            BridgeCommand::LaunchApp { id_or_path } => json!(shell.launch_app(&id_or_path).await?),
            BridgeCommand::SetSystemVolume { percent } => {
                json!(shell.set_system_volume(percent).await?)
            }
            BridgeCommand::ToggleSystemMute => json!(shell.toggle_system_mute().await?),
            BridgeCommand::PreferNetwork { kind } => json!(shell.prefer_network(&kind).await?),
            BridgeCommand::RestoreExplorerShell => json!(shell.restore_default_shell().await?),
            BridgeCommand::RegisterHotkey { id, shortcut } => {
                let outcome = shell.register_hotkey(&id, &shortcut).await?;
                json!(matches!(outcome, RegisterOutcome::Registered { .. }))
            }
            BridgeCommand::UnregisterHotkey { id } => {
                let outcome = shell.unregister_hotkey(&id).await;
                json!(!matches!(outcome, UnregisterOutcome::NotRegistered))
            }
            BridgeCommand::ListHotkeys => serde_json::to_value(shell.hotkeys())?,
        };

        Ok(value)
    }

    /// Answer one wire request. Never fails; errors become failure responses.
    pub async fn handle_request(&self, request: CommandRequest) -> CommandResponse {
        let CommandRequest { id, method, args } = request;
        match self.invoke(&method, args).await {
            Ok(result) => CommandResponse::success(id, result),
            Err(e) => {
                warn!(method = %method, error = %e, "Bridge command failed");
                CommandResponse::failure(id, e.to_string())
            }
        }
    }

    /// Attach `client` to this host in-process.
    ///
    /// The client gets this host as its endpoint, a `connected` handshake,
    /// and every subsequent event. The returned task ends when the event
    /// broadcast closes; abort it to detach early.
    pub fn connect_local(&self, client: Arc<BridgeClient>) -> JoinHandle<()> {
        let mut events = self.subscribe();
        client.attach(Arc::new(self.clone()));

        tokio::spawn(async move {
            match Envelope::from_event(&ShellEvent::connected()) {
                Ok(handshake) => {
                    client.dispatch(&handshake);
                }
                Err(e) => warn!(error = ?e, "Failed to encode handshake"),
            }
            info!("Local bridge client connected");

            loop {
                match events.recv().await {
                    Ok(event) => match Envelope::from_event(&event) {
                        Ok(envelope) => {
                            client.dispatch(&envelope);
                        }
                        Err(e) => warn!(error = ?e, "Failed to encode event"),
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Local bridge client lagged behind events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            client.detach();
            debug!("Local bridge client detached");
        })
    }
}

#[async_trait]
impl BridgeEndpoint for BridgeHost {
    async fn invoke(&self, method: &str, args: Vec<Value>) -> CoreResult<Value> {
        let command = BridgeCommand::parse(method, &args)?;
        self.execute(command).await
    }
}
