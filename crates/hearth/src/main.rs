//! Hearth: replacement desktop shell host.
//!
//! Runs the shell core, supervises the UI host process, and serves the bridge
//! the UI uses to mirror desktop state.

mod app;
mod bridge_server;
mod cli;
mod config;
mod desktop_actions;
mod error;
mod hotkey_backend;
mod hotkey_host;
mod logging;
mod shell_loop_command;
mod startup_mode;
mod startup_plan;
mod supervisor;

pub(crate) use {
    app::App,
    bridge_server::BridgeServer,
    cli::Cli,
    error::{AppError, Result as AppResult},
    hotkey_backend::EventLoopHotkeyBackend,
    hotkey_host::HotkeyHost,
    shell_loop_command::{HotkeyRequest, ShellLoopCommand},
    startup_mode::StartupMode,
    startup_plan::StartupPlan,
};

use crate::{config::Config, desktop_actions::launch_default_shell, logging::LoggingGuard};

use clap::Parser;
use tao::{
    event::{Event, StartCause},
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy},
};
use tracing::{error, info, warn};

/// Application entry point.
fn main() {
    let cli = Cli::parse();
    let mode = StartupMode::resolve(cli.safe_mode, cli.dev);

    let (config, deferral) =
        match StartupPlan::decide(mode, || Config::load(cli.config.as_deref())) {
            StartupPlan::Run(config) => (config, None),
            StartupPlan::Defer { code, config_error } => {
                (Config::default(), Some((code, config_error)))
            }
        };

    let logging_guard = match logging::init(mode, &config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    if let Some((code, config_error)) = deferral {
        match config_error {
            Some(e) => error!(error = %e, "Failed to load config"),
            None => info!("Safe mode: deferring to the default shell"),
        }
        launch_default_shell(mode);
        exit(code, logging_guard);
    }

    let event_loop = EventLoopBuilder::<ShellLoopCommand>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    // Owns the OS hotkey manager; must stay on this thread.
    let mut hotkey_host: Option<HotkeyHost> = None;
    let mut pending_app = Some(App {
        config,
        mode,
        proxy: proxy.clone(),
        hotkeys_available: false,
    });

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;
        let _ = &logging_guard;

        match event {
            Event::NewEvents(StartCause::Init) => {
                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                hotkey_host = match HotkeyHost::new() {
                    Ok(host) => Some(host),
                    Err(e) => {
                        warn!(error = %e, "Continuing without global hotkeys");
                        None
                    }
                };

                if let Some(app) = pending_app.take() {
                    let app = App {
                        hotkeys_available: hotkey_host.is_some(),
                        ..app
                    };
                    if let Err(e) = spawn_runtime(app, proxy.clone()) {
                        error!(error = %e, "Failed to start runtime thread");
                        *control_flow = ControlFlow::ExitWithCode(1);
                    }
                }
            }
            Event::UserEvent(ShellLoopCommand::Hotkey(request)) => match hotkey_host.as_mut() {
                Some(host) => host.handle(request),
                None => request.reject("global hotkeys unavailable"),
            },
            Event::UserEvent(ShellLoopCommand::Exit { code }) => {
                // Releases OS registrations before the loop exits.
                hotkey_host.take();
                info!(code, "Exiting");
                *control_flow = ControlFlow::ExitWithCode(code);
            }
            _ => {}
        }
    });
}

/// Run the supervised app on its own tokio runtime thread. The exit code is
/// posted back to the event loop when it finishes.
fn spawn_runtime(app: App, proxy: EventLoopProxy<ShellLoopCommand>) -> AppResult<()> {
    std::thread::Builder::new()
        .name("hearth-runtime".to_string())
        .spawn(move || {
            let code = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .thread_name("hearth-worker")
                .build()
            {
                Ok(runtime) => runtime.block_on(app.run()),
                Err(e) => {
                    error!(error = %e, "Failed to create tokio runtime");
                    1
                }
            };

            if proxy.send_event(ShellLoopCommand::Exit { code }).is_err() {
                error!("Event loop gone before exit code could be delivered");
            }
        })?;
    Ok(())
}

fn exit(code: i32, logging_guard: Option<LoggingGuard>) -> ! {
    drop(logging_guard);
    std::process::exit(code)
}
