use crate::{AppError, AppResult, StartupMode, config::Config};

/// What entry does before any event loop exists.
#[derive(Debug)]
pub enum StartupPlan {
    /// Run the shell with this configuration.
    Run(Config),
    /// Hand the session to the default shell and exit with `code`.
    Defer {
        /// Process exit code.
        code: i32,
        /// Why the run was abandoned, when it was not a deliberate safe mode.
        config_error: Option<AppError>,
    },
}

impl StartupPlan {
    /// Decide how to start. Safe mode never calls `load`, so a broken or
    /// missing config cannot block it and no default file is written.
    pub fn decide<F>(mode: StartupMode, load: F) -> Self
    where
        F: FnOnce() -> AppResult<Config>,
    {
        if mode == StartupMode::Safe {
            return StartupPlan::Defer {
                code: 0,
                config_error: None,
            };
        }

        match load() {
            Ok(config) => StartupPlan::Run(config),
            Err(e) => StartupPlan::Defer {
                code: 1,
                config_error: Some(e),
            },
        }
    }
}
