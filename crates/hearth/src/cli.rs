use std::path::PathBuf;

use clap::Parser;

/// Hearth desktop shell host.
#[derive(Debug, Clone, Parser)]
#[command(name = "hearth", version, about)]
pub struct Cli {
    /// Defer entirely to the OS default shell.
    #[arg(long, env = "HEARTH_SAFE_MODE")]
    pub safe_mode: bool,

    /// Run alongside the default shell instead of replacing it.
    #[arg(long, env = "HEARTH_DEV_MODE")]
    pub dev: bool,

    /// Use this config file instead of the platform default.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
