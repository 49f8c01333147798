//! Command dispatch: routes parsed CLI commands to their handlers.

pub mod config_cmd;
pub mod monitor;
pub mod ports;
pub mod replay;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Dispatch a sensor-facing command. Config and completions are handled
/// in `main` since they never touch a port.
pub async fn dispatch(cmd: Command, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Ports => ports::handle(cfg, global),
        Command::Monitor(args) => monitor::handle(&args, cfg, global).await,
        Command::Replay(args) => replay::handle(&args, cfg, global).await,
        Command::Config(_) | Command::Completions(_) => unreachable!("handled before dispatch"),
    }
}
