//! Command dispatch: bridges CLI args -> hub sessions -> output formatting.

pub mod alerts;
pub mod cameras;
pub mod config_cmd;
pub mod hub;
pub mod util;
pub mod watch;

use camect_config::Config;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a hub-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Info => hub::info(cfg, global).await,
        Command::Mode { mode } => hub::set_mode(cfg, global, &mode).await,
        Command::Dump(args) => hub::dump(cfg, args, global).await,
        Command::Cameras => cameras::list(cfg, global).await,
        Command::Snapshot(args) => cameras::snapshot(cfg, args, global).await,
        Command::Ptz { camera, action } => cameras::ptz(cfg, global, &camera, &action).await,
        Command::Alerts(args) => alerts::handle(cfg, args, global).await,
        Command::Watch(args) => watch::handle(cfg, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
