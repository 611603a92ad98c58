//! Command dispatch: bridges CLI args -> AppStore operations -> output formatting.

pub mod config_cmd;
pub mod connections;
pub mod tasks;
pub mod util;

use bodhi_core::AppStore;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, app: &AppStore, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Connections(args) => connections::handle(app, args, global).await,
        Command::Tasks(args) => tasks::handle(app, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
