//! Command dispatch: bridges CLI args -> `Manager` operations -> output.

pub mod clients;
pub mod config_cmd;
pub mod server;
pub mod util;

use vpnctl_core::Manager;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub fn dispatch(cmd: Command, manager: &Manager, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Clients(args) => clients::handle(manager, args, global),
        Command::Status(list) => clients::list(manager, &list, global),
        Command::Server(args) => server::handle(manager, &args, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
