//! Daemon control handlers.

use vpnctl_core::Manager;

use crate::cli::{GlobalOpts, ServerArgs, ServerCommand};
use crate::error::CliError;
use crate::output;

pub fn handle(manager: &Manager, args: &ServerArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ServerCommand::Restart => {
            tracing::debug!(command = ?manager.config().reload_command, "restart requested");
            manager.restart()?;
            output::print_status("✓ OpenVPN restarted", global.quiet);
            Ok(())
        }
    }
}
