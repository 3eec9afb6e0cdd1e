mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vpnctl_core::Manager;

use crate::cli::{Cli, Command};
use crate::error::CliError;

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let Cli { mut global, command } = cli;

    match command {
        // Shell completions need neither config nor server files
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "vpnctl", &mut std::io::stdout());
            Ok(())
        }

        Command::Config(args) => {
            let cfg = load_config(&mut global)?;
            commands::config_cmd::handle(args, cfg, &global)
        }

        cmd => {
            let cfg = load_config(&mut global)?;
            let (profile, server) = config::resolve_server_config(&global, &cfg)?;
            tracing::debug!(
                profile = %profile,
                status_file = %server.status_file.display(),
                ccd_dir = %server.ccd_dir.display(),
                "resolved server config"
            );

            let manager = Manager::from_config(server);
            commands::dispatch(cmd, &manager, &global)
        }
    }
}

/// Load the config file and fill unset output flags from its defaults.
fn load_config(global: &mut cli::GlobalOpts) -> Result<vpnctl_config::Config, CliError> {
    let cfg = vpnctl_config::load_config()?;
    config::apply_defaults(global, &cfg)?;
    Ok(cfg)
}
