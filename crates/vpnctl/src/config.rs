//! CLI-side configuration: `GlobalOpts` overrides on top of the resolved
//! profile, and translation to `vpnctl_core::ServerConfig`.
//!
//! Core never sees these types -- it receives a pre-built `ServerConfig`.

use clap::ValueEnum;

use vpnctl_config::{Config, profile_to_server_config};
use vpnctl_core::ServerConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Fill unset `--output` / `--color` from the config file's `[defaults]`.
pub fn apply_defaults(global: &mut GlobalOpts, config: &Config) -> Result<(), CliError> {
    if global.output.is_none() {
        let output = parse_value::<OutputFormat>("defaults.output", &config.defaults.output)?;
        global.output = Some(output);
    }
    if global.color.is_none() {
        let color = parse_value::<ColorMode>("defaults.color", &config.defaults.color)?;
        global.color = Some(color);
    }
    Ok(())
}

fn parse_value<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw, true).map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("unknown value '{raw}'"),
    })
}

/// Translate the active profile + global flags into a `ServerConfig`.
///
/// Precedence: flag / `VPNCTL_*` env > profile > built-in default.
pub fn resolve_server_config(
    global: &GlobalOpts,
    config: &Config,
) -> Result<(String, ServerConfig), CliError> {
    let (profile_name, profile) = config.resolve_profile(global.profile.as_deref())?;
    let mut server = profile_to_server_config(&profile)?;

    if let Some(ref path) = global.status_file {
        server.status_file.clone_from(path);
    }
    if let Some(ref path) = global.ledger_file {
        server.ledger_file.clone_from(path);
    }
    if let Some(ref path) = global.ccd_dir {
        server.ccd_dir.clone_from(path);
    }
    if let Some(ref path) = global.clients_dir {
        server.clients_dir.clone_from(path);
    }

    Ok((profile_name, server))
}
