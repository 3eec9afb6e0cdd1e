//! Config subcommand handlers.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use dialoguer::Input;
use serde::Serialize;
use tabled::Tabled;

use vpnctl_config::{self as config, Config, DEFAULT_PROFILE, Profile};
use vpnctl_core::ServerConfig;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Clone, Serialize, Tabled)]
struct ProfileSummary {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Default", display_with = "default_marker")]
    default: bool,
    #[tabled(rename = "Status File")]
    status_file: String,
    #[tabled(rename = "CCD Dir")]
    ccd_dir: String,
}

fn default_marker(is_default: &bool) -> String {
    if *is_default { "*".into() } else { String::new() }
}

fn summarize(cfg: &Config) -> Vec<ProfileSummary> {
    let default = cfg.default_profile.as_deref().unwrap_or(DEFAULT_PROFILE);
    let fallback = ServerConfig::default();
    cfg.profiles
        .iter()
        .map(|(name, p)| ProfileSummary {
            name: name.clone(),
            default: name == default,
            status_file: p
                .status_file
                .as_deref()
                .unwrap_or(&fallback.status_file)
                .display()
                .to_string(),
            ccd_dir: p
                .ccd_dir
                .as_deref()
                .unwrap_or(&fallback.ccd_dir)
                .display()
                .to_string(),
        })
        .collect()
}

fn ask_path(prompt: &str, default: &Path) -> Result<PathBuf, CliError> {
    let answer: String = Input::new()
        .with_prompt(prompt)
        .default(default.display().to_string())
        .interact_text()
        .map_err(prompt_err)?;
    Ok(PathBuf::from(answer))
}

/// Walk through every path of a profile, starting from the defaults.
fn prompt_profile() -> Result<(String, Profile), CliError> {
    let defaults = ServerConfig::default();

    let name: String = Input::new()
        .with_prompt("Profile name")
        .default(DEFAULT_PROFILE.into())
        .interact_text()
        .map_err(prompt_err)?;

    let mut profile = Profile::with_defaults();
    profile.status_file = Some(ask_path("OpenVPN status file", &defaults.status_file)?);
    profile.ledger_file = Some(ask_path("IP-assignment ledger", &defaults.ledger_file)?);
    profile.ccd_dir = Some(ask_path("Client-config directory", &defaults.ccd_dir)?);
    profile.clients_dir = Some(ask_path("Credential bundle directory", &defaults.clients_dir)?);
    profile.issue_script = Some(ask_path("Issue script", &defaults.issue_script)?);
    profile.revoke_script = Some(ask_path("Revoke script", &defaults.revoke_script)?);

    Ok((name, profile))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, mut cfg: Config, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init { force } => {
            let config_path = config::config_path();
            if config_path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: config_path.display().to_string(),
                });
            }

            let (profile_name, profile) = if global.yes {
                (DEFAULT_PROFILE.to_owned(), Profile::with_defaults())
            } else if std::io::stdin().is_terminal() {
                eprintln!("vpnctl configuration wizard");
                eprintln!("   Config path: {}\n", config_path.display());
                prompt_profile()?
            } else {
                return Err(CliError::NonInteractiveRequiresYes {
                    action: "config init".into(),
                });
            };

            // Validate before writing anything.
            config::profile_to_server_config(&profile)?;

            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            let written = config::save_config(&cfg)?;

            output::print_status(
                &format!("✓ Configuration written to {}", written.display()),
                global.quiet,
            );
            output::print_status(&format!("  Active profile: {profile_name}"), global.quiet);
            output::print_status("  Test it: vpnctl clients list", global.quiet);
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let text = toml::to_string_pretty(&cfg)?;
            let out = output::render_single(
                &global.output_format(),
                &cfg,
                |_| text.trim_end().to_owned(),
                |c| {
                    c.default_profile
                        .clone()
                        .unwrap_or_else(|| DEFAULT_PROFILE.into())
                },
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            if cfg.profiles.is_empty() {
                output::print_status(
                    "No profiles configured. Run: vpnctl config init",
                    global.quiet,
                );
                return Ok(());
            }
            let summaries = summarize(&cfg);
            let out = output::render_list(
                &global.output_format(),
                &summaries,
                ProfileSummary::clone,
                |s| s.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── SetDefault <name> ───────────────────────────────────────
        ConfigCommand::SetDefault { name } => {
            if !cfg.profiles.contains_key(&name) {
                return Err(config::ConfigError::ProfileNotFound {
                    name,
                    available: cfg.profile_names(),
                }
                .into());
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::print_status(&format!("✓ Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}
