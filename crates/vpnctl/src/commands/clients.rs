//! Client command handlers.

use std::fs::File;
use std::io;
use std::path::Path;

use tabled::Tabled;

use vpnctl_core::{
    AccessAction, AccessChange, ClientName, ClientRecord, FlagOutcome, KeyProtection, Manager,
    ReloadOutcome,
};

use crate::cli::{ClientsArgs, ClientsCommand, GlobalOpts, ListArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Access")]
    access: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Assigned IP")]
    assigned_ip: String,
    #[tabled(rename = "Real Address")]
    real_address: String,
}

impl ClientRow {
    fn new(c: &ClientRecord, color: bool) -> Self {
        Self {
            name: c.name.clone(),
            access: output::access_cell(c.access_enabled, color),
            status: output::connection_cell(c.is_active, color),
            assigned_ip: c.assigned_ip.clone(),
            real_address: c.real_address.clone(),
        }
    }
}

fn detail(c: &ClientRecord, color: bool) -> String {
    let mut lines = vec![
        format!("Name:          {}", c.name),
        format!("Access:        {}", output::access_cell(c.access_enabled, color)),
        format!("Status:        {}", output::connection_cell(c.is_active, color)),
        format!("Assigned IP:   {}", c.assigned_ip),
        format!("Real Address:  {}", c.real_address),
    ];
    if let Some(ref vip) = c.virtual_ip {
        lines.push(format!("Virtual IP:    {vip}"));
    }
    if let Some(rx) = c.bytes_received {
        lines.push(format!("Received:      {rx} bytes"));
    }
    if let Some(tx) = c.bytes_sent {
        lines.push(format!("Sent:          {tx} bytes"));
    }
    if let Some(ref since) = c.connected_since {
        lines.push(format!("Connected:     {since}"));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(manager: &Manager, args: ClientsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ClientsCommand::List(list_args) => list(manager, &list_args, global),

        // Lookup in the report only, so any name `list` shows is accepted.
        ClientsCommand::Get { name } => {
            let client = manager.client(&name)?;
            let color = output::should_color(&global.color_mode());
            let out = output::render_single(
                &global.output_format(),
                &client,
                |c| detail(c, color),
                |c| c.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Add {
            name,
            with_pass,
            passphrase_env,
        } => {
            let name = util::client_name(&name)?;
            let protection = if with_pass {
                KeyProtection::WithPass(util::read_passphrase(passphrase_env.as_deref())?)
            } else {
                KeyProtection::NoPass
            };

            let tool_output = manager.issue(&name, &protection)?;
            print_tool_output(&tool_output, global);
            output::print_status(&format!("✓ Issued credentials for '{name}'"), global.quiet);

            if let Ok(path) = manager.bundle_path(&name) {
                output::print_status(&format!("  Bundle: {}", path.display()), global.quiet);
            }
            Ok(())
        }

        ClientsCommand::Revoke { name } => {
            let name = util::client_name(&name)?;
            let prompt = format!("Revoke credentials of '{name}'? This cannot be undone");
            if !util::confirm(&prompt, "revoke", global.yes)? {
                output::print_status("Aborted", global.quiet);
                return Ok(());
            }

            let tool_output = manager.revoke(&name)?;
            print_tool_output(&tool_output, global);
            output::print_status(&format!("✓ Revoked credentials of '{name}'"), global.quiet);
            Ok(())
        }

        ClientsCommand::Enable { name, no_reload } => {
            set_access(manager, &name, AccessAction::Enable, !no_reload, global)
        }

        ClientsCommand::Disable { name, no_reload } => {
            set_access(manager, &name, AccessAction::Disable, !no_reload, global)
        }

        ClientsCommand::Export { name, out } => {
            let name = util::client_name(&name)?;
            let bundle = manager.bundle_path(&name)?;
            match out {
                Some(dest) => export_to_file(&bundle, &dest, global),
                None => {
                    let mut src = File::open(&bundle)?;
                    io::copy(&mut src, &mut io::stdout().lock())?;
                    Ok(())
                }
            }
        }
    }
}

/// The reconciled report, optionally filtered.
pub fn list(manager: &Manager, args: &ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut clients = manager.status()?;
    report_orphan_flags(manager, &clients);

    clients.retain(|c| (!args.active || c.is_active) && (!args.enabled || c.access_enabled));
    tracing::debug!(count = clients.len(), "clients after filters");

    let color = output::should_color(&global.color_mode());
    let out = output::render_list(
        &global.output_format(),
        &clients,
        |c| ClientRow::new(c, color),
        |c| c.name.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Log access flags that match no client in the report.
fn report_orphan_flags(manager: &Manager, clients: &[ClientRecord]) {
    match manager.access_flags() {
        Ok(flags) => {
            for flag in flags.iter().filter(|f| !clients.iter().any(|c| &c.name == *f)) {
                tracing::info!(name = %flag, "access flag without a known client");
            }
        }
        Err(e) => tracing::debug!(error = %e, "could not list access flags"),
    }
}

fn set_access(
    manager: &Manager,
    raw: &str,
    action: AccessAction,
    reload: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let name = util::client_name(raw)?;
    let change = manager.set_access(&name, action, reload)?;

    if matches!(global.output_format(), OutputFormat::Table | OutputFormat::Plain) {
        report_change(&name, &change, global.quiet);
    } else {
        let out = output::render_single(
            &global.output_format(),
            &change,
            |_| String::new(),
            |c| c.name.clone(),
        )?;
        output::print_output(&out, global.quiet);
    }

    match change.reload {
        ReloadOutcome::Failed(output) => Err(CliError::ReloadFailed { output }),
        ReloadOutcome::Reloaded | ReloadOutcome::Skipped => Ok(()),
    }
}

fn report_change(name: &ClientName, change: &AccessChange, quiet: bool) {
    let line = match change.flag {
        FlagOutcome::Enabled => format!("✓ Enabled access for '{name}'"),
        FlagOutcome::Disabled => format!("✓ Disabled access for '{name}'"),
        FlagOutcome::AlreadyEnabled => format!("warning: '{name}' was already enabled"),
        FlagOutcome::AlreadyDisabled => format!("warning: '{name}' was already disabled"),
    };
    output::print_status(&line, quiet);

    match change.reload {
        ReloadOutcome::Reloaded => output::print_status("✓ OpenVPN restarted", quiet),
        ReloadOutcome::Skipped => output::print_status(
            "  Daemon not restarted; apply with: vpnctl server restart",
            quiet,
        ),
        ReloadOutcome::Failed(_) => {}
    }
}

fn export_to_file(bundle: &Path, dest: &Path, global: &GlobalOpts) -> Result<(), CliError> {
    if dest.exists() {
        let prompt = format!("Overwrite {}?", dest.display());
        if !util::confirm(&prompt, "overwrite", global.yes)? {
            output::print_status("Aborted", global.quiet);
            return Ok(());
        }
    }
    std::fs::copy(bundle, dest)?;
    output::print_status(&format!("✓ Wrote {}", dest.display()), global.quiet);
    Ok(())
}

fn print_tool_output(text: &str, global: &GlobalOpts) {
    if !text.is_empty() && global.verbose > 0 {
        output::print_status(text, global.quiet);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected() -> ClientRecord {
        let mut c = ClientRecord::new("alice").with_assigned_ip("10.8.0.2");
        c.access_enabled = true;
        c.is_active = true;
        c.real_address = "203.0.113.5".into();
        c.virtual_ip = Some("10.8.0.2".into());
        c.bytes_received = Some(1024);
        c
    }

    #[test]
    fn row_uses_plain_words_without_color() {
        let row = ClientRow::new(&connected(), false);
        assert_eq!(row.access, "enabled");
        assert_eq!(row.status, "active");
        assert_eq!(row.real_address, "203.0.113.5");
    }

    #[test]
    fn detail_includes_live_fields_only_when_known() {
        let text = detail(&connected(), false);
        assert!(text.contains("Virtual IP:    10.8.0.2"));
        assert!(text.contains("Received:      1024 bytes"));
        assert!(!text.contains("Sent:"));

        let text = detail(&ClientRecord::new("bob"), false);
        assert!(text.contains("Real Address:  unknown"));
        assert!(!text.contains("Virtual IP"));
    }
}
