//! Rendering for `--output`: rounded `tabled` tables, serde JSON / YAML,
//! or one client name per line for scripts.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Color is on for `always`, or for `auto` on a terminal without `NO_COLOR`.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// "active" in green or "offline" dimmed.
pub fn connection_cell(active: bool, color: bool) -> String {
    match (active, color) {
        (true, true) => "active".green().bold().to_string(),
        (true, false) => "active".into(),
        (false, true) => "offline".dimmed().to_string(),
        (false, false) => "offline".into(),
    }
}

/// "enabled" in green or "disabled" in red.
pub fn access_cell(enabled: bool, color: bool) -> String {
    match (enabled, color) {
        (true, true) => "enabled".green().to_string(),
        (true, false) => "enabled".into(),
        (false, true) => "disabled".red().to_string(),
        (false, false) => "disabled".into(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a slice in the chosen format.
///
/// `to_row` builds the table row for each item; `id_fn` gives the line
/// printed per item in plain mode. JSON and YAML serialize `data` itself.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    if let Some(text) = render_structured(format, data)? {
        return Ok(text);
    }
    Ok(match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        _ => data.iter().map(id_fn).collect::<Vec<_>>().join("\n"),
    })
}

/// Render one item. In table mode `detail_fn` produces a key/value block.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    if let Some(text) = render_structured(format, data)? {
        return Ok(text);
    }
    Ok(match format {
        OutputFormat::Table => detail_fn(data),
        _ => id_fn(data),
    })
}

/// JSON / YAML rendering, `None` for the human formats.
fn render_structured<T: serde::Serialize + ?Sized>(
    format: &OutputFormat,
    data: &T,
) -> Result<Option<String>, CliError> {
    Ok(match format {
        OutputFormat::Json => Some(serde_json::to_string_pretty(data)?),
        OutputFormat::JsonCompact => Some(serde_json::to_string(data)?),
        OutputFormat::Yaml => Some(serde_yaml::to_string(data)?),
        OutputFormat::Table | OutputFormat::Plain => None,
    })
}

/// Write rendered output to stdout unless `--quiet`.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Progress and result messages go to stderr so stdout stays parseable.
pub fn print_status(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{message}");
    }
}
