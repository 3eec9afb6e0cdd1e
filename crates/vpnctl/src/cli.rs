//! Clap derive structures for the `vpnctl` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vpnctl -- manage the clients of an OpenVPN server
#[derive(Debug, Parser)]
#[command(
    name = "vpnctl",
    version,
    about = "Manage OpenVPN clients from the command line",
    long_about = "Issue, revoke, enable and disable OpenVPN clients, and report\n\
        who is connected.\n\n\
        The client report merges the IP-assignment ledger, the daemon's live\n\
        status file, issued credential bundles and per-client access flags.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "VPNCTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// OpenVPN status file (overrides profile)
    #[arg(long, env = "VPNCTL_STATUS_FILE", global = true, value_name = "PATH")]
    pub status_file: Option<PathBuf>,

    /// IP-assignment ledger (overrides profile)
    #[arg(long, env = "VPNCTL_LEDGER_FILE", global = true, value_name = "PATH")]
    pub ledger_file: Option<PathBuf>,

    /// Client-config directory holding access flags (overrides profile)
    #[arg(long, env = "VPNCTL_CCD_DIR", global = true, value_name = "DIR")]
    pub ccd_dir: Option<PathBuf>,

    /// Directory of issued credential bundles (overrides profile)
    #[arg(long, env = "VPNCTL_CLIENTS_DIR", global = true, value_name = "DIR")]
    pub clients_dir: Option<PathBuf>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "VPNCTL_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

impl GlobalOpts {
    pub fn output_format(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.clone().unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage VPN clients
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Show the client report (same as `clients list`)
    #[command(alias = "st")]
    Status(ListArgs),

    /// Control the OpenVPN daemon
    Server(ServerArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

#[derive(Debug, Default, Args)]
pub struct ListArgs {
    /// Only clients connected right now
    #[arg(long)]
    pub active: bool,

    /// Only clients whose access is enabled
    #[arg(long)]
    pub enabled: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CLIENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// List every known client with access and connection state
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one client in detail
    Get {
        /// Client name (certificate common name)
        name: String,
    },

    /// Issue credentials for a new client
    #[command(alias = "new")]
    Add {
        /// Client name (certificate common name)
        name: String,

        /// Protect the private key with a passphrase
        #[arg(long)]
        with_pass: bool,

        /// Read the passphrase from this environment variable instead of prompting
        #[arg(long, value_name = "VAR", requires = "with_pass")]
        passphrase_env: Option<String>,
    },

    /// Revoke a client's credentials
    #[command(alias = "rm")]
    Revoke {
        /// Client name
        name: String,
    },

    /// Allow a client to connect
    Enable {
        /// Client name
        name: String,

        /// Do not restart the daemon after changing the flag
        #[arg(long)]
        no_reload: bool,
    },

    /// Block a client from connecting
    Disable {
        /// Client name
        name: String,

        /// Do not restart the daemon after changing the flag
        #[arg(long)]
        no_reload: bool,
    },

    /// Write a client's credential bundle to a file or stdout
    Export {
        /// Client name
        name: String,

        /// Destination file (default: stdout)
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SERVER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[command(subcommand)]
    pub command: ServerCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServerCommand {
    /// Restart the OpenVPN daemon
    Restart,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup (--yes accepts all defaults)
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Display the loaded configuration
    Show,

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    SetDefault {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
