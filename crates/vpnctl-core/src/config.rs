// ── Runtime server configuration ──
//
// Describes *where* the OpenVPN server keeps its state and *which* tools
// manage it. Never touches disk itself: the CLI builds a `ServerConfig`
// from its profile and hands it in.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_STATUS_FILE: &str = "/var/log/openvpn/status.log";
pub const DEFAULT_LEDGER_FILE: &str = "/etc/openvpn/ipp.txt";
pub const DEFAULT_CCD_DIR: &str = "/etc/openvpn/ccd";
pub const DEFAULT_CLIENTS_DIR: &str = "clients";
pub const DEFAULT_BUNDLE_EXTENSION: &str = "ovpn";
pub const DEFAULT_ISSUE_SCRIPT: &str = "./scripts/vpn_client.sh";
pub const DEFAULT_REVOKE_SCRIPT: &str = "./scripts/revoke_client.sh";

/// Default daemon reload invocation.
pub fn default_reload_command() -> Vec<String> {
    ["sudo", "systemctl", "restart", "openvpn"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// What to do with clients that only show up in the live-status feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveOnlyPolicy {
    /// Drop them from the report (they have no ledger or bundle).
    #[default]
    Ignore,
    /// Append them after the provisioned clients.
    Include,
}

impl LiveOnlyPolicy {
    pub fn from_flag(include: bool) -> Self {
        if include { Self::Include } else { Self::Ignore }
    }
}

/// Filesystem layout and tooling for a single OpenVPN server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `status` report written by the daemon (status-version 1).
    pub status_file: PathBuf,
    /// `ifconfig-pool-persist` ledger.
    pub ledger_file: PathBuf,
    /// Client-config directory; one file per enabled client.
    pub ccd_dir: PathBuf,
    /// Directory holding issued credential bundles.
    pub clients_dir: PathBuf,
    /// Bundle file extension, without the dot.
    pub bundle_extension: String,
    pub issue_script: PathBuf,
    pub revoke_script: PathBuf,
    /// Program and arguments used to reload the daemon.
    pub reload_command: Vec<String>,
    pub live_only: LiveOnlyPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            status_file: DEFAULT_STATUS_FILE.into(),
            ledger_file: DEFAULT_LEDGER_FILE.into(),
            ccd_dir: DEFAULT_CCD_DIR.into(),
            clients_dir: DEFAULT_CLIENTS_DIR.into(),
            bundle_extension: DEFAULT_BUNDLE_EXTENSION.into(),
            issue_script: DEFAULT_ISSUE_SCRIPT.into(),
            revoke_script: DEFAULT_REVOKE_SCRIPT.into(),
            reload_command: default_reload_command(),
            live_only: LiveOnlyPolicy::Ignore,
        }
    }
}

impl ServerConfig {
    /// Path of the credential bundle for `name`.
    pub fn bundle_path(&self, name: &str) -> PathBuf {
        self.clients_dir
            .join(format!("{name}.{}", self.bundle_extension))
    }
}
