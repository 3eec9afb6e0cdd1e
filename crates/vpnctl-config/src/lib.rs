//! Configuration for the vpnctl CLI.
//!
//! TOML profiles, one per managed server, and translation to
//! `vpnctl_core::ServerConfig`. The CLI layers its `GlobalOpts` overrides
//! on top of what this crate resolves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vpnctl_core::{LiveOnlyPolicy, ServerConfig};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "VPNCTL_CONFIG";

pub const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: Vec<String> },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Profile names in sorted order.
    pub fn profile_names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    /// Resolve the active profile.
    ///
    /// An explicitly requested profile must exist. The configured default
    /// may be absent, in which case built-in defaults apply.
    pub fn resolve_profile(
        &self,
        requested: Option<&str>,
    ) -> Result<(String, Profile), ConfigError> {
        if let Some(name) = requested {
            return self
                .profiles
                .get(name)
                .map(|p| (name.to_owned(), p.clone()))
                .ok_or_else(|| ConfigError::ProfileNotFound {
                    name: name.to_owned(),
                    available: self.profile_names(),
                });
        }

        let name = self
            .default_profile
            .clone()
            .unwrap_or_else(|| DEFAULT_PROFILE.into());
        let profile = self.profiles.get(&name).cloned().unwrap_or_default();
        Ok((name, profile))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// A named server profile. Unset fields fall back to the core defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Profile {
    /// OpenVPN status report (status-version 1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_file: Option<PathBuf>,

    /// `ifconfig-pool-persist` ledger.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_file: Option<PathBuf>,

    /// Client-config directory holding access flags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ccd_dir: Option<PathBuf>,

    /// Directory of issued credential bundles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clients_dir: Option<PathBuf>,

    /// Bundle extension without the dot (e.g. "ovpn").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_extension: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_script: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoke_script: Option<PathBuf>,

    /// Program and arguments that reload the daemon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reload_command: Option<Vec<String>>,

    /// Report clients seen only in the live feed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_live_only: Option<bool>,
}

impl Profile {
    /// A profile with every field spelled out at its default value.
    pub fn with_defaults() -> Self {
        let server = ServerConfig::default();
        Self {
            status_file: Some(server.status_file),
            ledger_file: Some(server.ledger_file),
            ccd_dir: Some(server.ccd_dir),
            clients_dir: Some(server.clients_dir),
            bundle_extension: Some(server.bundle_extension),
            issue_script: Some(server.issue_script),
            revoke_script: Some(server.revoke_script),
            reload_command: Some(server.reload_command),
            include_live_only: Some(server.live_only == LiveOnlyPolicy::Include),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `VPNCTL_CONFIG`, else platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }

    ProjectDirs::from("com", "vpnctl", "vpnctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("vpnctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + environment. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("VPNCTL_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation to core ─────────────────────────────────────────────

/// Build a `ServerConfig` from a profile. No CLI flag overrides.
pub fn profile_to_server_config(profile: &Profile) -> Result<ServerConfig, ConfigError> {
    let mut server = ServerConfig::default();

    if let Some(ref path) = profile.status_file {
        server.status_file.clone_from(path);
    }
    if let Some(ref path) = profile.ledger_file {
        server.ledger_file.clone_from(path);
    }
    if let Some(ref path) = profile.ccd_dir {
        server.ccd_dir.clone_from(path);
    }
    if let Some(ref path) = profile.clients_dir {
        server.clients_dir.clone_from(path);
    }
    if let Some(ref ext) = profile.bundle_extension {
        server.bundle_extension = validate_extension(ext)?;
    }
    if let Some(ref path) = profile.issue_script {
        server.issue_script.clone_from(path);
    }
    if let Some(ref path) = profile.revoke_script {
        server.revoke_script.clone_from(path);
    }
    if let Some(ref command) = profile.reload_command {
        if command.first().is_none_or(|program| program.trim().is_empty()) {
            return Err(ConfigError::Validation {
                field: "reload_command".into(),
                reason: "must name a program to run".into(),
            });
        }
        server.reload_command.clone_from(command);
    }
    if let Some(include) = profile.include_live_only {
        server.live_only = LiveOnlyPolicy::from_flag(include);
    }

    Ok(server)
}

fn validate_extension(ext: &str) -> Result<String, ConfigError> {
    let ext = ext.strip_prefix('.').unwrap_or(ext);
    if ext.is_empty() || ext.contains(['.', '/', '\\']) {
        return Err(ConfigError::Validation {
            field: "bundle_extension".into(),
            reason: format!("expected a bare extension like 'ovpn', got '{ext}'"),
        });
    }
    Ok(ext.to_owned())
}
