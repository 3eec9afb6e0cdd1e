//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and process exit codes.

use std::io::ErrorKind;

use miette::Diagnostic;
use thiserror::Error;

use vpnctl_config::ConfigError;
use vpnctl_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const EXTERNAL: i32 = 6;
    pub const DAEMON: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Daemon ───────────────────────────────────────────────────────

    #[error("OpenVPN status file unavailable at {path}")]
    #[diagnostic(
        code(vpnctl::daemon_unavailable),
        help(
            "Is the OpenVPN daemon running? It writes this file on startup.\n\
             Point at another file with --status-file or the profile's status_file."
        )
    )]
    DaemonUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Daemon reload failed: {output}")]
    #[diagnostic(
        code(vpnctl::reload_failed),
        help("Access flags are already written. Retry with: vpnctl server restart")
    )]
    ReloadFailed { output: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(vpnctl::not_found),
        help("Run: vpnctl {list_command} to see known clients")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── External tools ───────────────────────────────────────────────

    #[error("Could not run '{program}'")]
    #[diagnostic(
        code(vpnctl::tool_unavailable),
        help("Check the issue_script, revoke_script and reload_command settings of the profile.")
    )]
    ToolUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to {operation} client '{name}'")]
    #[diagnostic(code(vpnctl::tool_failed), help("Tool output:\n{output}"))]
    ToolFailed {
        operation: String,
        name: String,
        output: String,
    },

    // ── Filesystem ───────────────────────────────────────────────────

    #[error("Permission denied: {what}")]
    #[diagnostic(
        code(vpnctl::permission_denied),
        help("Run as a user that can write the client-config directory, or via sudo.")
    )]
    PermissionDenied {
        what: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to access {path}")]
    #[diagnostic(code(vpnctl::io))]
    FileAccess {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid client name '{name}': {reason}")]
    #[diagnostic(
        code(vpnctl::invalid_name),
        help("Use letters, digits, '.', '_', '-' or '@' (max 64 bytes, no leading '.' or '-').")
    )]
    InvalidName { name: String, reason: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(vpnctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(vpnctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: vpnctl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(vpnctl::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(vpnctl::config))]
    Config(Box<figment::Error>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(vpnctl::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(vpnctl::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(vpnctl::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render TOML: {0}")]
    #[diagnostic(code(vpnctl::toml))]
    Toml(#[from] toml::ser::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DaemonUnavailable { .. } | Self::ReloadFailed { .. } => exit_code::DAEMON,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ToolUnavailable { .. } | Self::ToolFailed { .. } => exit_code::EXTERNAL,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::InvalidName { .. }
            | Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

fn join_available(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::StatusUnavailable { path, source } => CliError::DaemonUnavailable {
                path: path.display().to_string(),
                source,
            },

            CoreError::Io { path, source } if source.kind() == ErrorKind::PermissionDenied => {
                CliError::PermissionDenied {
                    what: format!("reading {}", path.display()),
                    source,
                }
            }

            CoreError::Io { path, source } => CliError::FileAccess {
                path: path.display().to_string(),
                source,
            },

            CoreError::InvalidClientName { name, reason } => CliError::InvalidName { name, reason },

            CoreError::ClientNotFound { name } => CliError::NotFound {
                resource_type: "client".into(),
                identifier: name,
                list_command: "clients list".into(),
            },

            CoreError::BundleNotFound { name, path: _ } => CliError::NotFound {
                resource_type: "credential bundle for".into(),
                identifier: name,
                list_command: "clients list".into(),
            },

            CoreError::AccessFlag {
                name,
                action,
                source,
            } if source.kind() == ErrorKind::PermissionDenied => CliError::PermissionDenied {
                what: format!("cannot {action} access for '{name}'"),
                source,
            },

            CoreError::AccessFlag {
                name,
                action,
                source,
            } => CliError::FileAccess {
                path: format!("access flag of '{name}' ({action})"),
                source,
            },

            CoreError::ToolUnavailable { program, source } => {
                CliError::ToolUnavailable { program, source }
            }

            CoreError::ProvisioningFailed {
                operation,
                name,
                output,
            } => CliError::ToolFailed {
                operation: operation.into(),
                name,
                output,
            },

            CoreError::ReloadFailed { output } => CliError::ReloadFailed { output },

            CoreError::EmptyReloadCommand => CliError::Validation {
                field: "reload_command".into(),
                reason: "must name a program to run".into(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name, available } => CliError::ProfileNotFound {
                name,
                available: join_available(&available),
            },
            ConfigError::Serialization(e) => CliError::Toml(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn status_unavailable_maps_to_daemon_code() {
        let err: CliError = CoreError::StatusUnavailable {
            path: PathBuf::from("/var/log/openvpn/status.log"),
            source: io::Error::from(ErrorKind::NotFound),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::DAEMON);
    }

    #[test]
    fn refused_flag_write_maps_to_permission_code() {
        let err: CliError = CoreError::AccessFlag {
            name: "alice".into(),
            action: "enable",
            source: io::Error::from(ErrorKind::PermissionDenied),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::PERMISSION);

        let err: CliError = CoreError::AccessFlag {
            name: "alice".into(),
            action: "enable",
            source: io::Error::other("disk full"),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn domain_errors_map_to_distinct_codes() {
        let cases: Vec<(CoreError, i32)> = vec![
            (
                CoreError::InvalidClientName {
                    name: "../x".into(),
                    reason: "bad".into(),
                },
                exit_code::USAGE,
            ),
            (
                CoreError::ClientNotFound { name: "x".into() },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::BundleNotFound {
                    name: "x".into(),
                    path: PathBuf::from("clients/x.ovpn"),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::ProvisioningFailed {
                    operation: "issue",
                    name: "x".into(),
                    output: "boom".into(),
                },
                exit_code::EXTERNAL,
            ),
            (
                CoreError::ReloadFailed {
                    output: "denied".into(),
                },
                exit_code::DAEMON,
            ),
        ];

        for (core, code) in cases {
            let label = core.to_string();
            assert_eq!(CliError::from(core).exit_code(), code, "{label}");
        }
    }

    #[test]
    fn unknown_profile_lists_alternatives() {
        let err: CliError = ConfigError::ProfileNotFound {
            name: "lab".into(),
            available: vec!["default".into(), "edge".into()],
        }
        .into();
        match err {
            CliError::ProfileNotFound { available, .. } => assert_eq!(available, "default, edge"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
