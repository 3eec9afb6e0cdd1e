// ── Core error types ──
//
// Domain failures raised by vpnctl-core. Consumers never see raw
// `std::process::Output` or bare `io::Error`s without context. Every
// variant names the file, client, or tool involved.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Source errors ────────────────────────────────────────────────
    /// The live-status report could not be read. Usually means the
    /// OpenVPN daemon is down or has not written its first snapshot.
    #[error("Status source unavailable at {}: {source}", path.display())]
    StatusUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Client errors ────────────────────────────────────────────────
    #[error("Invalid client name '{name}': {reason}")]
    InvalidClientName { name: String, reason: String },

    #[error("Client not found: {name}")]
    ClientNotFound { name: String },

    #[error("No credential bundle for client '{name}' at {}", path.display())]
    BundleNotFound { name: String, path: PathBuf },

    // ── Access flag errors ───────────────────────────────────────────
    #[error("Failed to {action} access for client '{name}': {source}")]
    AccessFlag {
        name: String,
        action: &'static str,
        #[source]
        source: std::io::Error,
    },

    // ── External tool errors ─────────────────────────────────────────
    #[error("Could not run '{program}': {source}")]
    ToolUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to {operation} client '{name}': {output}")]
    ProvisioningFailed {
        operation: &'static str,
        name: String,
        /// Captured stdout and stderr of the failed tool.
        output: String,
    },

    #[error("Daemon reload failed: {output}")]
    ReloadFailed { output: String },

    #[error("Reload command is empty")]
    EmptyReloadCommand,
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
