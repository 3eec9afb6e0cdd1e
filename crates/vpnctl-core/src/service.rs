//! Daemon reload.
//!
//! Access-flag changes only take effect once the daemon re-reads its
//! client-config directory. Restarting it is a privileged, external
//! operation hidden behind [`ServiceControl`].

use std::cell::Cell;
use std::ffi::OsString;
use std::path::Path;

use crate::error::CoreError;
use crate::gateway::{combined_output, run_tool};

/// Capability to reload the VPN daemon.
pub trait ServiceControl {
    fn reload(&self) -> Result<(), CoreError>;
}

/// Runs a fixed command line, `sudo systemctl restart openvpn` by default.
#[derive(Debug, Clone)]
pub struct SystemdService {
    command: Vec<String>,
}

impl SystemdService {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl ServiceControl for SystemdService {
    fn reload(&self) -> Result<(), CoreError> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or(CoreError::EmptyReloadCommand)?;
        let args: Vec<OsString> = args.iter().map(OsString::from).collect();

        tracing::info!(command = %self.command.join(" "), "reloading VPN daemon");
        let output = run_tool(Path::new(program), &args)?;
        if output.status.success() {
            return Ok(());
        }

        let detail = combined_output(&output);
        tracing::warn!(code = output.status.code().unwrap_or(-1), "daemon reload failed");
        Err(CoreError::ReloadFailed {
            output: if detail.is_empty() {
                format!("'{}' exited unsuccessfully", self.command.join(" "))
            } else {
                detail
            },
        })
    }
}

/// Counts reloads instead of running anything.
#[derive(Debug, Default)]
pub struct MemoryService {
    reloads: Cell<usize>,
    failure: Option<String>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(output: impl Into<String>) -> Self {
        Self {
            failure: Some(output.into()),
            ..Self::default()
        }
    }

    /// Number of reload attempts, failed ones included.
    pub fn reloads(&self) -> usize {
        self.reloads.get()
    }
}

impl ServiceControl for MemoryService {
    fn reload(&self) -> Result<(), CoreError> {
        self.reloads.set(self.reloads.get() + 1);
        match &self.failure {
            Some(output) => Err(CoreError::ReloadFailed {
                output: output.clone(),
            }),
            None => Ok(()),
        }
    }
}
