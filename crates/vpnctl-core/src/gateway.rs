//! Credential issuance and revocation.
//!
//! The actual certificate work is done by external tooling. The core only
//! sees [`ProvisioningGateway`]: hand it a client name, get back the tool's
//! text output or a [`CoreError`] carrying that output.

use std::cell::RefCell;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Output};

use secrecy::{ExposeSecret, SecretString};

use crate::error::CoreError;
use crate::model::ClientName;

/// How the issued private key is protected.
#[derive(Debug)]
pub enum KeyProtection {
    /// Unencrypted key.
    NoPass,
    /// Passphrase-protected key; the passphrase is handed to the tool.
    WithPass(SecretString),
}

impl KeyProtection {
    pub fn mode(&self) -> &'static str {
        match self {
            Self::NoPass => "nopass",
            Self::WithPass(_) => "withpass",
        }
    }
}

/// Capability to issue and revoke client credentials.
pub trait ProvisioningGateway {
    /// Issue a credential bundle for `name`. Returns the tool's output.
    fn issue(&self, name: &ClientName, protection: &KeyProtection) -> Result<String, CoreError>;

    /// Revoke the credentials of `name`. Returns the tool's output.
    fn revoke(&self, name: &ClientName) -> Result<String, CoreError>;
}

// ── Shell implementation ────────────────────────────────────────────

/// Runs the issue/revoke scripts as subprocesses.
///
/// Contract: `<issue_script> <name> nopass|withpass [passphrase]` and
/// `<revoke_script> <name>`. Exit status 0 is success.
#[derive(Debug, Clone)]
pub struct ShellGateway {
    issue_script: PathBuf,
    revoke_script: PathBuf,
}

impl ShellGateway {
    pub fn new(issue_script: impl Into<PathBuf>, revoke_script: impl Into<PathBuf>) -> Self {
        Self {
            issue_script: issue_script.into(),
            revoke_script: revoke_script.into(),
        }
    }
}

impl ProvisioningGateway for ShellGateway {
    fn issue(&self, name: &ClientName, protection: &KeyProtection) -> Result<String, CoreError> {
        let mut args: Vec<OsString> = vec![name.as_str().into(), protection.mode().into()];
        if let KeyProtection::WithPass(pass) = protection {
            args.push(pass.expose_secret().into());
        }

        tracing::info!(name = %name, mode = protection.mode(), "issuing client credentials");
        let output = run_tool(&self.issue_script, &args)?;
        finish("issue", name, &output)
    }

    fn revoke(&self, name: &ClientName) -> Result<String, CoreError> {
        tracing::info!(name = %name, "revoking client credentials");
        let output = run_tool(&self.revoke_script, &[name.as_str().into()])?;
        finish("revoke", name, &output)
    }
}

/// Spawn `program` and wait for it, capturing both streams.
pub(crate) fn run_tool(program: &std::path::Path, args: &[OsString]) -> Result<Output, CoreError> {
    Command::new(program)
        .args(args)
        .output()
        .map_err(|source| CoreError::ToolUnavailable {
            program: program.display().to_string(),
            source,
        })
}

/// stdout and stderr joined, trimmed.
pub(crate) fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    match (stdout.trim(), stderr.trim()) {
        (out, "") => out.to_owned(),
        ("", err) => err.to_owned(),
        (out, err) => format!("{out}\n{err}"),
    }
}

fn finish(
    operation: &'static str,
    name: &ClientName,
    output: &Output,
) -> Result<String, CoreError> {
    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned());
    }

    let detail = combined_output(output);
    tracing::warn!(
        name = %name,
        operation,
        code = output.status.code().unwrap_or(-1),
        "provisioning tool failed"
    );
    Err(CoreError::ProvisioningFailed {
        operation,
        name: name.to_string(),
        output: detail,
    })
}

// ── In-memory implementation ────────────────────────────────────────

/// Gateway that only records calls. Used in tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    issued: RefCell<Vec<(String, &'static str)>>,
    revoked: RefCell<Vec<String>>,
    failure: Option<String>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `output` as the tool detail.
    pub fn failing(output: impl Into<String>) -> Self {
        Self {
            failure: Some(output.into()),
            ..Self::default()
        }
    }

    /// `(name, mode)` pairs in call order.
    pub fn issued(&self) -> Vec<(String, &'static str)> {
        self.issued.borrow().clone()
    }

    pub fn revoked(&self) -> Vec<String> {
        self.revoked.borrow().clone()
    }

    fn check(&self, operation: &'static str, name: &ClientName) -> Result<(), CoreError> {
        match &self.failure {
            Some(output) => Err(CoreError::ProvisioningFailed {
                operation,
                name: name.to_string(),
                output: output.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl ProvisioningGateway for MemoryGateway {
    fn issue(&self, name: &ClientName, protection: &KeyProtection) -> Result<String, CoreError> {
        self.check("issue", name)?;
        self.issued
            .borrow_mut()
            .push((name.to_string(), protection.mode()));
        Ok(format!("issued {name}"))
    }

    fn revoke(&self, name: &ClientName) -> Result<String, CoreError> {
        self.check("revoke", name)?;
        self.revoked.borrow_mut().push(name.to_string());
        Ok(format!("revoked {name}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn name(s: &str) -> ClientName {
        ClientName::new(s).unwrap()
    }

    #[cfg(unix)]
    fn script(dir: &std::path::Path, file: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(file);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn key_protection_modes() {
        assert_eq!(KeyProtection::NoPass.mode(), "nopass");
        let pass = SecretString::from("pw".to_owned());
        assert_eq!(KeyProtection::WithPass(pass).mode(), "withpass");
    }

    #[cfg(unix)]
    #[test]
    fn shell_issue_passes_contract_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let issue = script(dir.path(), "issue.sh", r#"echo "args: $*""#);
        let gw = ShellGateway::new(&issue, dir.path().join("unused.sh"));

        let out = gw
            .issue(
                &name("alice"),
                &KeyProtection::WithPass(SecretString::from("s3cret".to_owned())),
            )
            .unwrap();
        assert_eq!(out, "args: alice withpass s3cret");

        let out = gw.issue(&name("bob"), &KeyProtection::NoPass).unwrap();
        assert_eq!(out, "args: bob nopass");
    }

    #[cfg(unix)]
    #[test]
    fn shell_failure_carries_captured_output() {
        let dir = tempfile::tempdir().unwrap();
        let revoke = script(
            dir.path(),
            "revoke.sh",
            "echo 'revoking'; echo 'no such client' >&2; exit 3",
        );
        let gw = ShellGateway::new(dir.path().join("unused.sh"), &revoke);

        match gw.revoke(&name("ghost")).unwrap_err() {
            CoreError::ProvisioningFailed {
                operation,
                name,
                output,
            } => {
                assert_eq!(operation, "revoke");
                assert_eq!(name, "ghost");
                assert_eq!(output, "revoking\nno such client");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_script_is_tool_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let gw = ShellGateway::new(dir.path().join("nope.sh"), dir.path().join("nope.sh"));
        let err = gw.revoke(&name("alice")).unwrap_err();
        assert!(matches!(err, CoreError::ToolUnavailable { .. }));
    }

    #[test]
    fn memory_gateway_records_calls() {
        let gw = MemoryGateway::new();
        gw.issue(&name("alice"), &KeyProtection::NoPass).unwrap();
        let pass = KeyProtection::WithPass(SecretString::from("pw".to_owned()));
        gw.issue(&name("bob"), &pass).unwrap();
        gw.revoke(&name("alice")).unwrap();

        assert_eq!(
            gw.issued(),
            vec![("alice".to_owned(), "nopass"), ("bob".to_owned(), "withpass")]
        );
        assert_eq!(gw.revoked(), vec!["alice"]);
    }

    #[test]
    fn failing_memory_gateway_records_nothing() {
        let gw = MemoryGateway::failing("easyrsa: boom");
        let err = gw.issue(&name("alice"), &KeyProtection::NoPass).unwrap_err();
        assert!(err.to_string().contains("easyrsa: boom"));
        assert!(gw.issued().is_empty());
    }
}
