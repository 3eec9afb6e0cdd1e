//! Shared helpers for command handlers.

use std::io::IsTerminal;

use secrecy::SecretString;

use vpnctl_core::ClientName;

use crate::error::CliError;

/// Validate a client name given on the command line.
pub fn client_name(raw: &str) -> Result<ClientName, CliError> {
    Ok(ClientName::new(raw)?)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so `--yes` becomes mandatory.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Passphrase for a protected key: from `env_var` if given, else prompted
/// twice on the terminal.
pub fn read_passphrase(env_var: Option<&str>) -> Result<SecretString, CliError> {
    let pass = if let Some(var) = env_var {
        std::env::var(var).map_err(|_| CliError::Validation {
            field: "passphrase-env".into(),
            reason: format!("environment variable {var} is not set"),
        })?
    } else {
        let first = rpassword::prompt_password("Passphrase: ").map_err(prompt_err)?;
        let second = rpassword::prompt_password("Confirm passphrase: ").map_err(prompt_err)?;
        if first != second {
            return Err(CliError::Validation {
                field: "passphrase".into(),
                reason: "passphrases do not match".into(),
            });
        }
        first
    };

    if pass.is_empty() {
        return Err(CliError::Validation {
            field: "passphrase".into(),
            reason: "passphrase cannot be empty".into(),
        });
    }
    Ok(SecretString::from(pass))
}
