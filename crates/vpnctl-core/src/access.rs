//! Access-flag store backed by the OpenVPN client-config directory.
//!
//! A client may connect iff a file with its exact name exists in the
//! directory. The daemon reads the same directory, so the file is the
//! source of truth; its contents are ignored here and never overwritten.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CoreError;
use crate::model::ClientName;

/// Requested change to a client's access flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccessAction {
    Enable,
    Disable,
}

/// What a flag mutation actually did on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FlagOutcome {
    Enabled,
    AlreadyEnabled,
    Disabled,
    AlreadyDisabled,
}

#[derive(Debug, Clone)]
pub struct AccessFlags {
    dir: PathBuf,
}

impl AccessFlags {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn flag_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Whether `name` currently has access.
    ///
    /// `name` comes from the ledger or status feed as-is, so any single path
    /// component is looked up (spaces, leading dots). Names that cannot be
    /// one, such as `..` or anything containing `/`, are never enabled.
    pub fn is_enabled(&self, name: &str) -> Result<bool, CoreError> {
        if !is_single_component(name) {
            return Ok(false);
        }
        let path = self.flag_path(name);
        match std::fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CoreError::io(path, e)),
        }
    }

    /// Create the flag file. Existing files are left untouched.
    pub fn enable(&self, name: &ClientName) -> Result<FlagOutcome, CoreError> {
        let path = self.flag_path(name.as_str());
        let result = OpenOptions::new().write(true).create_new(true).open(&path);
        match result {
            Ok(_) => {
                tracing::info!(name = %name, path = %path.display(), "client access enabled");
                Ok(FlagOutcome::Enabled)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!(name = %name, "client access already enabled");
                Ok(FlagOutcome::AlreadyEnabled)
            }
            Err(source) => Err(CoreError::AccessFlag {
                name: name.to_string(),
                action: "enable",
                source,
            }),
        }
    }

    /// Remove the flag file. An absent file means "already disabled".
    pub fn disable(&self, name: &ClientName) -> Result<FlagOutcome, CoreError> {
        let path = self.flag_path(name.as_str());
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(name = %name, path = %path.display(), "client access disabled");
                Ok(FlagOutcome::Disabled)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(name = %name, "client access already disabled");
                Ok(FlagOutcome::AlreadyDisabled)
            }
            Err(source) => Err(CoreError::AccessFlag {
                name: name.to_string(),
                action: "disable",
                source,
            }),
        }
    }

    pub fn apply(&self, name: &ClientName, action: AccessAction) -> Result<FlagOutcome, CoreError> {
        match action {
            AccessAction::Enable => self.enable(name),
            AccessAction::Disable => self.disable(name),
        }
    }

    /// Sorted names of all clients that currently have a flag file.
    pub fn enabled_names(&self) -> Result<Vec<String>, CoreError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CoreError::io(&self.dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::io(&self.dir, e))?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

fn is_single_component(name: &str) -> bool {
    !matches!(name, "" | "." | "..") && !name.contains(['/', '\0'])
}
