// ── Client names ──
//
// A client name ends up as a filename in the ccd and clients directories
// and as an argument to the provisioning scripts. `ClientName` is the only
// way into those operations, so a name like `../passwd` never reaches I/O.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const MAX_LEN: usize = 64;

/// A client name that is safe to use as a filename and script argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientName(String);

impl ClientName {
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        validate_client_name(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check `name` against the allowed character set.
fn validate_client_name(name: &str) -> Result<(), CoreError> {
    let reject = |reason: &str| {
        Err(CoreError::InvalidClientName {
            name: name.into(),
            reason: reason.into(),
        })
    };

    if name.is_empty() {
        return reject("name is empty");
    }
    if name.len() > MAX_LEN {
        return reject("name is longer than 64 bytes");
    }
    if name.starts_with('.') || name.starts_with('-') {
        return reject("name must not start with '.' or '-'");
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '@')))
    {
        return reject(&format!("character {bad:?} is not allowed"));
    }
    Ok(())
}

impl fmt::Display for ClientName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ClientName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ClientName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ClientName {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ClientName> for String {
    fn from(name: ClientName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_names() {
        for name in ["alice", "bob-laptop", "ops_team.2", "carol@home"] {
            assert!(ClientName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_path_traversal() {
        for name in ["../etc/passwd", "a/b", "..", ".hidden", "-rf", ""] {
            assert!(
                matches!(
                    ClientName::new(name),
                    Err(CoreError::InvalidClientName { .. })
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_overlong_names() {
        let long = "a".repeat(65);
        assert!(ClientName::new(long).is_err());
        assert!(ClientName::new("a".repeat(64)).is_ok());
    }

    #[test]
    fn rejects_whitespace_and_shell_metacharacters() {
        for name in ["has space", "semi;colon", "$(id)", "tab\tname"] {
            assert!(ClientName::new(name).is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn displays_as_plain_string() {
        let name: ClientName = "alice".parse().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(name.to_string(), "alice");
        assert_eq!(name.as_str(), "alice");
    }
}
