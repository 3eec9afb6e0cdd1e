//! Scanner for issued credential bundles (`<name>.<ext>`).

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::CoreError;

/// List the names of all clients with a bundle in `dir`.
///
/// Names are distinct and sorted; directory iteration order is not stable
/// across filesystems. A missing directory means nothing was issued yet.
pub fn scan_provisioned(dir: &Path, extension: &str) -> Result<Vec<String>, CoreError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %dir.display(), "clients directory missing");
            return Ok(Vec::new());
        }
        Err(e) => return Err(CoreError::io(dir, e)),
    };

    let mut names = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            if !stem.is_empty() {
                names.insert(stem.to_owned());
            }
        }
    }

    tracing::debug!(path = %dir.display(), count = names.len(), "provisioned clients scanned");
    Ok(names.into_iter().collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn strips_extension_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["zoe.ovpn", "bob.ovpn", "alice.ovpn"] {
            fs::write(dir.path().join(file), "client\n").unwrap();
        }
        assert_eq!(
            scan_provisioned(dir.path(), "ovpn").unwrap(),
            vec!["alice", "bob", "zoe"]
        );
    }

    #[test]
    fn ignores_other_extensions_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("alice.ovpn"), "").unwrap();
        fs::write(dir.path().join("alice.key"), "").unwrap();
        fs::write(dir.path().join("README"), "").unwrap();
        fs::create_dir(dir.path().join("nested.ovpn")).unwrap();
        assert_eq!(scan_provisioned(dir.path(), "ovpn").unwrap(), vec!["alice"]);
    }

    #[test]
    fn keeps_inner_dots_in_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ops.team.ovpn"), "").unwrap();
        assert_eq!(
            scan_provisioned(dir.path(), "ovpn").unwrap(),
            vec!["ops.team"]
        );
    }

    #[test]
    fn honors_custom_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bob.cred"), "").unwrap();
        fs::write(dir.path().join("alice.ovpn"), "").unwrap();
        assert_eq!(scan_provisioned(dir.path(), "cred").unwrap(), vec!["bob"]);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(
            scan_provisioned(&dir.path().join("clients"), "ovpn")
                .unwrap()
                .is_empty()
        );
    }
}
