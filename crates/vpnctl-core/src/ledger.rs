//! IP-assignment ledger (`ifconfig-pool-persist`) reader.
//!
//! One record per line, `name,ip[,...]`. The daemon appends and rewrites
//! this file on its own schedule; we only read it.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Sentinel used by the ledger for a client without an address.
pub const UNASSIGNED_IP: &str = "N/A";

/// One `(name, ip)` record from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub name: String,
    pub ip: String,
}

/// Read and parse the ledger at `path`.
///
/// A missing file is an empty ledger: a fresh server has not assigned
/// any addresses yet.
pub fn read_ledger(path: &Path) -> Result<Vec<LedgerEntry>, CoreError> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let entries = parse_ledger(&text);
            tracing::debug!(path = %path.display(), count = entries.len(), "ledger loaded");
            Ok(entries)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "ledger missing, treating as empty");
            Ok(Vec::new())
        }
        Err(e) => Err(CoreError::io(path, e)),
    }
}

/// Parse ledger text. Never fails: missing fields default to [`UNASSIGNED_IP`].
pub fn parse_ledger(text: &str) -> Vec<LedgerEntry> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut fields = line.split(',').map(str::trim);
            let name = fields.next().filter(|n| !n.is_empty())?;
            let ip = fields
                .next()
                .filter(|ip| !ip.is_empty())
                .unwrap_or(UNASSIGNED_IP);
            Some(LedgerEntry {
                name: name.into(),
                ip: ip.into(),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(name: &str, ip: &str) -> LedgerEntry {
        LedgerEntry {
            name: name.into(),
            ip: ip.into(),
        }
    }

    #[test]
    fn parses_name_and_ip_in_order() {
        let text = "alice,10.8.0.2\nbob,10.8.0.3\n";
        assert_eq!(
            parse_ledger(text),
            vec![entry("alice", "10.8.0.2"), entry("bob", "10.8.0.3")]
        );
    }

    #[test]
    fn ignores_extra_fields_and_whitespace() {
        let text = "  carol , 10.8.0.4 , fd00::4 \n";
        assert_eq!(parse_ledger(text), vec![entry("carol", "10.8.0.4")]);
    }

    #[test]
    fn line_without_comma_defaults_ip() {
        assert_eq!(parse_ledger("dave\n"), vec![entry("dave", UNASSIGNED_IP)]);
        assert_eq!(parse_ledger("erin,\n"), vec![entry("erin", UNASSIGNED_IP)]);
    }

    #[test]
    fn skips_blank_lines_and_empty_names() {
        let text = "\n\nalice,10.8.0.2\n   \n,10.8.0.9\n";
        assert_eq!(parse_ledger(text), vec![entry("alice", "10.8.0.2")]);
    }

    #[test]
    fn keeps_duplicates_for_the_reconciler() {
        let text = "alice,10.8.0.2\nalice,10.8.0.7\n";
        assert_eq!(parse_ledger(text).len(), 2);
    }

    #[test]
    fn handles_crlf_line_endings() {
        assert_eq!(
            parse_ledger("alice,10.8.0.2\r\n"),
            vec![entry("alice", "10.8.0.2")]
        );
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let entries = read_ledger(&dir.path().join("ipp.txt")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipp.txt");
        std::fs::write(&path, "alice,10.8.0.2\n").unwrap();
        assert_eq!(read_ledger(&path).unwrap(), vec![entry("alice", "10.8.0.2")]);
    }

    #[test]
    fn directory_in_place_of_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_ledger(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }
}
