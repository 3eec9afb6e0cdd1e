//! Live-status report parser (OpenVPN `status-version 1`).
//!
//! The report is a sequence of sections introduced by marker lines:
//!
//! ```text
//! OpenVPN CLIENT LIST
//! Updated,Thu Oct 16 12:00:00 2026
//! Common Name,Real Address,Bytes Received,Bytes Sent,Connected Since
//! alice,203.0.113.5:55000,1024,2048,Thu Oct 16 11:58:01 2026
//! ROUTING TABLE
//! Virtual Address,Common Name,Real Address,Last Ref
//! 10.8.0.2,alice,203.0.113.5:55000,Thu Oct 16 11:59:40 2026
//! GLOBAL STATS
//! Max bcast/mcast queue length,0
//! END
//! ```
//!
//! Parsing is a single forward pass that tracks the current section
//! explicitly. The daemon rewrites the file on every connection event, so a
//! read can observe a half-written report: malformed lines are skipped
//! rather than failing the whole parse.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const CLIENT_LIST_MARKER: &str = "OpenVPN CLIENT LIST";
const ROUTING_TABLE_MARKER: &str = "ROUTING TABLE";
const GLOBAL_STATS_MARKER: &str = "GLOBAL STATS";
const END_MARKER: &str = "END";

const CLIENT_HEADERS: &[&str] = &["Updated", "Common Name"];
const ROUTING_HEADERS: &[&str] = &["Virtual Address"];

/// A currently connected client, as seen in the client-list section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveClient {
    /// Source address without the port.
    pub real_address: String,
    /// Filled in only when the routing section lists the client too.
    pub virtual_ip: Option<String>,
    pub bytes_received: Option<u64>,
    pub bytes_sent: Option<u64>,
    pub connected_since: Option<String>,
}

/// Parsed snapshot: connected clients keyed by name, in report order.
pub type LiveStatus = IndexMap<String, LiveClient>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    ClientList,
    RoutingTable,
}

/// Read and parse the status report at `path`.
///
/// Unlike the other sources, an unreadable status file is a hard error:
/// it usually means the daemon is not running.
pub fn read_status(path: &Path) -> Result<LiveStatus, CoreError> {
    let text = std::fs::read_to_string(path).map_err(|source| CoreError::StatusUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let live = parse_status(&text);
    tracing::debug!(path = %path.display(), active = live.len(), "status report loaded");
    Ok(live)
}

/// Parse status report text.
pub fn parse_status(text: &str) -> LiveStatus {
    let mut clients = LiveStatus::new();
    let mut routes: Vec<(String, String)> = Vec::new();
    let mut section = Section::None;

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');

        if line.starts_with(CLIENT_LIST_MARKER) {
            section = Section::ClientList;
            continue;
        }
        if line.starts_with(ROUTING_TABLE_MARKER) {
            section = Section::RoutingTable;
            continue;
        }
        if line.starts_with(GLOBAL_STATS_MARKER) || line.starts_with(END_MARKER) {
            section = Section::None;
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        match section {
            Section::None => {}
            Section::ClientList => {
                if is_header(line, CLIENT_HEADERS) {
                    continue;
                }
                match parse_client_line(line) {
                    Some((name, client)) => {
                        clients.insert(name, client);
                    }
                    None => tracing::debug!(line = lineno + 1, "skipping malformed client line"),
                }
            }
            Section::RoutingTable => {
                if is_header(line, ROUTING_HEADERS) {
                    continue;
                }
                match parse_route_line(line) {
                    Some(route) => routes.push(route),
                    None => tracing::debug!(line = lineno + 1, "skipping malformed route line"),
                }
            }
        }
    }

    // Routes are joined after the pass so section order does not matter.
    for (virtual_ip, name) in routes {
        if let Some(client) = clients.get_mut(&name) {
            client.virtual_ip = Some(virtual_ip);
        }
    }

    clients
}

fn is_header(line: &str, headers: &[&str]) -> bool {
    headers.iter().any(|h| line.starts_with(h))
}

/// `name,real_address:port,bytes_rx,bytes_tx,since`
fn parse_client_line(line: &str) -> Option<(String, LiveClient)> {
    let mut fields = line.split(',');
    let name = fields.next().map(str::trim).filter(|n| !n.is_empty())?;
    let address = fields.next()?.trim();
    let real_address = address
        .split(':')
        .next()
        .map(str::trim)
        .filter(|a| !a.is_empty())?;

    let bytes_received = fields.next().and_then(|v| v.trim().parse().ok());
    let bytes_sent = fields.next().and_then(|v| v.trim().parse().ok());
    let connected_since = fields
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    Some((
        name.into(),
        LiveClient {
            real_address: real_address.into(),
            virtual_ip: None,
            bytes_received,
            bytes_sent,
            connected_since,
        },
    ))
}

/// `virtual_ip,name,real_address,last_ref`
fn parse_route_line(line: &str) -> Option<(String, String)> {
    let mut fields = line.split(',').map(str::trim);
    let virtual_ip = fields.next().filter(|v| !v.is_empty())?;
    let name = fields.next().filter(|n| !n.is_empty())?;
    Some((virtual_ip.into(), name.into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REPORT: &str = "\
OpenVPN CLIENT LIST
Updated,Thu Oct 16 12:00:00 2026
Common Name,Real Address,Bytes Received,Bytes Sent,Connected Since
alice,203.0.113.5:55000,1024,2048,Thu Oct 16 11:58:01 2026
bob,198.51.100.7:41000,10,20,Thu Oct 16 11:30:00 2026
ROUTING TABLE
Virtual Address,Common Name,Real Address,Last Ref
10.8.0.2,alice,203.0.113.5:55000,Thu Oct 16 11:59:40 2026
10.8.0.9,mallory,192.0.2.1:1194,Thu Oct 16 11:59:40 2026
GLOBAL STATS
Max bcast/mcast queue length,0
END
";

    #[test]
    fn parses_clients_and_routes() {
        let live = parse_status(REPORT);
        assert_eq!(live.len(), 2);

        let alice = &live["alice"];
        assert_eq!(alice.real_address, "203.0.113.5");
        assert_eq!(alice.virtual_ip.as_deref(), Some("10.8.0.2"));
        assert_eq!(alice.bytes_received, Some(1024));
        assert_eq!(alice.bytes_sent, Some(2048));
        assert_eq!(
            alice.connected_since.as_deref(),
            Some("Thu Oct 16 11:58:01 2026")
        );

        let bob = &live["bob"];
        assert_eq!(bob.real_address, "198.51.100.7");
        assert_eq!(bob.virtual_ip, None);
    }

    #[test]
    fn preserves_report_order() {
        let names: Vec<_> = parse_status(REPORT).keys().cloned().collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[test]
    fn routing_only_names_are_not_active() {
        let live = parse_status(REPORT);
        assert!(!live.contains_key("mallory"));
    }

    #[test]
    fn header_and_timestamp_lines_are_not_clients() {
        let live = parse_status(REPORT);
        assert!(!live.contains_key("Updated"));
        assert!(!live.contains_key("Common Name"));
    }

    #[test]
    fn routing_section_before_client_section() {
        let text = "\
ROUTING TABLE
10.8.0.2,alice,203.0.113.5:55000,x
OpenVPN CLIENT LIST
alice,203.0.113.5:55000,1,2,x
END
";
        let live = parse_status(text);
        assert_eq!(live["alice"].virtual_ip.as_deref(), Some("10.8.0.2"));
    }

    #[test]
    fn skips_malformed_lines_and_keeps_going() {
        let text = "\
OpenVPN CLIENT LIST
garbage-without-commas
,198.51.100.1:1
carol,:1194
dave,192.0.2.44:5000
ROUTING TABLE
10.8.0.5
10.8.0.6,dave
END
";
        let live = parse_status(text);
        assert_eq!(live.keys().collect::<Vec<_>>(), vec!["dave"]);
        assert_eq!(live["dave"].virtual_ip.as_deref(), Some("10.8.0.6"));
    }

    #[test]
    fn lines_outside_sections_are_ignored() {
        let text = "\
stray,198.51.100.1:1
OpenVPN CLIENT LIST
alice,203.0.113.5:1
GLOBAL STATS
late,198.51.100.2:2
";
        let live = parse_status(text);
        assert_eq!(live.keys().collect::<Vec<_>>(), vec!["alice"]);
    }

    #[test]
    fn truncated_report_keeps_partial_results() {
        let text = "OpenVPN CLIENT LIST\nalice,203.0.113.5:55000,1\nbob,198.51";
        let live = parse_status(text);
        assert_eq!(live["alice"].bytes_received, Some(1));
        assert_eq!(live["alice"].bytes_sent, None);
        assert_eq!(live["bob"].real_address, "198.51");
    }

    #[test]
    fn non_numeric_counters_become_none() {
        let live = parse_status("OpenVPN CLIENT LIST\nalice,203.0.113.5:1,lots,many\n");
        assert_eq!(live["alice"].bytes_received, None);
        assert_eq!(live["alice"].bytes_sent, None);
    }

    #[test]
    fn last_route_wins_for_repeated_names() {
        let text = "\
OpenVPN CLIENT LIST
alice,203.0.113.5:1
ROUTING TABLE
10.8.0.2,alice,203.0.113.5:1,x
10.8.0.22,alice,203.0.113.5:1,x
";
        assert_eq!(
            parse_status(text)["alice"].virtual_ip.as_deref(),
            Some("10.8.0.22")
        );
    }

    #[test]
    fn empty_report_is_valid() {
        assert!(parse_status("").is_empty());
        assert!(parse_status("OpenVPN CLIENT LIST\nEND\n").is_empty());
    }

    #[test]
    fn crlf_report_parses() {
        let text = "OpenVPN CLIENT LIST\r\nalice,203.0.113.5:1\r\nEND\r\n";
        assert_eq!(parse_status(text)["alice"].real_address, "203.0.113.5");
    }

    #[test]
    fn missing_file_is_status_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_status(&dir.path().join("status.log")).unwrap_err();
        assert!(matches!(err, CoreError::StatusUnavailable { .. }));
    }
}
