// ── Client record ──

use serde::{Deserialize, Serialize};

use crate::status::LiveClient;

/// Placeholder for a field no source could fill in.
pub const UNKNOWN: &str = "unknown";

/// One client in the reconciled status report.
///
/// Built fresh on every reconciliation and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub name: String,
    pub access_enabled: bool,
    /// Address from the ledger, or [`UNKNOWN`].
    pub assigned_ip: String,
    /// Source address seen by the server, or [`UNKNOWN`].
    pub real_address: String,
    pub is_active: bool,

    // Live-only details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_received: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_sent: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_since: Option<String>,
}

impl ClientRecord {
    /// A disconnected client with nothing known but its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access_enabled: false,
            assigned_ip: UNKNOWN.into(),
            real_address: UNKNOWN.into(),
            is_active: false,
            virtual_ip: None,
            bytes_received: None,
            bytes_sent: None,
            connected_since: None,
        }
    }

    pub fn with_assigned_ip(mut self, ip: impl Into<String>) -> Self {
        self.assigned_ip = ip.into();
        self
    }

    /// Mark the client connected using a live-status entry.
    pub fn apply_live(&mut self, live: &LiveClient) {
        self.is_active = true;
        self.real_address.clone_from(&live.real_address);
        self.virtual_ip.clone_from(&live.virtual_ip);
        self.bytes_received = live.bytes_received;
        self.bytes_sent = live.bytes_sent;
        self.connected_since.clone_from(&live.connected_since);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_inactive_and_unknown() {
        let rec = ClientRecord::new("bob");
        assert_eq!(rec.name, "bob");
        assert!(!rec.access_enabled);
        assert!(!rec.is_active);
        assert_eq!(rec.assigned_ip, UNKNOWN);
        assert_eq!(rec.real_address, UNKNOWN);
    }

    #[test]
    fn apply_live_marks_active_with_address() {
        let mut rec = ClientRecord::new("alice").with_assigned_ip("10.8.0.2");
        rec.apply_live(&LiveClient {
            real_address: "203.0.113.5".into(),
            virtual_ip: Some("10.8.0.2".into()),
            bytes_received: Some(1024),
            bytes_sent: None,
            connected_since: None,
        });

        assert!(rec.is_active);
        assert_eq!(rec.real_address, "203.0.113.5");
        assert_eq!(rec.virtual_ip.as_deref(), Some("10.8.0.2"));
        assert_eq!(rec.bytes_received, Some(1024));
    }

    #[test]
    fn live_details_are_omitted_from_json_when_absent() {
        let json = serde_json::to_value(ClientRecord::new("bob")).unwrap();
        assert!(json.get("virtual_ip").is_none());
        assert_eq!(json["real_address"], "unknown");
    }
}
