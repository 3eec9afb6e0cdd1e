//! Status reconciliation.
//!
//! Merges the ledger, the live-status snapshot, the provisioned bundles and
//! the access flags into one ordered report with exactly one record per
//! client name. Nothing is cached: every call re-reads every source.
//!
//! Record order is ledger order, then provisioned-only clients in scan
//! order, then (with [`LiveOnlyPolicy::Include`]) live-only clients in feed
//! order. A name seen again in a later source updates its record in place.

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::access::AccessFlags;
use crate::config::{LiveOnlyPolicy, ServerConfig};
use crate::error::CoreError;
use crate::ledger::{LedgerEntry, read_ledger};
use crate::model::ClientRecord;
use crate::provisioned::scan_provisioned;
use crate::status::{LiveStatus, read_status};

/// Reads every source described by a [`ServerConfig`] and merges them.
#[derive(Debug, Clone)]
pub struct Reconciler<'a> {
    config: &'a ServerConfig,
    flags: AccessFlags,
}

impl<'a> Reconciler<'a> {
    pub fn new(config: &'a ServerConfig) -> Self {
        Self {
            config,
            flags: AccessFlags::new(&config.ccd_dir),
        }
    }

    /// Build the full client report.
    ///
    /// Fails with [`CoreError::StatusUnavailable`] when the status report
    /// cannot be read; a missing ledger or clients directory is empty.
    pub fn reconcile(&self) -> Result<Vec<ClientRecord>, CoreError> {
        let live = read_status(&self.config.status_file)?;
        let ledger = read_ledger(&self.config.ledger_file)?;
        let provisioned =
            scan_provisioned(&self.config.clients_dir, &self.config.bundle_extension)?;

        let records = reconcile_sources(
            &ledger,
            &live,
            &provisioned,
            |name| self.flags.is_enabled(name),
            self.config.live_only,
        )?;

        tracing::debug!(
            ledger = ledger.len(),
            live = live.len(),
            provisioned = provisioned.len(),
            total = records.len(),
            "reconciled client report"
        );
        Ok(records)
    }
}

/// Merge already-parsed sources.
///
/// `is_enabled` is queried once per record in the final pass, so a flag
/// toggled while the sources were being read is still reflected.
pub fn reconcile_sources<F>(
    ledger: &[LedgerEntry],
    live: &LiveStatus,
    provisioned: &[String],
    mut is_enabled: F,
    policy: LiveOnlyPolicy,
) -> Result<Vec<ClientRecord>, CoreError>
where
    F: FnMut(&str) -> Result<bool, CoreError>,
{
    let mut records: IndexMap<String, ClientRecord> = IndexMap::new();

    // 1. Ledger: historical order, last ip wins for repeated names.
    for entry in ledger {
        match records.entry(entry.name.clone()) {
            Entry::Occupied(mut slot) => slot.get_mut().assigned_ip.clone_from(&entry.ip),
            Entry::Vacant(slot) => {
                slot.insert(ClientRecord::new(&entry.name).with_assigned_ip(&entry.ip));
            }
        }
    }

    // 2. Live overlay on known names only.
    for (name, client) in live {
        if let Some(record) = records.get_mut(name) {
            record.apply_live(client);
        }
    }

    // 3. Provisioned clients never seen in the ledger.
    for name in provisioned {
        records
            .entry(name.clone())
            .or_insert_with(|| ClientRecord::new(name));
    }

    let unknown_live: Vec<&String> = live
        .keys()
        .filter(|name| !records.contains_key(name.as_str()))
        .collect();
    match policy {
        LiveOnlyPolicy::Ignore => {
            for name in &unknown_live {
                tracing::warn!(
                    name = %name,
                    "connected client has no ledger entry or bundle; omitted from report"
                );
            }
        }
        LiveOnlyPolicy::Include => {
            for name in unknown_live {
                records.insert(name.clone(), ClientRecord::new(name));
            }
        }
    }

    // 4. Final pass: fresh access flags and an unconditional live overlay.
    for (name, record) in &mut records {
        record.access_enabled = is_enabled(name.as_str())?;
        if let Some(client) = live.get(name) {
            record.apply_live(client);
        }
    }

    Ok(records.into_values().collect())
}
