//! Client management core for a single OpenVPN server.
//!
//! The server's state lives in files owned by the daemon and by the
//! provisioning tooling. This crate reads them, merges them, and performs
//! the few mutations an operator needs:
//!
//! - **[`Reconciler`]** — merges the IP-assignment ledger ([`ledger`]), the
//!   live status report ([`status`]), the issued bundles ([`provisioned`])
//!   and the access flags ([`access`]) into one [`ClientRecord`] per client.
//!
//! - **[`AccessFlags`]** — per-client access toggles, one file per enabled
//!   client in the client-config directory.
//!
//! - **[`ProvisioningGateway`]** / **[`ServiceControl`]** — capabilities over
//!   the external issue/revoke scripts and the daemon reload, each with a
//!   subprocess implementation and an in-memory one.
//!
//! - **[`Manager`]** — facade tying the above to a [`ServerConfig`].
//!
//! Everything is synchronous and stateless between calls.

pub mod access;
pub mod config;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod manager;
pub mod model;
pub mod provisioned;
pub mod reconcile;
pub mod service;
pub mod status;

// ── Primary re-exports ──────────────────────────────────────────────
pub use access::{AccessAction, AccessFlags, FlagOutcome};
pub use config::{LiveOnlyPolicy, ServerConfig};
pub use error::CoreError;
pub use gateway::{KeyProtection, MemoryGateway, ProvisioningGateway, ShellGateway};
pub use ledger::{LedgerEntry, UNASSIGNED_IP};
pub use manager::{AccessChange, Manager, ReloadOutcome};
pub use model::{ClientName, ClientRecord, UNKNOWN};
pub use reconcile::{Reconciler, reconcile_sources};
pub use service::{MemoryService, ServiceControl, SystemdService};
pub use status::{LiveClient, LiveStatus};
