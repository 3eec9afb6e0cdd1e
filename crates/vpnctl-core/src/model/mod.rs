// ── Domain model ──
//
// `ClientRecord` is the merged, per-request view of a VPN client. The
// parser outputs (`LedgerEntry`, `LiveClient`) live next to their parsers.

pub mod client;
pub mod name;

pub use client::{ClientRecord, UNKNOWN};
pub use name::ClientName;
