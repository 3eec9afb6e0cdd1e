// ── Manager facade ──
//
// Single entry point for consumers: owns the server configuration and the
// two external capabilities (provisioning, daemon reload) and exposes every
// user-facing operation. Holds no state between calls; each status query
// re-reads the server's files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::access::{AccessAction, AccessFlags, FlagOutcome};
use crate::config::ServerConfig;
use crate::error::CoreError;
use crate::gateway::{KeyProtection, ProvisioningGateway, ShellGateway};
use crate::model::{ClientName, ClientRecord};
use crate::reconcile::Reconciler;
use crate::service::{ServiceControl, SystemdService};

/// Result of the daemon reload that follows a flag change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ReloadOutcome {
    Skipped,
    Reloaded,
    Failed(String),
}

/// Outcome of an access toggle. The flag result stands on its own even
/// when the reload afterwards fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessChange {
    pub name: String,
    pub flag: FlagOutcome,
    pub reload: ReloadOutcome,
}

pub struct Manager<G = ShellGateway, S = SystemdService> {
    config: ServerConfig,
    flags: AccessFlags,
    gateway: G,
    service: S,
}

impl Manager {
    /// Manager wired to the real scripts and reload command in `config`.
    pub fn from_config(config: ServerConfig) -> Self {
        let gateway = ShellGateway::new(&config.issue_script, &config.revoke_script);
        let service = SystemdService::new(config.reload_command.clone());
        Self::new(config, gateway, service)
    }
}

impl<G: ProvisioningGateway, S: ServiceControl> Manager<G, S> {
    pub fn new(config: ServerConfig, gateway: G, service: S) -> Self {
        let flags = AccessFlags::new(&config.ccd_dir);
        Self {
            config,
            flags,
            gateway,
            service,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Reconciled report of every known client.
    pub fn status(&self) -> Result<Vec<ClientRecord>, CoreError> {
        Reconciler::new(&self.config).reconcile()
    }

    /// A single client from the reconciled report.
    pub fn client(&self, name: &str) -> Result<ClientRecord, CoreError> {
        self.status()?
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CoreError::ClientNotFound { name: name.into() })
    }

    pub fn is_enabled(&self, name: &ClientName) -> Result<bool, CoreError> {
        self.flags.is_enabled(name.as_str())
    }

    /// Every access flag on disk, whether or not a client record exists.
    pub fn access_flags(&self) -> Result<Vec<String>, CoreError> {
        self.flags.enabled_names()
    }

    /// Path of an existing credential bundle.
    pub fn bundle_path(&self, name: &ClientName) -> Result<PathBuf, CoreError> {
        let path = self.config.bundle_path(name.as_str());
        if path.is_file() {
            Ok(path)
        } else {
            Err(CoreError::BundleNotFound {
                name: name.to_string(),
                path,
            })
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Flip a client's access flag, then reload the daemon if asked to.
    ///
    /// Errors only if the flag itself could not be changed. A reload
    /// failure is reported in [`AccessChange::reload`].
    pub fn set_access(
        &self,
        name: &ClientName,
        action: AccessAction,
        reload: bool,
    ) -> Result<AccessChange, CoreError> {
        let flag = self.flags.apply(name, action)?;

        let reload = if reload {
            match self.service.reload() {
                Ok(()) => ReloadOutcome::Reloaded,
                Err(e) => ReloadOutcome::Failed(e.to_string()),
            }
        } else {
            ReloadOutcome::Skipped
        };

        Ok(AccessChange {
            name: name.to_string(),
            flag,
            reload,
        })
    }

    pub fn issue(
        &self,
        name: &ClientName,
        protection: &KeyProtection,
    ) -> Result<String, CoreError> {
        self.gateway.issue(name, protection)
    }

    pub fn revoke(&self, name: &ClientName) -> Result<String, CoreError> {
        self.gateway.revoke(name)
    }

    /// Restart the daemon unconditionally.
    pub fn restart(&self) -> Result<(), CoreError> {
        self.service.reload()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::service::MemoryService;

    struct Fixture {
        _dir: tempfile::TempDir,
        config: ServerConfig,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir(root.join("ccd")).unwrap();
        std::fs::create_dir(root.join("clients")).unwrap();
        std::fs::write(root.join("status.log"), "OpenVPN CLIENT LIST\nEND\n").unwrap();

        let config = ServerConfig {
            status_file: root.join("status.log"),
            ledger_file: root.join("ipp.txt"),
            ccd_dir: root.join("ccd"),
            clients_dir: root.join("clients"),
            ..ServerConfig::default()
        };
        Fixture { _dir: dir, config }
    }

    fn name(s: &str) -> ClientName {
        ClientName::new(s).unwrap()
    }

    #[test]
    fn enable_reloads_daemon() {
        let fx = fixture();
        let mgr = Manager::new(fx.config, MemoryGateway::new(), MemoryService::new());

        let change = mgr
            .set_access(&name("alice"), AccessAction::Enable, true)
            .unwrap();
        assert_eq!(change.flag, FlagOutcome::Enabled);
        assert_eq!(change.reload, ReloadOutcome::Reloaded);
        assert_eq!(mgr.service().reloads(), 1);
        assert!(mgr.is_enabled(&name("alice")).unwrap());
    }

    #[test]
    fn reload_failure_keeps_flag_outcome() {
        let fx = fixture();
        let mgr = Manager::new(
            fx.config,
            MemoryGateway::new(),
            MemoryService::failing("sudo: a password is required"),
        );

        let change = mgr
            .set_access(&name("alice"), AccessAction::Enable, true)
            .unwrap();
        assert_eq!(change.flag, FlagOutcome::Enabled);
        assert!(matches!(
            change.reload,
            ReloadOutcome::Failed(ref msg) if msg.contains("password")
        ));
        assert!(mgr.is_enabled(&name("alice")).unwrap());
    }

    #[test]
    fn skipped_reload_does_not_touch_service() {
        let fx = fixture();
        let mgr = Manager::new(fx.config, MemoryGateway::new(), MemoryService::new());

        let change = mgr
            .set_access(&name("bob"), AccessAction::Disable, false)
            .unwrap();
        assert_eq!(change.flag, FlagOutcome::AlreadyDisabled);
        assert_eq!(change.reload, ReloadOutcome::Skipped);
        assert_eq!(mgr.service().reloads(), 0);
    }

    #[test]
    fn client_lookup_finds_provisioned_client() {
        let fx = fixture();
        std::fs::write(fx.config.clients_dir.join("bob.ovpn"), "").unwrap();
        let mgr = Manager::new(fx.config, MemoryGateway::new(), MemoryService::new());

        assert_eq!(mgr.client("bob").unwrap(), ClientRecord::new("bob"));
        assert!(matches!(
            mgr.client("nobody"),
            Err(CoreError::ClientNotFound { .. })
        ));
    }

    #[test]
    fn bundle_path_requires_existing_file() {
        let fx = fixture();
        std::fs::write(fx.config.clients_dir.join("bob.ovpn"), "client\n").unwrap();
        let mgr = Manager::new(fx.config, MemoryGateway::new(), MemoryService::new());

        assert!(mgr.bundle_path(&name("bob")).unwrap().ends_with("bob.ovpn"));
        assert!(matches!(
            mgr.bundle_path(&name("carol")),
            Err(CoreError::BundleNotFound { .. })
        ));
    }

    #[test]
    fn issue_and_revoke_delegate_to_gateway() {
        let fx = fixture();
        let mgr = Manager::new(fx.config, MemoryGateway::new(), MemoryService::new());

        assert_eq!(
            mgr.issue(&name("dave"), &KeyProtection::NoPass).unwrap(),
            "issued dave"
        );
        assert_eq!(mgr.revoke(&name("dave")).unwrap(), "revoked dave");
        assert_eq!(mgr.gateway().revoked(), vec!["dave"]);
    }

    #[test]
    fn access_flags_lists_orphans_too() {
        let fx = fixture();
        std::fs::write(fx.config.ccd_dir.join("ghost"), "").unwrap();
        let mgr = Manager::new(fx.config, MemoryGateway::new(), MemoryService::new());
        mgr.set_access(&name("alice"), AccessAction::Enable, false)
            .unwrap();

        assert_eq!(mgr.access_flags().unwrap(), vec!["alice", "ghost"]);
        assert!(mgr.status().unwrap().is_empty());
    }

    #[test]
    fn restart_uses_service_control() {
        let fx = fixture();
        let mgr = Manager::new(fx.config, MemoryGateway::new(), MemoryService::new());
        mgr.restart().unwrap();
        assert_eq!(mgr.service().reloads(), 1);
    }
}
