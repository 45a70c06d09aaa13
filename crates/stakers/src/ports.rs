//! Collaborator boundary of the orchestration engine. The installer/runtime
//! driver, the compose-file editor and the key-value persistence layer are
//! external; the engine only sees these traits.

use anyhow::Result;
use async_trait::async_trait;
use shared::models::network::Network;
use shared::models::staker::{StakerRole, UserSettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageContainer {
    pub name: String,
    pub running: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub dnp_name: String,
    pub version: String,
    pub containers: Vec<PackageContainer>,
}

impl InstalledPackage {
    pub fn any_running(&self) -> bool {
        self.containers.iter().any(|container| container.running)
    }
}

/// Installer/runtime driver: resolves a package name to running containers.
#[async_trait]
pub trait PackageRuntime: Send + Sync {
    async fn list_package(&self, dnp_name: &str) -> Result<Option<InstalledPackage>>;

    /// Install and start a package, applying the given compose-override
    /// payload and attaching it to the target staker docker network. The
    /// driver resolves the version to deploy; the engine only compares the
    /// installed version against the compatibility floor when reading state.
    async fn install(
        &self,
        dnp_name: &str,
        docker_network: &str,
        settings: &UserSettings,
    ) -> Result<()>;

    async fn uninstall(&self, dnp_name: &str) -> Result<()>;
}

/// Reads and writes a package's on-disk compose override. Format and
/// location are its own concern.
#[async_trait]
pub trait ComposeEditor: Send + Sync {
    async fn read_user_settings(&self, dnp_name: &str) -> Result<UserSettings>;

    async fn write_user_settings(&self, dnp_name: &str, settings: &UserSettings) -> Result<()>;
}

/// Durable boolean selection flag per (role, network). Last write wins; the
/// switch orchestrator is the only writer under normal operation.
#[async_trait]
pub trait SelectionStore: Send + Sync {
    async fn get(&self, role: StakerRole, network: Network) -> Result<bool>;

    async fn set(&self, role: StakerRole, network: Network, value: bool) -> Result<()>;
}
