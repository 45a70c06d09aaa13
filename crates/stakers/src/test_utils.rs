//! In-memory fakes for the collaborator ports, shared by the engine and
//! reader unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use shared::models::network::Network;
use shared::models::staker::{StakerRole, UserSettings};

use crate::ports::{ComposeEditor, InstalledPackage, PackageContainer, PackageRuntime,
    SelectionStore};

#[derive(Default)]
pub(crate) struct FakeRuntime {
    pub packages: Mutex<HashMap<String, InstalledPackage>>,
    /// Mutating calls in dispatch order, e.g. "uninstall x.dnp.dappnode.eth".
    pub calls: Mutex<Vec<String>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_running_package(self, dnp_name: &str, version: &str) -> Self {
        self.packages.lock().unwrap().insert(
            dnp_name.to_string(),
            running_package(dnp_name, version),
        );
        self
    }

    pub fn with_stopped_package(self, dnp_name: &str, version: &str) -> Self {
        let mut package = running_package(dnp_name, version);
        for container in &mut package.containers {
            container.running = false;
        }
        self.packages
            .lock()
            .unwrap()
            .insert(dnp_name.to_string(), package);
        self
    }

    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

pub(crate) fn running_package(dnp_name: &str, version: &str) -> InstalledPackage {
    InstalledPackage {
        dnp_name: dnp_name.to_string(),
        version: version.to_string(),
        containers: vec![PackageContainer {
            name: format!("DAppNodePackage-{}", dnp_name),
            running: true,
        }],
    }
}

#[async_trait]
impl PackageRuntime for FakeRuntime {
    async fn list_package(&self, dnp_name: &str) -> Result<Option<InstalledPackage>> {
        Ok(self.packages.lock().unwrap().get(dnp_name).cloned())
    }

    async fn install(
        &self,
        dnp_name: &str,
        _docker_network: &str,
        _settings: &UserSettings,
    ) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("install {}", dnp_name));
        self.packages
            .lock()
            .unwrap()
            .insert(dnp_name.to_string(), running_package(dnp_name, "0.1.0"));
        Ok(())
    }

    async fn uninstall(&self, dnp_name: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("uninstall {}", dnp_name));
        self.packages.lock().unwrap().remove(dnp_name);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeComposeEditor {
    pub files: Mutex<HashMap<String, UserSettings>>,
}

impl FakeComposeEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(self, dnp_name: &str, settings: UserSettings) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(dnp_name.to_string(), settings);
        self
    }

    pub fn stored_settings(&self, dnp_name: &str) -> Option<UserSettings> {
        self.files.lock().unwrap().get(dnp_name).cloned()
    }
}

#[async_trait]
impl ComposeEditor for FakeComposeEditor {
    async fn read_user_settings(&self, dnp_name: &str) -> Result<UserSettings> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .get(dnp_name)
            .cloned()
            .unwrap_or_default())
    }

    async fn write_user_settings(&self, dnp_name: &str, settings: &UserSettings) -> Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(dnp_name.to_string(), settings.clone());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeSelectionStore {
    pub flags: Mutex<HashMap<(StakerRole, Network), bool>>,
    pub write_count: Mutex<usize>,
}

impl FakeSelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(self, role: StakerRole, network: Network, value: bool) -> Self {
        self.flags.lock().unwrap().insert((role, network), value);
        self
    }

    pub fn flag(&self, role: StakerRole, network: Network) -> bool {
        self.flags
            .lock()
            .unwrap()
            .get(&(role, network))
            .copied()
            .unwrap_or(false)
    }

    pub fn writes(&self) -> usize {
        *self.write_count.lock().unwrap()
    }
}

#[async_trait]
impl SelectionStore for FakeSelectionStore {
    async fn get(&self, role: StakerRole, network: Network) -> Result<bool> {
        Ok(self.flag(role, network))
    }

    async fn set(&self, role: StakerRole, network: Network, value: bool) -> Result<()> {
        self.flags.lock().unwrap().insert((role, network), value);
        *self.write_count.lock().unwrap() += 1;
        Ok(())
    }
}
