use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use log::{debug, error, info};
use shared::models::network::Network;
use shared::models::staker::{StakerParams, StakerRole, UserSettings};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::error::StakerError;
use crate::params;
use crate::ports::{ComposeEditor, PackageRuntime, SelectionStore};
use crate::registry::{CompatibilityRegistry, CompatibleClient};
use crate::settings::build_user_settings;

/// Switch orchestrator: validates a requested implementation against the
/// compatibility registry, applies the transition against the container
/// runtime and records the outcome in the selection store.
///
/// Transition steps run strictly in sequence and a failed step aborts the
/// rest without rolling back steps already applied; divergence is repaired
/// by the next reconciliation pass. At most one switch per (role, network)
/// may run at a time, enforced by a per-key guard.
pub struct SwitchOrchestrator {
    registry: Arc<CompatibilityRegistry>,
    runtime: Arc<dyn PackageRuntime>,
    compose: Arc<dyn ComposeEditor>,
    store: Arc<dyn SelectionStore>,
    switch_locks: StdMutex<HashMap<(StakerRole, Network), Arc<AsyncMutex<()>>>>,
}

impl SwitchOrchestrator {
    pub fn new(
        registry: Arc<CompatibilityRegistry>,
        runtime: Arc<dyn PackageRuntime>,
        compose: Arc<dyn ComposeEditor>,
        store: Arc<dyn SelectionStore>,
    ) -> Self {
        Self {
            registry,
            runtime,
            compose,
            store,
            switch_locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Select a new implementation for a role on a network, or deselect with
    /// `None`. The requested package must match the registry's designated
    /// implementation; requesting a package on an unsupported combination
    /// fails before any runtime mutation.
    pub async fn set_new(
        &self,
        role: StakerRole,
        network: Network,
        new_dnp_name: Option<&str>,
        role_params: &StakerParams,
    ) -> Result<(), StakerError> {
        let compatible = self.registry.lookup(role, network);

        let target = match new_dnp_name {
            Some(requested) => {
                let Some(client) = compatible else {
                    return Err(StakerError::UnsupportedCombination { role, network });
                };
                if requested != client.dnp_name {
                    return Err(StakerError::CompatibilityMismatch {
                        requested: requested.to_string(),
                        expected: client.dnp_name.clone(),
                    });
                }
                let settings =
                    build_user_settings(client.service_name(), network, Some(role_params));
                Some((client, settings))
            }
            None => None,
        };

        let _guard = self.switch_guard(role, network)?;

        info!(
            "Switching {} on {} to {}",
            role,
            network,
            new_dnp_name.unwrap_or("none")
        );

        let prev = compatible.map(|client| client.dnp_name.as_str());
        let docker_network = params::docker_staker_network(network);
        self.execute_switch(
            &docker_network,
            prev,
            target.as_ref().map(|(client, settings)| (*client, settings)),
        )
        .await?;

        // Write the flag only when it actually changes.
        let selected = new_dnp_name.is_some();
        let stored = self
            .store
            .get(role, network)
            .await
            .map_err(StakerError::Persistence)?;
        if stored != selected {
            self.store
                .set(role, network, selected)
                .await
                .map_err(StakerError::Persistence)?;
        }
        Ok(())
    }

    /// Generic transition: uninstall the previous implementation first, then
    /// install the new one or re-apply its user settings when it is already
    /// installed.
    pub(crate) async fn execute_switch(
        &self,
        docker_network: &str,
        prev: Option<&str>,
        new: Option<(&CompatibleClient, &UserSettings)>,
    ) -> Result<(), StakerError> {
        let new_name = new.map(|(client, _)| client.dnp_name.as_str());

        if let Some(prev) = prev {
            if new_name != Some(prev) {
                let installed = self
                    .runtime
                    .list_package(prev)
                    .await
                    .map_err(StakerError::RuntimeOperation)?;
                if installed.is_some() {
                    info!("Uninstalling previous implementation {}", prev);
                    self.runtime
                        .uninstall(prev)
                        .await
                        .map_err(StakerError::RuntimeOperation)?;
                }
            }
        }

        if let Some((client, settings)) = new {
            let installed = self
                .runtime
                .list_package(&client.dnp_name)
                .await
                .map_err(StakerError::RuntimeOperation)?;
            match installed {
                Some(_) => {
                    debug!(
                        "{} already installed, re-applying user settings",
                        client.dnp_name
                    );
                    self.compose
                        .write_user_settings(&client.dnp_name, settings)
                        .await
                        .map_err(StakerError::Compose)?;
                }
                None => {
                    info!("Installing {} on {}", client.dnp_name, docker_network);
                    // The compose override is the persisted settings source
                    // the state reader depends on, fresh install included.
                    self.compose
                        .write_user_settings(&client.dnp_name, settings)
                        .await
                        .map_err(StakerError::Compose)?;
                    self.runtime
                        .install(&client.dnp_name, docker_network, settings)
                        .await
                        .map_err(StakerError::RuntimeOperation)?;
                }
            }
        }

        Ok(())
    }

    /// Drift repair: force the selection flag to match whether the
    /// registry's designated implementation is installed with at least one
    /// running container, re-applying its current user settings over a
    /// rebuilt network section when it is. This is the only drift-correction
    /// path; it runs on process start.
    pub async fn persist_if_installed_and_running(
        &self,
        role: StakerRole,
        network: Network,
    ) -> Result<(), StakerError> {
        let Some(client) = self.registry.lookup(role, network) else {
            return Ok(());
        };

        let package = self
            .runtime
            .list_package(&client.dnp_name)
            .await
            .map_err(StakerError::RuntimeOperation)?;
        let running = package.as_ref().is_some_and(|p| p.any_running());

        if !running {
            self.store
                .set(role, network, false)
                .await
                .map_err(StakerError::Persistence)?;
            return Ok(());
        }

        // Heal the network section from the fixed alias scheme but keep the
        // environment the user configured; reconciliation must never lose it.
        let current = self
            .compose
            .read_user_settings(&client.dnp_name)
            .await
            .map_err(StakerError::Compose)?;
        let healed = UserSettings {
            environment: current.environment,
            networks: build_user_settings(client.service_name(), network, None).networks,
        };
        self.compose
            .write_user_settings(&client.dnp_name, &healed)
            .await
            .map_err(StakerError::Compose)?;
        self.store
            .set(role, network, true)
            .await
            .map_err(StakerError::Persistence)?;
        Ok(())
    }

    /// Reconcile every role on the given networks. A single candidate's
    /// failure is logged and does not abort the others.
    pub async fn reconcile_all(&self, networks: &[Network]) {
        for network in networks {
            for role in StakerRole::ALL {
                match self.persist_if_installed_and_running(role, *network).await {
                    Ok(()) => debug!("Reconciled {} on {}", role, network),
                    Err(e) => error!("Failed to reconcile {} on {}: {}", role, network, e),
                }
            }
        }
    }

    fn switch_guard(
        &self,
        role: StakerRole,
        network: Network,
    ) -> Result<OwnedMutexGuard<()>, StakerError> {
        let lock = self
            .switch_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((role, network))
            .or_default()
            .clone();
        lock.try_lock_owned()
            .map_err(|_| StakerError::ConcurrentSwitch { role, network })
    }
}
