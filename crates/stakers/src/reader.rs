use std::sync::Arc;

use shared::models::network::Network;
use shared::models::staker::{ObservedStatus, StakerItem, StakerRole};

use crate::error::StakerError;
use crate::ports::{ComposeEditor, PackageRuntime, SelectionStore};
use crate::registry::{version_gte, CompatibilityRegistry};

/// Read-side of the orchestration engine: reconciles the container runtime,
/// the persisted selection flag and the live compose override into one
/// observed view. Every call re-queries the sources; nothing is cached
/// because the underlying state can change out-of-band.
pub struct StateReader {
    registry: Arc<CompatibilityRegistry>,
    runtime: Arc<dyn PackageRuntime>,
    compose: Arc<dyn ComposeEditor>,
    store: Arc<dyn SelectionStore>,
}

impl StateReader {
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
        }
    }

    /// All candidate implementations of a role on a network. An unsupported
    /// (role, network) combination yields an empty sequence, not an error.
    pub async fn get_all(
        &self,
        role: StakerRole,
        network: Network,
    ) -> Result<Vec<StakerItem>, StakerError> {
        let Some(client) = self.registry.lookup(role, network) else {
            return Ok(Vec::new());
        };

        let is_selected = self
            .store
            .get(role, network)
            .await
            .map_err(StakerError::Persistence)?;
        let package = self
            .runtime
            .list_package(&client.dnp_name)
            .await
            .map_err(StakerError::RuntimeOperation)?;

        let (is_installed, is_running, is_updated) = match &package {
            Some(package) => (
                true,
                package.any_running(),
                version_gte(&package.version, &client.min_version),
            ),
            None => (false, false, false),
        };

        let relays = if role == StakerRole::MevBoost {
            Some(self.current_relays(network).await?)
        } else {
            None
        };

        Ok(vec![StakerItem {
            dnp_name: client.dnp_name.clone(),
            is_installed,
            is_running,
            is_selected,
            is_updated,
            relays,
        }])
    }

    /// MEV-boost extra: relays currently configured on the installed
    /// package, read from its live compose override rather than from the
    /// persisted flag. Empty when the role is unsupported on the network or
    /// the package is not installed.
    pub async fn current_relays(&self, network: Network) -> Result<Vec<String>, StakerError> {
        let Some(client) = self.registry.lookup(StakerRole::MevBoost, network) else {
            return Ok(Vec::new());
        };
        let installed = self
            .runtime
            .list_package(&client.dnp_name)
            .await
            .map_err(StakerError::RuntimeOperation)?;
        if installed.is_none() {
            return Ok(Vec::new());
        }

        let settings = self
            .compose
            .read_user_settings(&client.dnp_name)
            .await
            .map_err(StakerError::Compose)?;
        let relays = settings
            .environment
            .get(client.service_name())
            .and_then(|vars| vars.get("RELAYS"))
            .map(|value| {
                value
                    .split(',')
                    .filter(|relay| !relay.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(relays)
    }

    /// Reconciled pair of runtime observation and persisted intent. A
    /// running-but-unselected or selected-but-stopped pair is reported
    /// as-is, never silently resolved.
    pub async fn observed_status(
        &self,
        role: StakerRole,
        network: Network,
    ) -> Result<ObservedStatus, StakerError> {
        let selected = self
            .store
            .get(role, network)
            .await
            .map_err(StakerError::Persistence)?;

        let running = match self.registry.lookup(role, network) {
            Some(client) => self
                .runtime
                .list_package(&client.dnp_name)
                .await
                .map_err(StakerError::RuntimeOperation)?
                .filter(|package| package.any_running())
                .map(|package| package.dnp_name),
            None => None,
        };

        Ok(ObservedStatus { running, selected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::build_user_settings;
    use crate::test_utils::{FakeComposeEditor, FakeRuntime, FakeSelectionStore};
    use shared::models::staker::StakerParams;

    const MEV_BOOST: &str = "mev-boost.dnp.dappnode.eth";

    fn reader(
        runtime: FakeRuntime,
        compose: FakeComposeEditor,
        store: FakeSelectionStore,
    ) -> StateReader {
        StateReader::new(
            Arc::new(CompatibilityRegistry::dappnode_defaults()),
            Arc::new(runtime),
            Arc::new(compose),
            Arc::new(store),
        )
    }

    #[tokio::test]
    async fn test_unsupported_combination_yields_empty_sequence() {
        let reader = reader(
            FakeRuntime::new(),
            FakeComposeEditor::new(),
            FakeSelectionStore::new(),
        );
        let items = reader
            .get_all(StakerRole::MevBoost, Network::Gnosis)
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_get_all_reports_installed_running_selected() {
        let params = StakerParams::MevBoost {
            relays: vec!["https://relay-a".to_string(), "https://relay-b".to_string()],
        };
        let reader = reader(
            FakeRuntime::new().with_running_package(MEV_BOOST, "0.1.2"),
            FakeComposeEditor::new().with_settings(
                MEV_BOOST,
                build_user_settings("mev-boost", Network::Mainnet, Some(&params)),
            ),
            FakeSelectionStore::new().with_flag(StakerRole::MevBoost, Network::Mainnet, true),
        );

        let items = reader
            .get_all(StakerRole::MevBoost, Network::Mainnet)
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.dnp_name, MEV_BOOST);
        assert!(item.is_installed);
        assert!(item.is_running);
        assert!(item.is_selected);
        assert!(item.is_updated);
        assert_eq!(
            item.relays.as_deref(),
            Some(&["https://relay-a".to_string(), "https://relay-b".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_get_all_reports_outdated_version() {
        let reader = reader(
            FakeRuntime::new().with_running_package("prysm.dnp.dappnode.eth", "2.0.0"),
            FakeComposeEditor::new(),
            FakeSelectionStore::new(),
        );
        let items = reader
            .get_all(StakerRole::Consensus, Network::Mainnet)
            .await
            .unwrap();
        // registry minimum for mainnet prysm is 3.0.4
        assert!(items[0].is_installed);
        assert!(!items[0].is_updated);
    }

    #[tokio::test]
    async fn test_current_relays_empty_when_not_installed() {
        let reader = reader(
            FakeRuntime::new(),
            FakeComposeEditor::new(),
            FakeSelectionStore::new(),
        );
        let relays = reader.current_relays(Network::Mainnet).await.unwrap();
        assert!(relays.is_empty());
    }

    #[tokio::test]
    async fn test_current_relays_empty_when_unsupported() {
        let reader = reader(
            FakeRuntime::new(),
            FakeComposeEditor::new(),
            FakeSelectionStore::new(),
        );
        let relays = reader.current_relays(Network::Gnosis).await.unwrap();
        assert!(relays.is_empty());
    }

    #[tokio::test]
    async fn test_observed_status_reports_drift_as_is() {
        // Flag says selected, runtime has no containers: report, not resolve.
        let reader = reader(
            FakeRuntime::new(),
            FakeComposeEditor::new(),
            FakeSelectionStore::new().with_flag(StakerRole::MevBoost, Network::Mainnet, true),
        );
        let status = reader
            .observed_status(StakerRole::MevBoost, Network::Mainnet)
            .await
            .unwrap();
        assert_eq!(status.running, None);
        assert!(status.selected);
    }

    #[tokio::test]
    async fn test_observed_status_stopped_package_is_not_running() {
        let reader = reader(
            FakeRuntime::new().with_stopped_package(MEV_BOOST, "0.1.0"),
            FakeComposeEditor::new(),
            FakeSelectionStore::new(),
        );
        let status = reader
            .observed_status(StakerRole::MevBoost, Network::Mainnet)
            .await
            .unwrap();
        assert_eq!(status.running, None);
        assert!(!status.selected);
    }
}
