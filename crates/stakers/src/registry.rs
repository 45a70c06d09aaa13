use std::collections::HashMap;

use shared::models::network::Network;
use shared::models::staker::StakerRole;

/// Sole supported implementation of a role on a network, fixed at process
/// start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibleClient {
    pub dnp_name: String,
    pub min_version: String,
}

impl CompatibleClient {
    pub fn new(dnp_name: &str, min_version: &str) -> Self {
        Self {
            dnp_name: dnp_name.to_string(),
            min_version: min_version.to_string(),
        }
    }

    /// Compose service name: the first dot-separated label of the package
    /// name, e.g. "mev-boost" for "mev-boost.dnp.dappnode.eth".
    pub fn service_name(&self) -> &str {
        self.dnp_name.split('.').next().unwrap_or(&self.dnp_name)
    }
}

/// Static mapping of which package implements a role on each network. A
/// missing entry is a valid value meaning the role is unsupported there,
/// not an error.
pub struct CompatibilityRegistry {
    table: HashMap<(StakerRole, Network), CompatibleClient>,
}

impl CompatibilityRegistry {
    pub fn new(entries: Vec<(StakerRole, Network, CompatibleClient)>) -> Self {
        let table = entries
            .into_iter()
            .map(|(role, network, client)| ((role, network), client))
            .collect();
        Self { table }
    }

    pub fn lookup(&self, role: StakerRole, network: Network) -> Option<&CompatibleClient> {
        self.table.get(&(role, network))
    }

    /// Default dappnode compatibility tables. MEV-boost has no supported
    /// implementation on Gnosis or Lukso.
    pub fn dappnode_defaults() -> Self {
        use Network::*;
        use StakerRole::*;

        Self::new(vec![
            (
                Execution,
                Mainnet,
                CompatibleClient::new("geth.dnp.dappnode.eth", "0.1.0"),
            ),
            (
                Execution,
                Gnosis,
                CompatibleClient::new("nethermind-xdai.dnp.dappnode.eth", "1.0.0"),
            ),
            (
                Execution,
                Prater,
                CompatibleClient::new("goerli-geth.dnp.dappnode.eth", "0.4.26"),
            ),
            (
                Execution,
                Holesky,
                CompatibleClient::new("holesky-geth.dnp.dappnode.eth", "0.1.0"),
            ),
            (
                Execution,
                Lukso,
                CompatibleClient::new("lukso-geth.dnp.dappnode.eth", "0.1.0"),
            ),
            (
                Consensus,
                Mainnet,
                CompatibleClient::new("prysm.dnp.dappnode.eth", "3.0.4"),
            ),
            (
                Consensus,
                Gnosis,
                CompatibleClient::new("gnosis-beacon-chain-prysm.dnp.dappnode.eth", "2.0.0"),
            ),
            (
                Consensus,
                Prater,
                CompatibleClient::new("prysm-prater.dnp.dappnode.eth", "1.0.15"),
            ),
            (
                Consensus,
                Holesky,
                CompatibleClient::new("prysm-holesky.dnp.dappnode.eth", "0.1.0"),
            ),
            (
                Consensus,
                Lukso,
                CompatibleClient::new("prysm-lukso.dnp.dappnode.eth", "0.1.0"),
            ),
            (
                MevBoost,
                Mainnet,
                CompatibleClient::new("mev-boost.dnp.dappnode.eth", "0.1.0"),
            ),
            (
                MevBoost,
                Prater,
                CompatibleClient::new("mev-boost-goerli.dnp.dappnode.eth", "0.1.0"),
            ),
            (
                MevBoost,
                Holesky,
                CompatibleClient::new("mev-boost-holesky.dnp.dappnode.eth", "0.1.0"),
            ),
        ])
    }
}

/// Compare dotted versions numerically, tolerating a leading 'v' and
/// missing segments: "0.1.2" >= "0.1.0", "v1.2" >= "1.1.9".
pub fn version_gte(installed: &str, min: &str) -> bool {
    fn segments(version: &str) -> Vec<u64> {
        version
            .strip_prefix('v')
            .unwrap_or(version)
            .split('.')
            .map(|part| {
                part.chars()
                    .take_while(char::is_ascii_digit)
                    .collect::<String>()
                    .parse::<u64>()
                    .unwrap_or(0)
            })
            .collect()
    }

    let installed = segments(installed);
    let min = segments(min);
    let len = installed.len().max(min.len());
    for i in 0..len {
        let a = installed.get(i).copied().unwrap_or(0);
        let b = min.get(i).copied().unwrap_or(0);
        if a != b {
            return a > b;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_returns_designated_implementation() {
        let registry = CompatibilityRegistry::dappnode_defaults();
        let client = registry
            .lookup(StakerRole::MevBoost, Network::Mainnet)
            .unwrap();
        assert_eq!(client.dnp_name, "mev-boost.dnp.dappnode.eth");
        assert_eq!(client.min_version, "0.1.0");
    }

    #[test]
    fn test_lookup_unsupported_combination_is_none() {
        let registry = CompatibilityRegistry::dappnode_defaults();
        assert!(registry
            .lookup(StakerRole::MevBoost, Network::Gnosis)
            .is_none());
        assert!(registry
            .lookup(StakerRole::MevBoost, Network::Lukso)
            .is_none());
    }

    #[test]
    fn test_every_network_has_execution_and_consensus() {
        let registry = CompatibilityRegistry::dappnode_defaults();
        for network in Network::ALL {
            assert!(registry.lookup(StakerRole::Execution, network).is_some());
            assert!(registry.lookup(StakerRole::Consensus, network).is_some());
        }
    }

    #[test]
    fn test_service_name_is_first_label() {
        let client = CompatibleClient::new("mev-boost.dnp.dappnode.eth", "0.1.0");
        assert_eq!(client.service_name(), "mev-boost");
    }

    #[test]
    fn test_version_gte() {
        assert!(version_gte("0.1.0", "0.1.0"));
        assert!(version_gte("0.1.2", "0.1.0"));
        assert!(version_gte("v1.2", "1.1.9"));
        assert!(version_gte("1.0", "1.0.0"));
        assert!(!version_gte("0.0.9", "0.1.0"));
        assert!(!version_gte("2.9.9", "3.0.0"));
    }
}
