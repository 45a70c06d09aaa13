use shared::models::network::Network;

/// Core private overlay shared by all dappnode packages.
pub const DOCKER_PRIVATE_NETWORK_NAME: &str = "dncore_network";

/// Container name prefix used by the dappnode runtime for package containers.
pub const CONTAINER_NAME_PREFIX: &str = "DAppNodePackage-";

/// Container labels carrying the owning package name and version.
pub const DNP_NAME_LABEL: &str = "dappnode.dnp.dnpName";
pub const DNP_VERSION_LABEL: &str = "dappnode.dnp.version";

/// File name of the per-package compose override.
pub const COMPOSE_OVERRIDE_FILE: &str = "docker-compose.override.yml";

/// Alias domains. Internal DNS and other packages resolve these names;
/// changing either scheme is a breaking change.
pub const STAKER_ALIAS_DOMAIN: &str = "staker.dappnode";
pub const CORE_ALIAS_DOMAIN: &str = "dncore.dappnode";

/// Per-network private overlay that staker packages attach to.
pub fn docker_staker_network(network: Network) -> String {
    format!("dncore_staker_{}", network)
}
