use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::{info, LevelFilter};
use shared::models::network::Network;

use stakers::cli::Cli;
use stakers::compose::ComposeFileEditor;
use stakers::docker::DockerManager;
use stakers::store::{RedisSelectionStore, RedisStore};
use stakers::{CompatibilityRegistry, SwitchOrchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp(None)
        .init();
    let cli = Cli::parse();

    let networks: Vec<Network> = if cli.networks.is_empty() {
        Network::ALL.to_vec()
    } else {
        cli.networks
            .iter()
            .map(|name| Network::from_str(name).map_err(|e| anyhow::anyhow!(e)))
            .collect::<Result<_>>()?
    };

    let redis = Arc::new(RedisStore::new(&cli.redis_store_url)?);
    let selection_store = Arc::new(RedisSelectionStore::new(redis));
    let runtime = Arc::new(DockerManager::new()?);
    let compose = Arc::new(ComposeFileEditor::new(&cli.compose_dir));
    let registry = Arc::new(CompatibilityRegistry::dappnode_defaults());

    let orchestrator = SwitchOrchestrator::new(registry, runtime, compose, selection_store);

    info!(
        "Reconciling staker selections on {} network(s)",
        networks.len()
    );
    orchestrator.reconcile_all(&networks).await;
    info!("Reconciliation pass complete");
    Ok(())
}
