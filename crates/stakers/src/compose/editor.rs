use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use shared::models::staker::{NetworkAttachment, NetworkSettings, UserSettings};

use crate::params;
use crate::ports::ComposeEditor;

const COMPOSE_VERSION: &str = "3.5";

/// Subset of the compose schema the override file carries: per-service
/// environment and network attachments, plus root network declarations.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ComposeOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    services: BTreeMap<String, ComposeService>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    networks: BTreeMap<String, ComposeRootNetwork>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ComposeService {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    environment: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    networks: BTreeMap<String, ComposeServiceNetwork>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ComposeServiceNetwork {
    #[serde(default)]
    aliases: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ComposeRootNetwork {
    #[serde(default)]
    external: bool,
}

/// Reads and writes the per-package compose override at
/// `<root>/<dnp_name>/docker-compose.override.yml`.
pub struct ComposeFileEditor {
    root: PathBuf,
}

impl ComposeFileEditor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn override_path(&self, dnp_name: &str) -> PathBuf {
        self.root.join(dnp_name).join(params::COMPOSE_OVERRIDE_FILE)
    }

    fn to_user_settings(compose: ComposeOverride) -> UserSettings {
        let mut environment = BTreeMap::new();
        let mut service_networks = BTreeMap::new();
        for (service, definition) in compose.services {
            if !definition.environment.is_empty() {
                environment.insert(service.clone(), definition.environment);
            }
            if !definition.networks.is_empty() {
                let attachments = definition
                    .networks
                    .into_iter()
                    .map(|(name, net)| (name, NetworkAttachment { aliases: net.aliases }))
                    .collect();
                service_networks.insert(service, attachments);
            }
        }

        UserSettings {
            environment,
            networks: NetworkSettings {
                root_networks: compose.networks.into_keys().collect(),
                service_networks,
            },
        }
    }

    fn from_user_settings(settings: &UserSettings) -> ComposeOverride {
        let mut services: BTreeMap<String, ComposeService> = BTreeMap::new();
        for (service, vars) in &settings.environment {
            services.entry(service.clone()).or_default().environment = vars.clone();
        }
        for (service, attachments) in &settings.networks.service_networks {
            services.entry(service.clone()).or_default().networks = attachments
                .iter()
                .map(|(name, attachment)| {
                    (
                        name.clone(),
                        ComposeServiceNetwork {
                            aliases: attachment.aliases.clone(),
                        },
                    )
                })
                .collect();
        }

        let networks = settings
            .networks
            .root_networks
            .iter()
            .map(|name| (name.clone(), ComposeRootNetwork { external: true }))
            .collect();

        ComposeOverride {
            version: Some(COMPOSE_VERSION.to_string()),
            services,
            networks,
        }
    }
}

#[async_trait]
impl ComposeEditor for ComposeFileEditor {
    async fn read_user_settings(&self, dnp_name: &str) -> Result<UserSettings> {
        let path = self.override_path(dnp_name);
        if !path.exists() {
            debug!("No compose override for {}, using defaults", dnp_name);
            return Ok(UserSettings::default());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let compose: ComposeOverride = serde_yaml::from_str(&raw)
            .with_context(|| format!("invalid compose override at {}", path.display()))?;
        Ok(Self::to_user_settings(compose))
    }

    async fn write_user_settings(&self, dnp_name: &str, settings: &UserSettings) -> Result<()> {
        let path = self.override_path(dnp_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let raw = serde_yaml::to_string(&Self::from_user_settings(settings))?;
        fs::write(&path, raw).with_context(|| format!("failed to write {}", path.display()))?;
        debug!("Wrote compose override for {}", dnp_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::build_user_settings;
    use shared::models::network::Network;
    use shared::models::staker::StakerParams;

    #[tokio::test]
    async fn test_write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let editor = ComposeFileEditor::new(dir.path());

        let params = StakerParams::MevBoost {
            relays: vec!["https://relay-a".to_string()],
        };
        let settings = build_user_settings("mev-boost", Network::Mainnet, Some(&params));
        editor
            .write_user_settings("mev-boost.dnp.dappnode.eth", &settings)
            .await
            .unwrap();

        let read = editor
            .read_user_settings("mev-boost.dnp.dappnode.eth")
            .await
            .unwrap();
        assert_eq!(read.environment, settings.environment);
        assert_eq!(
            read.networks.service_networks,
            settings.networks.service_networks
        );
        // Root network order is not preserved through the yaml mapping.
        let mut roots = read.networks.root_networks.clone();
        roots.sort();
        let mut expected = settings.networks.root_networks.clone();
        expected.sort();
        assert_eq!(roots, expected);
    }

    #[tokio::test]
    async fn test_missing_override_reads_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let editor = ComposeFileEditor::new(dir.path());
        let read = editor
            .read_user_settings("geth.dnp.dappnode.eth")
            .await
            .unwrap();
        assert_eq!(read, UserSettings::default());
    }

    #[tokio::test]
    async fn test_root_networks_are_marked_external() {
        let dir = tempfile::tempdir().unwrap();
        let editor = ComposeFileEditor::new(dir.path());
        let settings = build_user_settings("mev-boost", Network::Mainnet, None);
        editor
            .write_user_settings("mev-boost.dnp.dappnode.eth", &settings)
            .await
            .unwrap();

        let raw = std::fs::read_to_string(
            dir.path()
                .join("mev-boost.dnp.dappnode.eth")
                .join(params::COMPOSE_OVERRIDE_FILE),
        )
        .unwrap();
        assert!(raw.contains("external: true"));
        assert!(raw.contains("dncore_staker_mainnet"));
    }
}
