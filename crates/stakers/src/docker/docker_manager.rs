use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, ListContainersOptions, StartContainerOptions,
};
use bollard::errors::Error as DockerError;
use bollard::image::CreateImageOptions;
use bollard::models::{ContainerSummary, EndpointSettings};
use bollard::network::{ConnectNetworkOptions, CreateNetworkOptions, InspectNetworkOptions};
use bollard::Docker;
use futures_util::StreamExt;
use log::{debug, error, info};
use shared::models::staker::UserSettings;

use crate::params;
use crate::ports::{InstalledPackage, PackageContainer, PackageRuntime};

/// Bollard-backed installer/runtime driver. Package containers are located
/// by the `dappnode.dnp.dnpName` label and named
/// `DAppNodePackage-<service>.<dnp_name>`.
pub struct DockerManager {
    docker: Docker,
}

impl DockerManager {
    const DEFAULT_IMAGE_TAG: &'static str = "latest";

    pub fn new() -> Result<Self, DockerError> {
        let docker = match Docker::connect_with_unix_defaults() {
            Ok(docker) => docker,
            Err(e) => {
                error!("Failed to connect to Docker daemon: {}", e);
                return Err(e);
            }
        };
        Ok(Self { docker })
    }

    fn container_name(service: &str, dnp_name: &str) -> String {
        format!("{}{}.{}", params::CONTAINER_NAME_PREFIX, service, dnp_name)
    }

    /// Pull an image if it doesn't exist locally.
    async fn pull_image(&self, image: &str) -> Result<(), DockerError> {
        debug!("Checking if image needs to be pulled: {}", image);
        if self.docker.inspect_image(image).await.is_ok() {
            debug!("Image {} already exists locally", image);
            return Ok(());
        }

        info!("Image {} not found locally, pulling...", image);
        let (image_name, tag) = match image.split_once(':') {
            Some((name, tag)) => (name, tag),
            None => (image, "latest"),
        };
        let options = CreateImageOptions {
            from_image: image_name,
            tag,
            ..Default::default()
        };

        let mut image_stream = self.docker.create_image(Some(options), None, None);
        while let Some(progress) = image_stream.next().await {
            match progress {
                Ok(create_info) => debug!("Pull progress: {:?}", create_info),
                Err(e) => return Err(e),
            }
        }

        info!("Successfully pulled image {}", image);
        Ok(())
    }

    /// Deployed version of a pulled image, from the version label the
    /// package build embeds. Falls back to the pulled tag.
    async fn resolve_version(&self, image: &str) -> Result<String, DockerError> {
        let inspected = self.docker.inspect_image(image).await?;
        Ok(inspected
            .config
            .and_then(|config| config.labels)
            .and_then(|labels| labels.get(params::DNP_VERSION_LABEL).cloned())
            .unwrap_or_else(|| Self::DEFAULT_IMAGE_TAG.to_string()))
    }

    async fn ensure_network(&self, name: &str) -> Result<(), DockerError> {
        if self
            .docker
            .inspect_network(name, None::<InspectNetworkOptions<String>>)
            .await
            .is_ok()
        {
            return Ok(());
        }
        info!("Creating docker network {}", name);
        self.docker
            .create_network(CreateNetworkOptions {
                name,
                driver: "bridge",
                ..Default::default()
            })
            .await?;
        Ok(())
    }

    async fn package_containers(
        &self,
        dnp_name: &str,
    ) -> Result<Vec<ContainerSummary>, DockerError> {
        let mut filters = HashMap::new();
        filters.insert(
            "label".to_string(),
            vec![format!("{}={}", params::DNP_NAME_LABEL, dnp_name)],
        );
        self.docker
            .list_containers(Some(ListContainersOptions {
                all: true,
                filters,
                ..Default::default()
            }))
            .await
    }
}

#[async_trait]
impl PackageRuntime for DockerManager {
    async fn list_package(&self, dnp_name: &str) -> Result<Option<InstalledPackage>> {
        let summaries = self.package_containers(dnp_name).await?;
        if summaries.is_empty() {
            return Ok(None);
        }

        let version = summaries
            .iter()
            .find_map(|c| {
                c.labels
                    .as_ref()
                    .and_then(|labels| labels.get(params::DNP_VERSION_LABEL))
                    .cloned()
            })
            .unwrap_or_default();
        let containers = summaries
            .iter()
            .map(|c| PackageContainer {
                name: c
                    .names
                    .as_ref()
                    .and_then(|names| names.first())
                    .map(|name| name.trim_start_matches('/').to_string())
                    .unwrap_or_default(),
                running: c.state.as_deref() == Some("running"),
            })
            .collect();

        Ok(Some(InstalledPackage {
            dnp_name: dnp_name.to_string(),
            version,
            containers,
        }))
    }

    async fn install(
        &self,
        dnp_name: &str,
        docker_network: &str,
        settings: &UserSettings,
    ) -> Result<()> {
        let image = format!("{}:{}", dnp_name, Self::DEFAULT_IMAGE_TAG);
        self.pull_image(&image).await?;
        let version = self.resolve_version(&image).await?;

        self.ensure_network(docker_network).await?;
        for network in &settings.networks.root_networks {
            self.ensure_network(network).await?;
        }

        let labels = HashMap::from([
            (params::DNP_NAME_LABEL.to_string(), dnp_name.to_string()),
            (params::DNP_VERSION_LABEL.to_string(), version),
        ]);

        for (service, attachments) in &settings.networks.service_networks {
            let container_name = Self::container_name(service, dnp_name);
            let env = settings.environment.get(service).map(|vars| {
                vars.iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<String>>()
            });

            let config = Config {
                image: Some(image.clone()),
                env,
                labels: Some(labels.clone()),
                ..Default::default()
            };

            debug!("Creating container {}", container_name);
            self.docker
                .create_container(
                    Some(CreateContainerOptions {
                        name: container_name.clone(),
                        platform: None,
                    }),
                    config,
                )
                .await
                .map_err(|e| {
                    error!("Failed to create container {}: {}", container_name, e);
                    e
                })?;

            // Overlay attachments carry the alias contract; wire them before
            // the first start so DNS is coherent from the beginning.
            for (network, attachment) in attachments {
                self.docker
                    .connect_network(
                        network,
                        ConnectNetworkOptions {
                            container: container_name.clone(),
                            endpoint_config: EndpointSettings {
                                aliases: Some(attachment.aliases.clone()),
                                ..Default::default()
                            },
                        },
                    )
                    .await?;
            }

            self.docker
                .start_container(&container_name, None::<StartContainerOptions<String>>)
                .await?;
            info!("Container {} started successfully", container_name);
        }

        Ok(())
    }

    async fn uninstall(&self, dnp_name: &str) -> Result<()> {
        let containers = self.package_containers(dnp_name).await?;
        for container in containers {
            let Some(id) = container.id else { continue };

            // Stopping an already-stopped container is not an error worth
            // failing the uninstall for.
            if let Err(e) = self.docker.stop_container(&id, None).await {
                error!("Failed to stop container {}: {}", id, e);
            }
            self.docker.remove_container(&id, None).await?;
            debug!("Removed container {}", id);
        }
        info!("Uninstalled package {}", dnp_name);
        Ok(())
    }
}
