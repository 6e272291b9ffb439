// Docker inventory and lifecycle control via bollard

mod stats;

use crate::models::{Container, ContainerAction, ContainerSettings, ContainerStats};
use bollard::Docker;
use bollard::query_parameters::{
    ListContainersOptions, RemoveContainerOptions, RestartContainerOptions,
    StartContainerOptions, StatsOptions, StopContainerOptions,
};
use bollard::models::ContainerSummary;
use futures_util::StreamExt;
use std::collections::HashMap;
use std::time::Duration;
use tracing::instrument;

/// Grace period before Docker kills a container on stop/restart.
const STOP_TIMEOUT_SECS: i32 = 10;
const PING_TIMEOUT: Duration = Duration::from_secs(2);
const STATS_TIMEOUT: Duration = Duration::from_secs(2);
const COMPOSE_PROJECT_LABEL: &str = "com.docker.compose.project";

pub struct DockerRepo {
    docker: Docker,
}

impl DockerRepo {
    pub fn connect() -> anyhow::Result<Self> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }

    /// Ping the daemon once at startup. Unreachable Docker is logged, not fatal.
    pub async fn check_connection(&self) {
        match tokio::time::timeout(PING_TIMEOUT, self.docker.ping()).await {
            Ok(Ok(_)) => tracing::info!("Connected to Docker"),
            Ok(Err(e)) => tracing::warn!(error = %e, "Error connecting to Docker"),
            Err(_) => tracing::warn!("Docker ping timed out"),
        }
    }

    /// All containers (running or not), merged with saved display settings.
    #[instrument(skip(self, settings), fields(repo = "docker", operation = "list_containers"))]
    pub async fn list_containers(
        &self,
        settings: &HashMap<String, ContainerSettings>,
    ) -> anyhow::Result<Vec<Container>> {
        let options = ListContainersOptions {
            all: true,
            ..Default::default()
        };
        let summaries = self.docker.list_containers(Some(options)).await?;
        Ok(summaries
            .iter()
            .map(|c| {
                let id = c.id.clone().unwrap_or_default();
                to_container(c, settings.get(&id))
            })
            .collect())
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "control"))]
    pub async fn control(&self, id: &str, action: ContainerAction) -> anyhow::Result<()> {
        match action {
            ContainerAction::Start => {
                self.docker
                    .start_container(id, None::<StartContainerOptions>)
                    .await?
            }
            ContainerAction::Stop => {
                let options = StopContainerOptions {
                    t: Some(STOP_TIMEOUT_SECS),
                    ..Default::default()
                };
                self.docker.stop_container(id, Some(options)).await?
            }
            ContainerAction::Restart => {
                let options = RestartContainerOptions {
                    t: Some(STOP_TIMEOUT_SECS),
                    ..Default::default()
                };
                self.docker.restart_container(id, Some(options)).await?
            }
            ContainerAction::Remove => {
                let options = RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                };
                self.docker.remove_container(id, Some(options)).await?
            }
        }
        tracing::info!(container = id, action = %action, "container action done");
        Ok(())
    }

    /// One stats read (no stream), bounded by STATS_TIMEOUT.
    #[instrument(skip(self), fields(repo = "docker", operation = "container_stats"))]
    pub async fn container_stats(&self, id: &str) -> anyhow::Result<ContainerStats> {
        let options = StatsOptions {
            stream: false,
            ..Default::default()
        };
        let mut stream = self.docker.stats(id, Some(options));
        let next = tokio::time::timeout(STATS_TIMEOUT, stream.next())
            .await
            .map_err(|_| anyhow::anyhow!("stats for {} timed out", id))?;
        let response = next.ok_or_else(|| anyhow::anyhow!("no stats returned for {}", id))??;
        Ok(stats::process_statistics(&response))
    }
}

/// Docker summary + optional settings -> dashboard container.
/// Display name is the alias when set; group falls back to the compose project, title-cased.
pub(crate) fn to_container(c: &ContainerSummary, settings: Option<&ContainerSettings>) -> Container {
    let id = c.id.clone().unwrap_or_default();
    let name = c
        .names
        .as_ref()
        .and_then(|n| n.first())
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_else(|| "unknown".into());

    let ports = c
        .ports
        .as_ref()
        .map(|ports| {
            ports
                .iter()
                .map(|p| {
                    format!(
                        "{}->{}/{}",
                        p.public_port.unwrap_or(0),
                        p.private_port,
                        p.typ.as_ref().map(|t| t.to_string()).unwrap_or_default()
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    let alias = settings.map(|s| s.alias.clone()).unwrap_or_default();
    let icon = settings.map(|s| s.icon.clone()).unwrap_or_default();
    let group = settings
        .map(|s| s.group_name.clone())
        .filter(|g| !g.is_empty())
        .or_else(|| {
            c.labels
                .as_ref()
                .and_then(|l| l.get(COMPOSE_PROJECT_LABEL))
                .filter(|p| !p.is_empty())
                .map(|p| title_case(p))
        })
        .unwrap_or_default();

    Container {
        id,
        name: if alias.is_empty() { name } else { alias.clone() },
        image: c.image.clone().unwrap_or_default(),
        state: c.state.as_ref().map(|s| s.to_string()).unwrap_or_default(),
        status: c.status.clone().unwrap_or_default(),
        ports,
        created: c.created.unwrap_or(0),
        icon,
        alias,
        group,
        stats: None,
    }
}

/// Upper-case the first letter of each word. Letters, digits and `_` continue a word.
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !(ch.is_alphanumeric() || ch == '_');
    }
    out
}
