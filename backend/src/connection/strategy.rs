/*
Copyright 2025 The Kubernetes Authors.

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use kube::config::Kubeconfig;
use serde_json::json;

use super::context::{
    current_cluster, current_cluster_mut, current_server, rewrite_server, server_host,
    skip_tls_verify, ConnectionContext, ContextSource,
};
use super::BootstrapSettings;
use crate::consts::*;
use crate::{Error, Result};

/// One way of reaching the API server from inside the extension container.
///
/// Strategies are pure descriptors: each one derives a brand new
/// [`ConnectionContext`] from the kubeconfig it is handed and never sees the
/// mutations made by another strategy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Loopback server hosts are replaced by the Docker host alias.
    DockerHostAlias { alias: String },
    /// The current cluster's server port is forced to the published API port.
    ForcedApiPort { port: u16 },
    /// A kubeconfig built from scratch with anonymous credentials.
    SyntheticDockerHost { host: String, port: u16 },
    /// The kubeconfig as is, without certificate verification.
    InsecureKubeconfig,
    /// Service account credentials when running as a pod.
    InCluster,
    /// Loopback server hosts are replaced by the legacy Docker for Mac alias.
    LastResort { alias: String },
}

impl Strategy {
    /// The strategies in the order they are tried. Earlier entries are the
    /// more specific guesses for a Docker Desktop container.
    pub fn defaults(settings: &BootstrapSettings) -> Vec<Strategy> {
        vec![
            Strategy::DockerHostAlias {
                alias: settings.docker_host.clone(),
            },
            Strategy::ForcedApiPort {
                port: settings.api_port,
            },
            Strategy::SyntheticDockerHost {
                host: settings.docker_host.clone(),
                port: settings.api_port,
            },
            Strategy::InsecureKubeconfig,
            Strategy::InCluster,
            Strategy::LastResort {
                alias: settings.last_resort_host.clone(),
            },
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::DockerHostAlias { .. } => STRATEGY_DOCKER_HOST_ALIAS,
            Strategy::ForcedApiPort { .. } => STRATEGY_FORCED_API_PORT,
            Strategy::SyntheticDockerHost { .. } => STRATEGY_SYNTHETIC_DOCKER_HOST,
            Strategy::InsecureKubeconfig => STRATEGY_INSECURE_KUBECONFIG,
            Strategy::InCluster => STRATEGY_IN_CLUSTER,
            Strategy::LastResort { .. } => STRATEGY_LAST_RESORT,
        }
    }

    /// Builds the context this strategy would connect with. Fails when the
    /// inputs it needs are missing, e.g. there is no kubeconfig.
    pub fn build_context(&self, kubeconfig: Option<&Kubeconfig>) -> Result<ConnectionContext> {
        match self {
            Strategy::DockerHostAlias { alias } | Strategy::LastResort { alias } => {
                let mut kubeconfig = self.require(kubeconfig)?;
                alias_loopback_servers(&mut kubeconfig, alias)?;
                self.kubeconfig_context(kubeconfig)
            }
            Strategy::ForcedApiPort { port } => {
                let mut kubeconfig = self.require(kubeconfig)?;
                let cluster = current_cluster_mut(&mut kubeconfig).ok_or_else(|| {
                    Error::KubeconfigError("no cluster for the current context".to_string())
                })?;
                if let Some(cluster_spec) = cluster.cluster.as_mut() {
                    if let Some(server) = cluster_spec.server.as_deref() {
                        cluster_spec.server = Some(rewrite_server(server, None, Some(*port))?);
                    }
                }
                skip_tls_verify(cluster);
                self.kubeconfig_context(kubeconfig)
            }
            Strategy::SyntheticDockerHost { host, port } => {
                self.kubeconfig_context(synthetic_kubeconfig(&format!("https://{host}:{port}"))?)
            }
            Strategy::InsecureKubeconfig => {
                let mut kubeconfig = self.require(kubeconfig)?;
                kubeconfig.clusters.iter_mut().for_each(skip_tls_verify);
                self.kubeconfig_context(kubeconfig)
            }
            Strategy::InCluster => {
                let config =
                    kube::Config::incluster().map_err(|e| Error::InCluster(e.to_string()))?;
                Ok(ConnectionContext {
                    strategy: self.name(),
                    endpoint: config.cluster_url.to_string(),
                    accept_invalid_certs: config.accept_invalid_certs,
                    source: ContextSource::InCluster(Box::new(config)),
                })
            }
        }
    }

    fn require(&self, kubeconfig: Option<&Kubeconfig>) -> Result<Kubeconfig> {
        kubeconfig.cloned().ok_or_else(|| {
            Error::KubeconfigError(format!("strategy {} needs a kubeconfig", self.name()))
        })
    }

    fn kubeconfig_context(&self, kubeconfig: Kubeconfig) -> Result<ConnectionContext> {
        let endpoint = current_server(&kubeconfig).ok_or_else(|| {
            Error::KubeconfigError("no server for the current context".to_string())
        })?;
        let accept_invalid_certs = current_cluster(&kubeconfig)
            .and_then(|c| c.cluster.as_ref())
            .and_then(|c| c.insecure_skip_tls_verify)
            .unwrap_or(false);
        Ok(ConnectionContext {
            strategy: self.name(),
            endpoint,
            accept_invalid_certs,
            source: ContextSource::Kubeconfig(Box::new(kubeconfig)),
        })
    }
}

fn alias_loopback_servers(kubeconfig: &mut Kubeconfig, alias: &str) -> Result<()> {
    for named in kubeconfig.clusters.iter_mut() {
        let Some(server) = named.cluster.as_ref().and_then(|c| c.server.clone()) else {
            continue;
        };
        // servers that don't parse can't be loopback; leave them be
        let Ok(host) = server_host(&server) else {
            continue;
        };
        if !LOOPBACK_HOSTS.contains(&host.as_str()) {
            continue;
        }
        if let Some(cluster) = named.cluster.as_mut() {
            cluster.server = Some(rewrite_server(&server, Some(alias), None)?);
        }
        skip_tls_verify(named);
    }
    Ok(())
}

// A kubeconfig that is never read from disk: one insecure cluster, one
// anonymous user and a context tying them together.
fn synthetic_kubeconfig(server: &str) -> Result<Kubeconfig> {
    serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Config",
        "current-context": "docker-desktop-synthetic",
        "clusters": [{
            "name": "docker-desktop-synthetic",
            "cluster": {
                "server": server,
                "insecure-skip-tls-verify": true
            }
        }],
        "users": [{
            "name": "anonymous",
            "user": {}
        }],
        "contexts": [{
            "name": "docker-desktop-synthetic",
            "context": {
                "cluster": "docker-desktop-synthetic",
                "user": "anonymous"
            }
        }]
    }))
    .map_err(|e| Error::KubeconfigError(format!("synthetic kubeconfig: {e}")))
}
