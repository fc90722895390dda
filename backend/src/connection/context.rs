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

use std::path::PathBuf;

use http::uri::Authority;
use kube::config::{Kubeconfig, NamedCluster};

use crate::{Error, Result};

/// Where the kubeconfig consulted by the file based strategies comes from.
#[derive(Clone, Debug, Default)]
pub enum KubeconfigSource {
    /// `$KUBECONFIG` or `~/.kube/config`.
    #[default]
    Default,
    Path(PathBuf),
    Inline(Box<Kubeconfig>),
}

impl KubeconfigSource {
    pub fn load(&self) -> Result<Kubeconfig> {
        match self {
            KubeconfigSource::Default => {
                Kubeconfig::read().map_err(|e| Error::KubeconfigError(e.to_string()))
            }
            KubeconfigSource::Path(path) => Kubeconfig::read_from(path).map_err(|e| {
                Error::KubeconfigError(format!("failed to read {}: {}", path.display(), e))
            }),
            KubeconfigSource::Inline(kubeconfig) => Ok(kubeconfig.as_ref().clone()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            KubeconfigSource::Default => "default".to_string(),
            KubeconfigSource::Path(path) => path.display().to_string(),
            KubeconfigSource::Inline(_) => "inline".to_string(),
        }
    }
}

/// A candidate way of reaching the API server, built fresh by a strategy.
#[derive(Clone, Debug)]
pub struct ConnectionContext {
    /// Name of the strategy that produced this context.
    pub strategy: &'static str,
    /// Server URL the client will talk to.
    pub endpoint: String,
    pub accept_invalid_certs: bool,
    pub source: ContextSource,
}

#[derive(Clone, Debug)]
pub enum ContextSource {
    /// A kubeconfig, either derived from the user's file or synthesized.
    Kubeconfig(Box<Kubeconfig>),
    /// Service account configuration of a pod.
    InCluster(Box<kube::Config>),
}

// Returns the cluster selected by the current context, or the only cluster
// when no current context is set.
pub(crate) fn current_cluster_mut(kubeconfig: &mut Kubeconfig) -> Option<&mut NamedCluster> {
    let cluster_name = current_cluster_name(kubeconfig);
    match cluster_name {
        Some(name) => kubeconfig.clusters.iter_mut().find(|c| c.name == name),
        None if kubeconfig.clusters.len() == 1 => kubeconfig.clusters.first_mut(),
        None => None,
    }
}

pub(crate) fn current_cluster(kubeconfig: &Kubeconfig) -> Option<&NamedCluster> {
    match current_cluster_name(kubeconfig) {
        Some(name) => kubeconfig.clusters.iter().find(|c| c.name == name),
        None if kubeconfig.clusters.len() == 1 => kubeconfig.clusters.first(),
        None => None,
    }
}

pub(crate) fn current_server(kubeconfig: &Kubeconfig) -> Option<String> {
    current_cluster(kubeconfig)?.cluster.as_ref()?.server.clone()
}

fn current_cluster_name(kubeconfig: &Kubeconfig) -> Option<String> {
    let current = kubeconfig.current_context.as_ref()?;
    kubeconfig
        .contexts
        .iter()
        .find(|c| &c.name == current)
        .and_then(|c| c.context.as_ref())
        .map(|c| c.cluster.clone())
}

pub(crate) fn cluster_endpoints(kubeconfig: &Kubeconfig) -> Vec<String> {
    kubeconfig
        .clusters
        .iter()
        .filter_map(|c| c.cluster.as_ref().and_then(|c| c.server.clone()))
        .collect()
}

// Turns off certificate verification for a cluster. A CA bundle is dropped
// as well since it cannot be combined with skipping verification.
pub(crate) fn skip_tls_verify(cluster: &mut NamedCluster) {
    if let Some(cluster) = cluster.cluster.as_mut() {
        cluster.insecure_skip_tls_verify = Some(true);
        cluster.certificate_authority = None;
        cluster.certificate_authority_data = None;
    }
}

fn split_server(server: &str) -> Result<(&str, Authority, &str)> {
    let (scheme, rest) = server.split_once("://").ok_or_else(|| {
        Error::InvalidConfigError(format!("server URL {server} has no scheme"))
    })?;
    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    let authority = authority
        .parse::<Authority>()
        .map_err(|e| Error::InvalidConfigError(format!("server URL {server}: {e}")))?;
    Ok((scheme, authority, path))
}

pub(crate) fn server_host(server: &str) -> Result<String> {
    let (_, authority, _) = split_server(server)?;
    Ok(authority.host().to_string())
}

// Rebuilds a server URL with a different host and/or port, keeping the
// scheme and any path.
pub(crate) fn rewrite_server(
    server: &str,
    host: Option<&str>,
    port: Option<u16>,
) -> Result<String> {
    let (scheme, authority, path) = split_server(server)?;
    let host = host.unwrap_or(authority.host());
    Ok(match port.or(authority.port_u16()) {
        Some(port) => format!("{scheme}://{host}:{port}{path}"),
        None => format!("{scheme}://{host}{path}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_server() {
        assert_eq!(
            rewrite_server("https://127.0.0.1:6443", Some("host.docker.internal"), None).unwrap(),
            "https://host.docker.internal:6443"
        );
        assert_eq!(
            rewrite_server("https://kubernetes.docker.internal:8443/api", None, Some(6443))
                .unwrap(),
            "https://kubernetes.docker.internal:6443/api"
        );
        assert_eq!(
            rewrite_server("https://localhost", None, Some(6443)).unwrap(),
            "https://localhost:6443"
        );
        assert_eq!(
            rewrite_server("https://[::1]:6443", Some("host.docker.internal"), None).unwrap(),
            "https://host.docker.internal:6443"
        );
    }

    #[test]
    fn test_rewrite_server_rejects_missing_scheme() {
        assert!(matches!(
            rewrite_server("127.0.0.1:6443", None, Some(6443)),
            Err(Error::InvalidConfigError(_))
        ));
    }

    #[test]
    fn test_server_host() {
        assert_eq!(server_host("https://127.0.0.1:6443").unwrap(), "127.0.0.1");
        assert_eq!(server_host("https://[::1]:6443").unwrap(), "[::1]");
    }
}
