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

use std::{
    ops::Sub,
    sync::Arc,
    time::{Duration, Instant},
};

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::*;

use super::connector::Connector;
use super::context::{cluster_endpoints, KubeconfigSource};
use super::strategy::Strategy;
use crate::consts::{DOCKER_HOST_ALIAS, KUBE_API_PORT, LAST_RESORT_HOST_ALIAS};
use crate::resources::ResourceStore;
use crate::Error;

/// Inputs of the connection bootstrap.
#[derive(Clone, Debug)]
pub struct BootstrapSettings {
    pub kubeconfig: KubeconfigSource,
    pub docker_host: String,
    pub api_port: u16,
    pub last_resort_host: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        Self {
            kubeconfig: KubeconfigSource::Default,
            docker_host: DOCKER_HOST_ALIAS.to_string(),
            api_port: KUBE_API_PORT,
            last_resort_host: LAST_RESORT_HOST_ALIAS.to_string(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
        }
    }
}

/// What the bootstrapper currently believes about cluster reachability.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionState {
    pub connected: bool,
    pub active_strategy_index: Option<usize>,
    pub last_error: Option<String>,
    pub cluster_endpoint: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyDiagnostics {
    pub index: usize,
    pub name: &'static str,
    pub active: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeconfigDiagnostics {
    pub source: String,
    pub present: bool,
    pub current_context: Option<String>,
    pub cluster_endpoints: Vec<String>,
    pub error: Option<String>,
}

/// Read-only snapshot for health and troubleshooting endpoints.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub state: ConnectionState,
    pub strategies: Vec<StrategyDiagnostics>,
    pub kubeconfig: KubeconfigDiagnostics,
    pub in_cluster_environment: bool,
}

// The state and the handle only ever change together.
#[derive(Default)]
struct Connection {
    state: ConnectionState,
    handle: Option<Arc<dyn ResourceStore>>,
}

/// Finds a working way to reach the Kubernetes API and owns the result.
///
/// The bootstrapper is the only writer of the connection; resource clients
/// hold it behind an `Arc` and only read.
pub struct Bootstrapper {
    settings: BootstrapSettings,
    strategies: Vec<Strategy>,
    connector: Arc<dyn Connector>,
    connection: RwLock<Connection>,
    // serializes whole runs so two reconnects can't interleave
    running: Mutex<()>,
}

impl Bootstrapper {
    pub fn new(settings: BootstrapSettings, connector: Arc<dyn Connector>) -> Self {
        let strategies = Strategy::defaults(&settings);
        Self::with_strategies(settings, strategies, connector)
    }

    pub fn with_strategies(
        settings: BootstrapSettings,
        strategies: Vec<Strategy>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            settings,
            strategies,
            connector,
            connection: RwLock::new(Connection::default()),
            running: Mutex::new(()),
        }
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Tries every strategy in declared order and keeps the first one whose
    /// probe succeeds. Never fails: when nothing works the state ends up
    /// disconnected with the last error recorded.
    pub async fn run(&self) -> ConnectionState {
        let _running = self.running.lock().await;
        let start = Instant::now();

        // read once per run so every strategy starts from the same file
        let kubeconfig = match self.settings.kubeconfig.load() {
            Ok(kubeconfig) => Some(kubeconfig),
            Err(error) => {
                warn!(%error, "kubeconfig unavailable");
                None
            }
        };

        let mut last_probe_error = None;
        let mut last_build_error = None;
        for (index, strategy) in self.strategies.iter().enumerate() {
            let name = strategy.name();
            let context = match strategy.build_context(kubeconfig.as_ref()) {
                Ok(context) => context,
                Err(error) => {
                    debug!(strategy = name, index, %error, "skipping connection strategy");
                    last_build_error = Some(error.to_string());
                    continue;
                }
            };

            info!(
                strategy = name,
                index,
                endpoint = %context.endpoint,
                "trying connection strategy"
            );
            match self.connector.connect(&context).await {
                Ok(handle) => {
                    let state = ConnectionState {
                        connected: true,
                        active_strategy_index: Some(index),
                        last_error: None,
                        cluster_endpoint: Some(context.endpoint.clone()),
                    };
                    self.store(state.clone(), Some(handle)).await;

                    let duration = Instant::now().sub(start);
                    info!(
                        strategy = name,
                        index,
                        endpoint = %context.endpoint,
                        "connected to Kubernetes in {:?} ms",
                        duration.as_millis()
                    );
                    return state;
                }
                Err(error) => {
                    warn!(strategy = name, index, error = ?error, "connection strategy failed");
                    last_probe_error = Some(match error {
                        Error::StrategyFailure { message, .. } => message,
                        other => other.to_string(),
                    });
                }
            }
        }

        let state = ConnectionState {
            connected: false,
            active_strategy_index: None,
            last_error: last_probe_error.or(last_build_error),
            cluster_endpoint: None,
        };
        error!(
            last_error = ?state.last_error,
            "all connection strategies failed; serving fallback data"
        );
        self.store(state.clone(), None).await;
        state
    }

    /// Drops the current connection and bootstraps again from the first
    /// strategy.
    pub async fn reconnect(&self) -> bool {
        info!("reconnecting to Kubernetes");
        self.store(ConnectionState::default(), None).await;
        self.run().await.connected
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.read().await.state.connected
    }

    pub async fn state(&self) -> ConnectionState {
        self.connection.read().await.state.clone()
    }

    /// The live handle, present only while connected.
    pub async fn handle(&self) -> Option<Arc<dyn ResourceStore>> {
        let connection = self.connection.read().await;
        if connection.state.connected {
            connection.handle.clone()
        } else {
            None
        }
    }

    pub async fn diagnostics(&self) -> Diagnostics {
        let state = self.state().await;
        let strategies = self
            .strategies
            .iter()
            .enumerate()
            .map(|(index, strategy)| StrategyDiagnostics {
                index,
                name: strategy.name(),
                active: state.active_strategy_index == Some(index),
            })
            .collect();

        let source = self.settings.kubeconfig.describe();
        let kubeconfig = match self.settings.kubeconfig.load() {
            Ok(kubeconfig) => KubeconfigDiagnostics {
                source,
                present: true,
                current_context: kubeconfig.current_context.clone(),
                cluster_endpoints: cluster_endpoints(&kubeconfig),
                error: None,
            },
            Err(error) => KubeconfigDiagnostics {
                source,
                present: false,
                current_context: None,
                cluster_endpoints: vec![],
                error: Some(error.to_string()),
            },
        };

        Diagnostics {
            state,
            strategies,
            kubeconfig,
            in_cluster_environment: std::env::var_os("KUBERNETES_SERVICE_HOST").is_some(),
        }
    }

    async fn store(&self, state: ConnectionState, handle: Option<Arc<dyn ResourceStore>>) {
        let mut connection = self.connection.write().await;
        connection.state = state;
        connection.handle = handle;
    }
}
