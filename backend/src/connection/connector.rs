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

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{Api, ListParams},
    config::KubeConfigOptions,
    Client, Config,
};
use tracing::debug;

use super::context::{ConnectionContext, ContextSource};
use crate::resources::{KubeStore, ResourceStore};
use crate::{Error, Result};

/// Turns a [`ConnectionContext`] into a live handle, or explains why it can't.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Builds a client for the context and probes it with a cheap read.
    async fn connect(&self, context: &ConnectionContext) -> Result<Arc<dyn ResourceStore>>;
}

/// Connects through kube-rs and probes by listing namespaces.
#[derive(Clone, Debug)]
pub struct KubeConnector {
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl KubeConnector {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            read_timeout,
        }
    }

    async fn client_config(&self, context: &ConnectionContext) -> Result<Config> {
        let mut config = match &context.source {
            ContextSource::Kubeconfig(kubeconfig) => Config::from_custom_kubeconfig(
                kubeconfig.as_ref().clone(),
                &KubeConfigOptions::default(),
            )
            .await
            .map_err(|e| failure(context, e))?,
            ContextSource::InCluster(config) => config.as_ref().clone(),
        };
        if context.accept_invalid_certs {
            config.accept_invalid_certs = true;
        }
        // the probe must not hang on an unreachable address
        config.connect_timeout = Some(self.connect_timeout);
        config.read_timeout = Some(self.read_timeout);
        Ok(config)
    }
}

#[async_trait]
impl Connector for KubeConnector {
    async fn connect(&self, context: &ConnectionContext) -> Result<Arc<dyn ResourceStore>> {
        let config = self.client_config(context).await?;
        let client = Client::try_from(config).map_err(|e| failure(context, e))?;

        let namespaces: Api<Namespace> = Api::all(client.clone());
        namespaces
            .list(&ListParams::default().limit(1))
            .await
            .map_err(|e| failure(context, e))?;
        debug!(strategy = context.strategy, endpoint = %context.endpoint, "probe succeeded");

        Ok(Arc::new(KubeStore::new(client)))
    }
}

fn failure(context: &ConnectionContext, error: impl std::fmt::Display) -> Error {
    Error::StrategyFailure {
        strategy: context.strategy.to_string(),
        message: error.to_string(),
    }
}
