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

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::connection::{BootstrapSettings, KubeconfigSource};
use crate::consts::{DEFAULT_NAMESPACE, DOCKER_HOST_ALIAS, KUBE_API_PORT, LAST_RESORT_HOST_ALIAS};
use crate::resources::FallbackPolicy;

/// Command line and environment configuration of the dashboard backend.
#[derive(Debug, Parser, Clone)]
#[clap(name = "gateway-dashboard-backend", version)]
pub struct Config {
    /// Kubeconfig file to read instead of the default location. Without it
    /// `$KUBECONFIG` is honored, including its multi-path form.
    #[clap(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Hostname under which the container reaches the Docker host.
    #[clap(long, env = "DOCKER_HOST_ALIAS", default_value = DOCKER_HOST_ALIAS)]
    pub docker_host: String,

    /// Port the host publishes the Kubernetes API server on.
    #[clap(long, env = "KUBE_API_PORT", default_value_t = KUBE_API_PORT)]
    pub api_port: u16,

    /// Host alias used by the last connection strategy.
    #[clap(long, default_value = LAST_RESORT_HOST_ALIAS)]
    pub last_resort_host: String,

    #[clap(long, default_value_t = 5)]
    pub connect_timeout_secs: u64,

    #[clap(long, default_value_t = 10)]
    pub read_timeout_secs: u64,

    /// Namespace listed when none is requested.
    #[clap(short, long, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Answer creates with unpersisted Pending objects while disconnected.
    #[clap(long)]
    pub demo_writes: bool,
}

impl Config {
    pub fn bootstrap_settings(&self) -> BootstrapSettings {
        let kubeconfig = match &self.kubeconfig {
            Some(path) => KubeconfigSource::Path(path.clone()),
            None => KubeconfigSource::Default,
        };
        BootstrapSettings {
            kubeconfig,
            docker_host: self.docker_host.clone(),
            api_port: self.api_port,
            last_resort_host: self.last_resort_host.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
        }
    }

    pub fn write_policy(&self) -> FallbackPolicy {
        if self.demo_writes {
            FallbackPolicy::ReturnDeterministicData
        } else {
            FallbackPolicy::FailNotConnected
        }
    }
}
