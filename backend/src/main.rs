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

use std::sync::Arc;

use backend::config::Config;
use backend::*;

use clap::Parser;
use serde_json::json;
use tracing::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(config).await
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let settings = config.bootstrap_settings();
    let connector = Arc::new(KubeConnector::new(
        settings.connect_timeout,
        settings.read_timeout,
    ));
    let bootstrapper = Arc::new(Bootstrapper::new(settings, connector));

    let state = bootstrapper.run().await;
    if !state.connected {
        warn!(
            last_error = ?state.last_error,
            "no Kubernetes cluster reachable; serving fallback data"
        );
    }
    let diagnostics = bootstrapper.diagnostics().await;
    info!("connection diagnostics: {}", serde_json::to_string(&diagnostics)?);

    let gateways = GatewayClient::new(bootstrapper.clone())
        .with_default_namespace(config.namespace.clone())
        .with_write_policy(config.write_policy());
    let routes = RouteClient::new(bootstrapper)
        .with_default_namespace(config.namespace.clone())
        .with_write_policy(config.write_policy());

    let namespace = Some(config.namespace.as_str());
    let gateways = gateways.list(namespace).await?;
    let routes = routes.list(namespace).await?;
    info!(
        gateways = gateways.len(),
        routes = routes.len(),
        namespace = %config.namespace,
        "listed Gateway API resources"
    );

    let output = json!({
        "connected": state.connected,
        "gateways": serde_json::to_value(&gateways)?,
        "httpRoutes": serde_json::to_value(&routes)?,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
