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
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use backend::consts::*;
use backend::{
    BootstrapSettings, Bootstrapper, ConnectionContext, Connector, Error, KubeconfigSource,
    ResourceKind, ResourceStore,
};
use chrono::Utc;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use kube::api::DynamicObject;
use kube::core::ErrorResponse;
use kube::ResourceExt;
use tempfile::TempDir;

pub const DOCKER_DESKTOP_KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: docker-desktop
clusters:
- name: docker-desktop
  cluster:
    server: https://127.0.0.1:6443
    certificate-authority-data: Zm9v
contexts:
- name: docker-desktop
  context:
    cluster: docker-desktop
    user: docker-desktop
users:
- name: docker-desktop
  user:
    token: secret
"#;

pub const ALL_STRATEGIES: [&str; 6] = [
    STRATEGY_DOCKER_HOST_ALIAS,
    STRATEGY_FORCED_API_PORT,
    STRATEGY_SYNTHETIC_DOCKER_HOST,
    STRATEGY_INSECURE_KUBECONFIG,
    STRATEGY_IN_CLUSTER,
    STRATEGY_LAST_RESORT,
];

/// Settings pointing at a Docker Desktop style kubeconfig written to a
/// temporary directory. Keep the directory alive for the test's duration.
pub fn settings_with_kubeconfig() -> (BootstrapSettings, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config");
    std::fs::write(&path, DOCKER_DESKTOP_KUBECONFIG).unwrap();
    let settings = BootstrapSettings {
        kubeconfig: KubeconfigSource::Path(path),
        ..Default::default()
    };
    (settings, dir)
}

pub fn settings_without_kubeconfig() -> BootstrapSettings {
    BootstrapSettings {
        kubeconfig: KubeconfigSource::Path(PathBuf::from("/nonexistent/kubeconfig")),
        ..Default::default()
    }
}

/// Connector whose probe outcome is scripted per strategy name. Strategies
/// without a script fail with "connection refused".
#[derive(Default)]
pub struct FakeConnector {
    outcomes: Mutex<HashMap<&'static str, Result<(), String>>>,
    attempts: Mutex<Vec<&'static str>>,
    cluster: Arc<FakeCluster>,
}

impl FakeConnector {
    pub fn new(cluster: Arc<FakeCluster>) -> Self {
        Self {
            cluster,
            ..Default::default()
        }
    }

    pub fn succeed(&self, strategy: &'static str) {
        self.outcomes.lock().unwrap().insert(strategy, Ok(()));
    }

    pub fn fail(&self, strategy: &'static str, message: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(strategy, Err(message.to_string()));
    }

    pub fn attempts(&self) -> Vec<&'static str> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn clear_attempts(&self) {
        self.attempts.lock().unwrap().clear();
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(
        &self,
        context: &ConnectionContext,
    ) -> backend::Result<Arc<dyn ResourceStore>> {
        self.attempts.lock().unwrap().push(context.strategy);
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .get(context.strategy)
            .cloned()
            .unwrap_or_else(|| Err("connection refused".to_string()));
        match outcome {
            Ok(()) => {
                let store: Arc<dyn ResourceStore> = self.cluster.clone();
                Ok(store)
            }
            Err(message) => Err(Error::StrategyFailure {
                strategy: context.strategy.to_string(),
                message,
            }),
        }
    }
}

/// A bootstrapper that connects through the synthetic strategy to `cluster`.
pub async fn connected(cluster: Arc<FakeCluster>) -> Arc<Bootstrapper> {
    let connector = Arc::new(FakeConnector::new(cluster));
    connector.succeed(STRATEGY_SYNTHETIC_DOCKER_HOST);
    let bootstrapper = Arc::new(Bootstrapper::new(settings_without_kubeconfig(), connector));
    assert!(bootstrapper.run().await.connected);
    bootstrapper
}

/// A bootstrapper for which every strategy fails.
pub async fn disconnected() -> Arc<Bootstrapper> {
    let connector = Arc::new(FakeConnector::new(Arc::new(FakeCluster::default())));
    let bootstrapper = Arc::new(Bootstrapper::new(settings_without_kubeconfig(), connector));
    assert!(!bootstrapper.run().await.connected);
    bootstrapper
}

type Key = (ResourceKind, String, String);

/// In-memory stand-in for the API server.
#[derive(Default)]
pub struct FakeCluster {
    objects: Mutex<HashMap<Key, DynamicObject>>,
    next_uid: Mutex<u64>,
    denied: Mutex<bool>,
    stale_writes: Mutex<bool>,
    crds_missing: Mutex<bool>,
}

impl FakeCluster {
    /// Makes every call fail the way an RBAC denial does.
    pub fn deny_all(&self) {
        *self.denied.lock().unwrap() = true;
    }

    /// Makes every replace fail as if another writer got there first.
    pub fn reject_stale_writes(&self) {
        *self.stale_writes.lock().unwrap() = true;
    }

    /// Makes collection reads fail the way they do without the Gateway API CRDs.
    pub fn remove_crds(&self) {
        *self.crds_missing.lock().unwrap() = true;
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), kube::Error> {
        if *self.denied.lock().unwrap() {
            return Err(api_error(403, "Forbidden", "access denied"));
        }
        Ok(())
    }
}

pub fn api_error(code: u16, reason: &str, message: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: reason.to_string(),
        code,
    })
}

#[async_trait]
impl ResourceStore for FakeCluster {
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>, kube::Error> {
        self.check()?;
        if *self.crds_missing.lock().unwrap() {
            return Err(api_error(
                404,
                "NotFound",
                "the server could not find the requested resource",
            ));
        }
        let objects = self.objects.lock().unwrap();
        let mut items: Vec<DynamicObject> = objects
            .iter()
            .filter(|((k, ns, _), _)| *k == kind && namespace.map_or(true, |n| n == ns))
            .map(|(_, object)| object.clone())
            .collect();
        items.sort_by_key(|o| (o.namespace(), o.name_any()));
        Ok(items)
    }

    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<DynamicObject, kube::Error> {
        self.check()?;
        self.objects
            .lock()
            .unwrap()
            .get(&(kind, namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| api_error(404, "NotFound", &format!("{name} not found")))
    }

    async fn create(
        &self,
        kind: ResourceKind,
        namespace: &str,
        object: &DynamicObject,
    ) -> Result<DynamicObject, kube::Error> {
        self.check()?;
        let key = (kind, namespace.to_string(), object.name_any());
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&key) {
            return Err(api_error(409, "AlreadyExists", "already exists"));
        }

        let mut next_uid = self.next_uid.lock().unwrap();
        *next_uid += 1;
        let mut stored = object.clone();
        stored.metadata.uid = Some(format!("uid-{}", *next_uid));
        stored.metadata.resource_version = Some("1".to_string());
        stored.metadata.creation_timestamp = Some(metav1::Time(Utc::now()));
        objects.insert(key, stored.clone());
        Ok(stored)
    }

    async fn replace(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        object: &DynamicObject,
    ) -> Result<DynamicObject, kube::Error> {
        self.check()?;
        let key = (kind, namespace.to_string(), name.to_string());
        let mut objects = self.objects.lock().unwrap();
        let Some(current) = objects.get(&key) else {
            return Err(api_error(404, "NotFound", &format!("{name} not found")));
        };
        if *self.stale_writes.lock().unwrap()
            || object.metadata.resource_version != current.metadata.resource_version
        {
            return Err(api_error(
                409,
                "Conflict",
                "the object has been modified; please apply your changes to the latest version",
            ));
        }

        let version: u64 = current
            .metadata
            .resource_version
            .as_deref()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let mut stored = object.clone();
        stored.metadata.resource_version = Some((version + 1).to_string());
        objects.insert(key, stored.clone());
        Ok(stored)
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<(), kube::Error> {
        self.check()?;
        self.objects
            .lock()
            .unwrap()
            .remove(&(kind, namespace.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| api_error(404, "NotFound", &format!("{name} not found")))
    }
}
