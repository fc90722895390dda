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

use std::{collections::BTreeMap, marker::PhantomData, sync::Arc};

use chrono::Utc;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use kube::api::DynamicObject;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::*;

use super::gateway::GatewayResource;
use super::kind::ResourceKind;
use super::route::RouteResource;
use super::status::ResourceStatus;
use super::store::ResourceStore;
use crate::connection::Bootstrapper;
use crate::consts::DEFAULT_NAMESPACE;
use crate::traits::HasConditions;
use crate::utils::merge_shallow;
use crate::{Error, NamespacedName, Result};

/// A custom resource kind the [`ResourceClient`] can serve.
pub trait ManagedResource: HasConditions + Serialize + Send + Sync + Sized {
    const KIND: ResourceKind;

    /// Maps a raw API object into the dashboard shape.
    fn from_object(object: DynamicObject) -> Self;

    /// The canned instance served for `namespace` while disconnected.
    fn fallback(namespace: &str) -> Self;

    fn set_status(&mut self, status: ResourceStatus);
}

/// What to do when an operation is issued without a live connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Serve canned data; for creates, an unpersisted `Pending` object.
    ReturnDeterministicData,
    FailNotConnected,
}

/// Caller supplied description of a resource to create.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequest {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub spec: Map<String, Value>,
}

impl ResourceRequest {
    pub fn new(name: impl Into<String>, spec: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            spec,
            ..Default::default()
        }
    }

    fn into_object(self, kind: ResourceKind, namespace: &str) -> DynamicObject {
        let mut object = kind.object(namespace, &self.name, json!({ "spec": self.spec }));
        if !self.labels.is_empty() {
            object.metadata.labels = Some(self.labels);
        }
        if !self.annotations.is_empty() {
            object.metadata.annotations = Some(self.annotations);
        }
        object
    }
}

enum Target {
    Live(Arc<dyn ResourceStore>),
    Fallback,
}

/// Typed CRUD for one resource kind on top of the bootstrapped connection.
///
/// Reads degrade to deterministic data when no cluster is reachable so the
/// dashboard stays usable; targeted reads and writes fail with
/// [`Error::NotConnected`] instead of pretending to succeed.
pub struct ResourceClient<R> {
    connection: Arc<Bootstrapper>,
    reads: FallbackPolicy,
    writes: FallbackPolicy,
    default_namespace: String,
    _resource: PhantomData<fn() -> R>,
}

pub type GatewayClient = ResourceClient<GatewayResource>;
pub type RouteClient = ResourceClient<RouteResource>;

impl<R> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            reads: self.reads,
            writes: self.writes,
            default_namespace: self.default_namespace.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: ManagedResource> ResourceClient<R> {
    pub fn new(connection: Arc<Bootstrapper>) -> Self {
        Self {
            connection,
            reads: FallbackPolicy::ReturnDeterministicData,
            writes: FallbackPolicy::FailNotConnected,
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            _resource: PhantomData,
        }
    }

    pub fn with_read_policy(mut self, policy: FallbackPolicy) -> Self {
        self.reads = policy;
        self
    }

    pub fn with_write_policy(mut self, policy: FallbackPolicy) -> Self {
        self.writes = policy;
        self
    }

    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = namespace.into();
        self
    }

    /// Lists resources in `namespace`, or in every namespace when `None`.
    pub async fn list(&self, namespace: Option<&str>) -> Result<Vec<R>> {
        match self.target(self.reads).await? {
            Target::Live(store) => {
                let objects = store
                    .list(R::KIND, namespace)
                    .await
                    .map_err(Error::from_kube_list)?;
                debug!(kind = %R::KIND, namespace, count = objects.len(), "listed resources");
                Ok(objects.into_iter().map(R::from_object).collect())
            }
            Target::Fallback => {
                let namespace = namespace.unwrap_or(&self.default_namespace);
                Ok(vec![R::fallback(namespace)])
            }
        }
    }

    pub async fn get(&self, namespace: &str, name: &str) -> Result<R> {
        let store = self.live().await?;
        let key = NamespacedName::new(namespace, name);
        let object = store
            .get(R::KIND, namespace, name)
            .await
            .map_err(|e| Error::from_kube(R::KIND, &key, e))?;
        Ok(R::from_object(object))
    }

    pub async fn create(&self, request: ResourceRequest, namespace: Option<&str>) -> Result<R> {
        let namespace = namespace.unwrap_or(&self.default_namespace);
        let key = NamespacedName::new(namespace, request.name.as_str());
        let mut object = request.into_object(R::KIND, namespace);

        match self.target(self.writes).await? {
            Target::Live(store) => {
                let created = store
                    .create(R::KIND, namespace, &object)
                    .await
                    .map_err(|e| Error::from_kube(R::KIND, &key, e))?;
                info!(kind = %R::KIND, namespace, name = %key.name, "created resource");
                Ok(R::from_object(created))
            }
            Target::Fallback => {
                // never persisted, handed back so the UI can render it
                object.metadata.creation_timestamp = Some(metav1::Time(Utc::now()));
                let mut resource = R::from_object(object);
                resource.set_status(ResourceStatus::Pending);
                Ok(resource)
            }
        }
    }

    /// Merges `spec` over the stored spec, top-level keys only, and replaces
    /// the object. Metadata, including the resource version, is carried over.
    pub async fn update(
        &self,
        name: &str,
        spec: Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<R> {
        let store = self.live().await?;
        let namespace = namespace.unwrap_or(&self.default_namespace);
        let key = NamespacedName::new(namespace, name);

        let mut object = store
            .get(R::KIND, namespace, name)
            .await
            .map_err(|e| Error::from_kube(R::KIND, &key, e))?;
        let mut merged = object.data.get("spec").cloned().unwrap_or(Value::Null);
        merge_shallow(&mut merged, &spec);
        match object.data.as_object_mut() {
            Some(data) => {
                data.insert("spec".to_string(), merged);
            }
            None => object.data = json!({ "spec": merged }),
        }

        let updated = store
            .replace(R::KIND, namespace, name, &object)
            .await
            .map_err(|e| Error::from_kube_replace(R::KIND, &key, e))?;
        info!(kind = %R::KIND, namespace, name, "updated resource");
        Ok(R::from_object(updated))
    }

    pub async fn delete(&self, name: &str, namespace: Option<&str>) -> Result<()> {
        let store = self.live().await?;
        let namespace = namespace.unwrap_or(&self.default_namespace);
        let key = NamespacedName::new(namespace, name);
        store
            .delete(R::KIND, namespace, name)
            .await
            .map_err(|e| Error::from_kube(R::KIND, &key, e))?;
        info!(kind = %R::KIND, namespace, name, "deleted resource");
        Ok(())
    }

    async fn target(&self, policy: FallbackPolicy) -> Result<Target> {
        match self.connection.handle().await {
            Some(store) => Ok(Target::Live(store)),
            None => match policy {
                FallbackPolicy::ReturnDeterministicData => Ok(Target::Fallback),
                FallbackPolicy::FailNotConnected => Err(Error::NotConnected),
            },
        }
    }

    async fn live(&self) -> Result<Arc<dyn ResourceStore>> {
        match self.target(FallbackPolicy::FailNotConnected).await? {
            Target::Live(store) => Ok(store),
            Target::Fallback => Err(Error::NotConnected),
        }
    }
}
