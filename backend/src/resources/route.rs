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

use kube::api::DynamicObject;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::client::ManagedResource;
use super::kind::{ObjectIdentity, ResourceKind};
use super::status::{conditions_of, Condition, ResourceStatus};
use crate::traits::HasConditions;
use crate::utils::list_field;

/// An HTTPRoute as presented by the dashboard.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResource {
    #[serde(flatten)]
    pub identity: ObjectIdentity,
    pub status: ResourceStatus,
    pub conditions: Vec<Condition>,
    /// Gateways this route attaches to. Not validated here; the API server and
    /// the gateway controller own that.
    pub parent_refs: Vec<ParentRef>,
    pub hostnames: Vec<String>,
    pub rules: Vec<RouteRule>,
    pub raw: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRule {
    #[serde(default)]
    pub matches: Vec<RouteMatch>,
    #[serde(default)]
    pub backend_refs: Vec<BackendRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathMatch>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HeaderMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathMatch {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderMatch {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl HasConditions for RouteResource {
    fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}

impl ManagedResource for RouteResource {
    const KIND: ResourceKind = ResourceKind::HttpRoute;

    fn from_object(object: DynamicObject) -> Self {
        let identity = ObjectIdentity::of(&object);
        let spec = object.data.get("spec").cloned().unwrap_or(Value::Null);

        // a parent without a namespace lives next to the route
        let parent_refs = list_field::<ParentRef>(&spec, "parentRefs")
            .into_iter()
            .map(|mut parent| {
                parent
                    .namespace
                    .get_or_insert_with(|| identity.namespace.clone());
                parent
            })
            .collect();

        let mut route = RouteResource {
            status: ResourceStatus::Unknown,
            conditions: conditions_of(object.data.get("status")),
            parent_refs,
            hostnames: list_field(&spec, "hostnames"),
            rules: list_field(&spec, "rules"),
            raw: serde_json::to_value(&object).unwrap_or(Value::Null),
            identity,
        };
        route.status = route.derived_status();
        route
    }

    fn fallback(namespace: &str) -> Self {
        let object = Self::KIND.fallback_object(
            namespace,
            "backend",
            json!({
                "spec": {
                    "parentRefs": [{ "name": "eg" }],
                    "hostnames": ["www.example.com"],
                    "rules": [{
                        "matches": [{
                            "path": { "type": "PathPrefix", "value": "/" }
                        }],
                        "backendRefs": [{
                            "group": "",
                            "kind": "Service",
                            "name": "backend",
                            "port": 3000,
                            "weight": 1
                        }]
                    }]
                },
                "status": {
                    "parents": [{
                        "parentRef": { "name": "eg" },
                        "controllerName": "gateway.envoyproxy.io/gatewayclass-controller",
                        "conditions": [
                            { "type": "Accepted", "status": "True", "reason": "Accepted" },
                            { "type": "ResolvedRefs", "status": "True", "reason": "ResolvedRefs" },
                            { "type": "Ready", "status": "True", "reason": "Ready" }
                        ]
                    }]
                }
            }),
        );
        Self::from_object(object)
    }

    fn set_status(&mut self, status: ResourceStatus) {
        self.status = status;
    }
}
