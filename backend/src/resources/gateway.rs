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

use gateway_api::apis::standard::constants::{GatewayConditionReason, GatewayConditionType};
use kube::api::DynamicObject;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::client::ManagedResource;
use super::kind::{ObjectIdentity, ResourceKind};
use super::status::{conditions_of, Condition, ResourceStatus};
use crate::consts::READY_CONDITION;
use crate::traits::HasConditions;
use crate::utils::{field, list_field};

/// A Gateway as presented by the dashboard.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResource {
    #[serde(flatten)]
    pub identity: ObjectIdentity,
    pub status: ResourceStatus,
    pub conditions: Vec<Condition>,
    pub gateway_class_name: Option<String>,
    pub listeners: Vec<Listener>,
    /// Addresses assigned by the controller.
    pub addresses: Vec<GatewayAddress>,
    pub raw: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    pub name: String,
    pub port: i32,
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<ListenerTls>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerTls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default)]
    pub certificate_refs: Vec<SecretRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayAddress {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    pub value: String,
}

impl HasConditions for GatewayResource {
    fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}

impl ManagedResource for GatewayResource {
    const KIND: ResourceKind = ResourceKind::Gateway;

    fn from_object(object: DynamicObject) -> Self {
        let spec = object.data.get("spec").cloned().unwrap_or(Value::Null);
        let status = object.data.get("status");

        let mut gateway = GatewayResource {
            identity: ObjectIdentity::of(&object),
            status: ResourceStatus::Unknown,
            conditions: conditions_of(status),
            gateway_class_name: field(&spec, "gatewayClassName"),
            listeners: list_field(&spec, "listeners"),
            addresses: status
                .map(|s| list_field(s, "addresses"))
                .unwrap_or_default(),
            raw: serde_json::to_value(&object).unwrap_or(Value::Null),
        };
        gateway.status = gateway.derived_status();
        gateway
    }

    fn fallback(namespace: &str) -> Self {
        let object = Self::KIND.fallback_object(
            namespace,
            "eg",
            json!({
                "spec": {
                    "gatewayClassName": "eg",
                    "listeners": [{
                        "name": "http",
                        "protocol": "HTTP",
                        "port": 80
                    }]
                },
                "status": {
                    "addresses": [{ "type": "IPAddress", "value": "127.0.0.1" }],
                    "conditions": [
                        {
                            "type": GatewayConditionType::Accepted.to_string(),
                            "status": "True",
                            "reason": GatewayConditionReason::Accepted.to_string(),
                            "message": "The Gateway has been scheduled by Envoy Gateway"
                        },
                        {
                            "type": GatewayConditionType::Programmed.to_string(),
                            "status": "True",
                            "reason": GatewayConditionReason::Programmed.to_string(),
                            "message": "Address assigned to the Gateway, 1/1 envoy replicas available"
                        },
                        {
                            "type": READY_CONDITION,
                            "status": "True",
                            "message": "Gateway is ready"
                        }
                    ]
                }
            }),
        );
        Self::from_object(object)
    }

    fn set_status(&mut self, status: ResourceStatus) {
        self.status = status;
    }
}
