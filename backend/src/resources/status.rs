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

use gateway_api::apis::standard::constants::GatewayConditionType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::READY_CONDITION;
use crate::utils::list_field;

/// Summary status shown for a Gateway or HTTPRoute.
///
/// Resources move through `Unknown -> Pending -> Accepted | NotAccepted ->
/// Ready | NotReady` as their controller updates conditions; the dashboard
/// only observes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceStatus {
    #[default]
    Unknown,
    Pending,
    Accepted,
    NotAccepted,
    Ready,
    NotReady,
}

/// A status condition as reported by a controller. Only `type` and `status`
/// are required.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

impl Condition {
    pub fn new(type_: impl Into<String>, status: bool) -> Self {
        Self {
            type_: type_.into(),
            status: if status { "True" } else { "False" }.to_string(),
            ..Default::default()
        }
    }

    fn is_true(&self) -> bool {
        self.status == "True"
    }
}

/// Derives the summary status from a condition list. `Ready` is the stronger
/// signal and wins over `Accepted` wherever it appears in the list.
pub fn derive_status(conditions: &[Condition]) -> ResourceStatus {
    let find = |type_: &str| conditions.iter().find(|c| c.type_ == type_);

    if let Some(ready) = find(READY_CONDITION) {
        return if ready.is_true() {
            ResourceStatus::Ready
        } else {
            ResourceStatus::NotReady
        };
    }
    if let Some(accepted) = find(GatewayConditionType::Accepted.to_string().as_str()) {
        return if accepted.is_true() {
            ResourceStatus::Accepted
        } else {
            ResourceStatus::NotAccepted
        };
    }
    ResourceStatus::Unknown
}

// Gateways report conditions on the status itself, routes report them per
// parent. Both shapes are accepted.
pub(crate) fn conditions_of(status: Option<&Value>) -> Vec<Condition> {
    let Some(status) = status else {
        return vec![];
    };
    let own: Vec<Condition> = list_field(status, "conditions");
    if !own.is_empty() {
        return own;
    }
    status
        .get("parents")
        .and_then(Value::as_array)
        .map(|parents| {
            parents
                .iter()
                .flat_map(|parent| list_field::<Condition>(parent, "conditions"))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_conditions_are_unknown() {
        assert_eq!(derive_status(&[]), ResourceStatus::Unknown);
        assert!(conditions_of(None).is_empty());
        assert!(conditions_of(Some(&json!({}))).is_empty());
    }

    #[test]
    fn test_ready_wins_over_accepted() {
        let conditions = vec![
            Condition::new("Accepted", true),
            Condition::new("Ready", false),
        ];
        assert_eq!(derive_status(&conditions), ResourceStatus::NotReady);

        let conditions = vec![
            Condition::new("Ready", true),
            Condition::new("Accepted", false),
        ];
        assert_eq!(derive_status(&conditions), ResourceStatus::Ready);
    }

    #[test]
    fn test_accepted() {
        assert_eq!(
            derive_status(&[Condition::new("Accepted", true)]),
            ResourceStatus::Accepted
        );
        assert_eq!(
            derive_status(&[Condition::new("Accepted", false)]),
            ResourceStatus::NotAccepted
        );
    }

    #[test]
    fn test_other_conditions_are_unknown() {
        assert_eq!(
            derive_status(&[Condition::new("Programmed", true)]),
            ResourceStatus::Unknown
        );
    }

    #[test]
    fn test_route_parent_conditions() {
        let status = json!({
            "parents": [{
                "parentRef": { "name": "eg" },
                "controllerName": "gateway.envoyproxy.io/gatewayclass-controller",
                "conditions": [
                    { "type": "Accepted", "status": "True", "reason": "Accepted" },
                    { "type": "ResolvedRefs", "status": "True" }
                ]
            }]
        });
        let conditions = conditions_of(Some(&status));
        assert_eq!(conditions.len(), 2);
        assert_eq!(derive_status(&conditions), ResourceStatus::Accepted);
    }

    #[test]
    fn test_malformed_conditions_are_skipped() {
        let status = json!({
            "conditions": [
                { "type": "Ready" },
                { "type": "Accepted", "status": "False" }
            ]
        });
        assert_eq!(
            derive_status(&conditions_of(Some(&status))),
            ResourceStatus::NotAccepted
        );
    }
}
