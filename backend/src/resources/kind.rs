use std::fmt;

use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use kube::{api::DynamicObject, discovery::ApiResource, ResourceExt};
use serde::Serialize;
use serde_json::Value;

use crate::consts::{DEFAULT_NAMESPACE, GATEWAY_API_GROUP, GATEWAY_API_VERSION};

/// The custom resource kinds managed by the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceKind {
    Gateway,
    #[serde(rename = "HTTPRoute")]
    HttpRoute,
}

impl ResourceKind {
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceKind::Gateway => "Gateway",
            ResourceKind::HttpRoute => "HTTPRoute",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Gateway => "gateways",
            ResourceKind::HttpRoute => "httproutes",
        }
    }

    pub fn api_resource(&self) -> ApiResource {
        ApiResource {
            group: GATEWAY_API_GROUP.to_string(),
            version: GATEWAY_API_VERSION.to_string(),
            api_version: format!("{GATEWAY_API_GROUP}/{GATEWAY_API_VERSION}"),
            kind: self.kind().to_string(),
            plural: self.plural().to_string(),
        }
    }

    /// A new object of this kind carrying `data` (spec and status).
    pub fn object(&self, namespace: &str, name: &str, data: Value) -> DynamicObject {
        DynamicObject::new(name, &self.api_resource())
            .within(namespace)
            .data(data)
    }

    // Metadata of the canned objects served while disconnected. Fixed so
    // repeated reads render identically.
    pub(crate) fn fallback_object(
        &self,
        namespace: &str,
        name: &str,
        data: Value,
    ) -> DynamicObject {
        let mut object = self.object(namespace, name, data);
        object.metadata.uid = Some(format!("fallback-{}-{}", self.plural(), name));
        object.metadata.creation_timestamp =
            DateTime::from_timestamp(1_704_067_200, 0).map(metav1::Time);
        object
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Identity fields shared by every managed resource.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectIdentity {
    pub name: String,
    pub namespace: String,
    pub uid: Option<String>,
    pub creation_timestamp: Option<DateTime<Utc>>,
}

impl ObjectIdentity {
    pub fn of(object: &DynamicObject) -> Self {
        Self {
            name: object.name_any(),
            namespace: object
                .namespace()
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            uid: object.uid(),
            creation_timestamp: object.metadata.creation_timestamp.as_ref().map(|t| t.0),
        }
    }
}
