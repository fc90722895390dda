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

//! Backend core of the Envoy Gateway dashboard extension.
//!
//! The [`connection`] module finds a working way to reach the Kubernetes API
//! from inside the Docker Desktop extension container. The [`resources`]
//! module layers typed CRUD over the Gateway API `Gateway` and `HTTPRoute`
//! kinds on top of it, degrading to deterministic data when no cluster is
//! reachable.

use thiserror::Error;

pub mod config;
pub mod connection;
pub mod consts;
pub mod resources;
pub mod traits;

mod utils;

pub use connection::{
    Bootstrapper, BootstrapSettings, ConnectionContext, ConnectionState, Connector, Diagnostics,
    KubeConnector, KubeconfigSource, Strategy,
};
pub use resources::{
    FallbackPolicy, GatewayClient, GatewayResource, KubeStore, ResourceClient, ResourceKind,
    ResourceRequest, ResourceStatus, ResourceStore, RouteClient, RouteResource,
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("kubeconfig error: {0}")]
    KubeconfigError(String),
    #[error("invalid configuration: `{0}`")]
    InvalidConfigError(String),
    #[error("in-cluster configuration unavailable: {0}")]
    InCluster(String),
    #[error("connection strategy {strategy} failed: {message}")]
    StrategyFailure { strategy: String, message: String },
    #[error("not connected to a Kubernetes cluster")]
    NotConnected,
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: ResourceKind,
        namespace: String,
        name: String,
    },
    #[error("{kind} {namespace}/{name} already exists")]
    AlreadyExists {
        kind: ResourceKind,
        namespace: String,
        name: String,
    },
    #[error("{kind} {namespace}/{name} was modified concurrently: {message}")]
    Conflict {
        kind: ResourceKind,
        namespace: String,
        name: String,
        message: String,
    },
    #[error("error querying Gateway API CRDs: `{0}`; are the CRDs installed?")]
    CRDNotFoundError(#[source] kube::Error),
    #[error("kubernetes API error: {0}")]
    UpstreamError(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub struct NamespacedName {
    pub name: String,
    pub namespace: String,
}

impl NamespacedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl Error {
    // Classifies an error returned by the API server for the given object.
    pub(crate) fn from_kube(kind: ResourceKind, key: &NamespacedName, error: kube::Error) -> Self {
        match error {
            kube::Error::Api(response) if response.code == 404 => Error::NotFound {
                kind,
                namespace: key.namespace.clone(),
                name: key.name.clone(),
            },
            kube::Error::Api(response) if response.code == 409 => Error::AlreadyExists {
                kind,
                namespace: key.namespace.clone(),
                name: key.name.clone(),
            },
            other => Error::upstream(other),
        }
    }

    // A 409 on replace means the resource version went stale, not a duplicate.
    pub(crate) fn from_kube_replace(
        kind: ResourceKind,
        key: &NamespacedName,
        error: kube::Error,
    ) -> Self {
        match error {
            kube::Error::Api(response) if response.code == 409 => Error::Conflict {
                kind,
                namespace: key.namespace.clone(),
                name: key.name.clone(),
                message: response.message,
            },
            other => Error::from_kube(kind, key, other),
        }
    }

    // Collection reads have no object to miss; a 404 means the kind is not served.
    pub(crate) fn from_kube_list(error: kube::Error) -> Self {
        if matches!(&error, kube::Error::Api(response) if response.code == 404) {
            return Error::CRDNotFoundError(error);
        }
        Error::upstream(error)
    }

    fn upstream(error: kube::Error) -> Self {
        match error {
            kube::Error::Api(response) => Error::UpstreamError(response.message),
            other => Error::UpstreamError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;

    fn api_error(code: u16, message: &str) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: message.to_string(),
            reason: String::new(),
            code,
        })
    }

    #[test]
    fn test_kube_error_classification() {
        let key = NamespacedName::new("default", "eg");

        let err = Error::from_kube(ResourceKind::Gateway, &key, api_error(404, "missing"));
        assert!(matches!(err, Error::NotFound { .. }));

        let err = Error::from_kube(ResourceKind::HttpRoute, &key, api_error(409, "taken"));
        assert!(matches!(err, Error::AlreadyExists { .. }));
        assert_eq!(err.to_string(), "HTTPRoute default/eg already exists");

        let err = Error::from_kube(ResourceKind::Gateway, &key, api_error(403, "forbidden"));
        match err {
            Error::UpstreamError(message) => assert_eq!(message, "forbidden"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_replace_conflict_is_not_a_duplicate() {
        let key = NamespacedName::new("default", "eg");

        let err = Error::from_kube_replace(
            ResourceKind::Gateway,
            &key,
            api_error(409, "the object has been modified"),
        );
        match err {
            Error::Conflict { kind, message, .. } => {
                assert_eq!(kind, ResourceKind::Gateway);
                assert_eq!(message, "the object has been modified");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = Error::from_kube_replace(ResourceKind::Gateway, &key, api_error(404, "gone"));
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_list_error_classification() {
        let err = Error::from_kube_list(api_error(404, "not found"));
        assert!(matches!(err, Error::CRDNotFoundError(_)));

        let err = Error::from_kube_list(api_error(403, "forbidden"));
        match err {
            Error::UpstreamError(message) => assert_eq!(message, "forbidden"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
