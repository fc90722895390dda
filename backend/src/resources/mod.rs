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

//! Typed CRUD over the Gateway API kinds shown by the dashboard.

mod client;
mod gateway;
mod kind;
mod route;
mod status;
mod store;

pub use client::{
    FallbackPolicy, GatewayClient, ManagedResource, ResourceClient, ResourceRequest, RouteClient,
};
pub use gateway::{GatewayAddress, GatewayResource, Listener, ListenerTls, SecretRef};
pub use kind::{ObjectIdentity, ResourceKind};
pub use route::{
    BackendRef, HeaderMatch, ParentRef, PathMatch, RouteMatch, RouteResource, RouteRule,
};
pub use status::{derive_status, Condition, ResourceStatus};
pub use store::{KubeStore, ResourceStore};
