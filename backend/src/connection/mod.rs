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

//! Establishes the connection to the Kubernetes API server.
//!
//! The kubeconfig Docker Desktop writes points at `127.0.0.1:<port>`, which is
//! unreachable from inside the extension container, and the cluster serves a
//! self-signed certificate. The [`Bootstrapper`] tries an ordered list of
//! [`Strategy`] descriptors until one of them answers a probe.

mod bootstrap;
mod connector;
mod context;
mod strategy;

pub use bootstrap::{
    BootstrapSettings, Bootstrapper, ConnectionState, Diagnostics, KubeconfigDiagnostics,
    StrategyDiagnostics,
};
pub use connector::{Connector, KubeConnector};
pub use context::{ConnectionContext, ContextSource, KubeconfigSource};
pub use strategy::Strategy;
