// API group served by the Gateway API CRDs.
pub const GATEWAY_API_GROUP: &str = "gateway.networking.k8s.io";

// API version the dashboard reads and writes.
pub const GATEWAY_API_VERSION: &str = "v1beta1";

// Namespace used when the caller does not provide one.
pub const DEFAULT_NAMESPACE: &str = "default";

// Hostname under which Docker Desktop exposes the host to containers.
pub const DOCKER_HOST_ALIAS: &str = "host.docker.internal";

// Older Docker Desktop for Mac alias of the host, tried last.
pub const LAST_RESORT_HOST_ALIAS: &str = "docker.for.mac.localhost";

// Port Docker Desktop publishes the Kubernetes API server on.
pub const KUBE_API_PORT: u16 = 6443;

// Server hosts that only make sense from the host itself, not from a container.
pub const LOOPBACK_HOSTS: &[&str] = &["127.0.0.1", "localhost", "0.0.0.0", "::1", "[::1]"];

// Condition type reported once a resource is fully programmed by its controller.
pub const READY_CONDITION: &str = "Ready";

// Names of the connection strategies, in the order they are tried.
pub const STRATEGY_DOCKER_HOST_ALIAS: &str = "kubeconfig-docker-host-alias";
pub const STRATEGY_FORCED_API_PORT: &str = "kubeconfig-forced-api-port";
pub const STRATEGY_SYNTHETIC_DOCKER_HOST: &str = "synthetic-docker-host";
pub const STRATEGY_INSECURE_KUBECONFIG: &str = "kubeconfig-insecure";
pub const STRATEGY_IN_CLUSTER: &str = "in-cluster";
pub const STRATEGY_LAST_RESORT: &str = "last-resort-mac-localhost";
