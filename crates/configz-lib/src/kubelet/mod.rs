//! Kubelet configuration types
//!
//! [`KubeletConfiguration`] is the canonical, version-independent form.
//! Versioned wire shapes live in submodules and reach it through the
//! [`Scheme`](crate::scheme::Scheme).

mod conversion;
mod duration;
pub mod v1beta1;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

pub use conversion::convert_v1beta1;
pub use duration::{format_go_duration, parse_go_duration, DurationParseError};

/// Canonical kubelet configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeletConfiguration {
    pub static_pod_path: String,
    #[serde(serialize_with = "duration::serialize")]
    pub sync_frequency: Duration,
    #[serde(serialize_with = "duration::serialize")]
    pub file_check_frequency: Duration,
    #[serde(serialize_with = "duration::serialize")]
    pub http_check_frequency: Duration,

    pub address: String,
    pub port: u16,
    /// 0 disables the read-only port
    pub read_only_port: u16,
    pub healthz_port: u16,
    pub healthz_bind_address: String,
    pub tls_cert_file: String,
    pub tls_private_key_file: String,

    pub cluster_domain: String,
    pub cluster_dns: Vec<String>,

    pub max_pods: i32,
    pub pod_pids_limit: i64,

    pub cgroup_driver: String,
    pub cgroups_per_qos: bool,
    pub cgroup_root: String,

    pub cpu_manager_policy: String,
    #[serde(serialize_with = "duration::serialize")]
    pub cpu_manager_reconcile_period: Duration,
    pub memory_manager_policy: String,
    pub topology_manager_policy: TopologyManagerPolicy,
    pub topology_manager_scope: TopologyManagerScope,
    pub topology_manager_policy_options: BTreeMap<String, String>,
    pub reserved_system_cpus: String,

    pub image_gc_high_threshold_percent: i32,
    pub image_gc_low_threshold_percent: i32,
    pub serialize_image_pulls: bool,

    pub eviction_hard: BTreeMap<String, String>,
    pub system_reserved: BTreeMap<String, String>,
    pub kube_reserved: BTreeMap<String, String>,
    pub enforce_node_allocatable: Vec<String>,

    pub feature_gates: BTreeMap<String, bool>,
    pub fail_swap_on: bool,
    #[serde(serialize_with = "duration::serialize")]
    pub node_status_update_frequency: Duration,
    #[serde(serialize_with = "duration::serialize")]
    pub streaming_connection_idle_timeout: Duration,
    pub hairpin_mode: String,
    pub container_runtime_endpoint: String,
}

/// Unrecognized value for a kubelet enum setting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// NUMA alignment strategy of the topology manager
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopologyManagerPolicy {
    #[default]
    None,
    BestEffort,
    Restricted,
    SingleNumaNode,
}

impl TopologyManagerPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopologyManagerPolicy::None => "none",
            TopologyManagerPolicy::BestEffort => "best-effort",
            TopologyManagerPolicy::Restricted => "restricted",
            TopologyManagerPolicy::SingleNumaNode => "single-numa-node",
        }
    }
}

impl FromStr for TopologyManagerPolicy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(TopologyManagerPolicy::None),
            "best-effort" => Ok(TopologyManagerPolicy::BestEffort),
            "restricted" => Ok(TopologyManagerPolicy::Restricted),
            "single-numa-node" => Ok(TopologyManagerPolicy::SingleNumaNode),
            other => Err(ParseEnumError {
                kind: "topology manager policy",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for TopologyManagerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Granularity at which the topology manager aligns resources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TopologyManagerScope {
    #[default]
    Container,
    Pod,
}

impl TopologyManagerScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopologyManagerScope::Container => "container",
            TopologyManagerScope::Pod => "pod",
        }
    }
}

impl FromStr for TopologyManagerScope {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "container" => Ok(TopologyManagerScope::Container),
            "pod" => Ok(TopologyManagerScope::Pod),
            other => Err(ParseEnumError {
                kind: "topology manager scope",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for TopologyManagerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
