//! `kubelet.config.k8s.io/v1beta1` wire shape
//!
//! Every field is optional: `/configz` omits unset values and older kubelets
//! do not know newer fields. Unknown fields are ignored.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::scheme::{GroupVersion, VersionedConfig};

/// Kubelet configuration as served by `/configz`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeletConfiguration {
    pub kind: Option<String>,
    pub api_version: Option<String>,

    pub static_pod_path: Option<String>,
    pub sync_frequency: Option<String>,
    pub file_check_frequency: Option<String>,
    pub http_check_frequency: Option<String>,

    pub address: Option<String>,
    pub port: Option<i32>,
    pub read_only_port: Option<i32>,
    pub healthz_port: Option<i32>,
    pub healthz_bind_address: Option<String>,
    pub tls_cert_file: Option<String>,
    pub tls_private_key_file: Option<String>,

    pub cluster_domain: Option<String>,
    #[serde(rename = "clusterDNS")]
    pub cluster_dns: Option<Vec<String>>,

    pub max_pods: Option<i32>,
    pub pod_pids_limit: Option<i64>,

    pub cgroup_driver: Option<String>,
    #[serde(rename = "cgroupsPerQOS")]
    pub cgroups_per_qos: Option<bool>,
    pub cgroup_root: Option<String>,

    pub cpu_manager_policy: Option<String>,
    pub cpu_manager_reconcile_period: Option<String>,
    pub memory_manager_policy: Option<String>,
    pub topology_manager_policy: Option<String>,
    pub topology_manager_scope: Option<String>,
    pub topology_manager_policy_options: Option<BTreeMap<String, String>>,
    #[serde(rename = "reservedSystemCPUs")]
    pub reserved_system_cpus: Option<String>,

    #[serde(rename = "imageGCHighThresholdPercent")]
    pub image_gc_high_threshold_percent: Option<i32>,
    #[serde(rename = "imageGCLowThresholdPercent")]
    pub image_gc_low_threshold_percent: Option<i32>,
    pub serialize_image_pulls: Option<bool>,

    pub eviction_hard: Option<BTreeMap<String, String>>,
    pub system_reserved: Option<BTreeMap<String, String>>,
    pub kube_reserved: Option<BTreeMap<String, String>>,
    pub enforce_node_allocatable: Option<Vec<String>>,

    pub feature_gates: Option<BTreeMap<String, bool>>,
    pub fail_swap_on: Option<bool>,
    pub node_status_update_frequency: Option<String>,
    pub streaming_connection_idle_timeout: Option<String>,
    pub hairpin_mode: Option<String>,
    pub container_runtime_endpoint: Option<String>,
}

impl VersionedConfig for KubeletConfiguration {
    const GROUP_VERSION: GroupVersion = GroupVersion::new("kubelet.config.k8s.io", "v1beta1");
}
