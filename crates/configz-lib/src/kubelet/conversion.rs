//! v1beta1 → canonical conversion
//!
//! Absent fields take the kubelet's documented v1beta1 defaults.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use super::{parse_go_duration, v1beta1, KubeletConfiguration};
use crate::error::ConversionError;

const DEFAULT_SYNC_FREQUENCY: Duration = Duration::from_secs(60);
const DEFAULT_FILE_CHECK_FREQUENCY: Duration = Duration::from_secs(20);
const DEFAULT_HTTP_CHECK_FREQUENCY: Duration = Duration::from_secs(20);
const DEFAULT_CPU_MANAGER_RECONCILE_PERIOD: Duration = Duration::from_secs(10);
const DEFAULT_NODE_STATUS_UPDATE_FREQUENCY: Duration = Duration::from_secs(10);
const DEFAULT_STREAMING_CONNECTION_IDLE_TIMEOUT: Duration = Duration::from_secs(4 * 3600);

const DEFAULT_PORT: u16 = 10250;
const DEFAULT_HEALTHZ_PORT: u16 = 10248;
const DEFAULT_MAX_PODS: i32 = 110;
const DEFAULT_IMAGE_GC_HIGH_THRESHOLD: i32 = 85;
const DEFAULT_IMAGE_GC_LOW_THRESHOLD: i32 = 80;
const DEFAULT_CONTAINER_RUNTIME_ENDPOINT: &str = "unix:///run/containerd/containerd.sock";

const DEFAULT_EVICTION_HARD: &[(&str, &str)] = &[
    ("imagefs.available", "15%"),
    ("memory.available", "100Mi"),
    ("nodefs.available", "10%"),
    ("nodefs.inodesFree", "5%"),
];

/// Convert a v1beta1 payload into the canonical configuration
pub fn convert_v1beta1(
    src: &v1beta1::KubeletConfiguration,
) -> Result<KubeletConfiguration, ConversionError> {
    Ok(KubeletConfiguration {
        static_pod_path: string_or(&src.static_pod_path, ""),
        sync_frequency: duration_or("syncFrequency", &src.sync_frequency, DEFAULT_SYNC_FREQUENCY)?,
        file_check_frequency: duration_or(
            "fileCheckFrequency",
            &src.file_check_frequency,
            DEFAULT_FILE_CHECK_FREQUENCY,
        )?,
        http_check_frequency: duration_or(
            "httpCheckFrequency",
            &src.http_check_frequency,
            DEFAULT_HTTP_CHECK_FREQUENCY,
        )?,

        address: string_or(&src.address, "0.0.0.0"),
        port: port_or("port", src.port, DEFAULT_PORT)?,
        read_only_port: port_or("readOnlyPort", src.read_only_port, 0)?,
        healthz_port: port_or("healthzPort", src.healthz_port, DEFAULT_HEALTHZ_PORT)?,
        healthz_bind_address: string_or(&src.healthz_bind_address, "127.0.0.1"),
        tls_cert_file: string_or(&src.tls_cert_file, ""),
        tls_private_key_file: string_or(&src.tls_private_key_file, ""),

        cluster_domain: string_or(&src.cluster_domain, ""),
        cluster_dns: src.cluster_dns.clone().unwrap_or_default(),

        max_pods: src.max_pods.unwrap_or(DEFAULT_MAX_PODS),
        pod_pids_limit: src.pod_pids_limit.unwrap_or(-1),

        cgroup_driver: string_or(&src.cgroup_driver, "cgroupfs"),
        cgroups_per_qos: src.cgroups_per_qos.unwrap_or(true),
        cgroup_root: string_or(&src.cgroup_root, ""),

        cpu_manager_policy: string_or(&src.cpu_manager_policy, "none"),
        cpu_manager_reconcile_period: duration_or(
            "cpuManagerReconcilePeriod",
            &src.cpu_manager_reconcile_period,
            DEFAULT_CPU_MANAGER_RECONCILE_PERIOD,
        )?,
        memory_manager_policy: string_or(&src.memory_manager_policy, "None"),
        topology_manager_policy: enum_or_default(
            "topologyManagerPolicy",
            &src.topology_manager_policy,
        )?,
        topology_manager_scope: enum_or_default("topologyManagerScope", &src.topology_manager_scope)?,
        topology_manager_policy_options: src
            .topology_manager_policy_options
            .clone()
            .unwrap_or_default(),
        reserved_system_cpus: string_or(&src.reserved_system_cpus, ""),

        image_gc_high_threshold_percent: src
            .image_gc_high_threshold_percent
            .unwrap_or(DEFAULT_IMAGE_GC_HIGH_THRESHOLD),
        image_gc_low_threshold_percent: src
            .image_gc_low_threshold_percent
            .unwrap_or(DEFAULT_IMAGE_GC_LOW_THRESHOLD),
        serialize_image_pulls: src.serialize_image_pulls.unwrap_or(true),

        eviction_hard: src.eviction_hard.clone().unwrap_or_else(|| {
            DEFAULT_EVICTION_HARD
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>()
        }),
        system_reserved: src.system_reserved.clone().unwrap_or_default(),
        kube_reserved: src.kube_reserved.clone().unwrap_or_default(),
        enforce_node_allocatable: src
            .enforce_node_allocatable
            .clone()
            .unwrap_or_else(|| vec!["pods".to_string()]),

        feature_gates: src.feature_gates.clone().unwrap_or_default(),
        fail_swap_on: src.fail_swap_on.unwrap_or(true),
        node_status_update_frequency: duration_or(
            "nodeStatusUpdateFrequency",
            &src.node_status_update_frequency,
            DEFAULT_NODE_STATUS_UPDATE_FREQUENCY,
        )?,
        streaming_connection_idle_timeout: duration_or(
            "streamingConnectionIdleTimeout",
            &src.streaming_connection_idle_timeout,
            DEFAULT_STREAMING_CONNECTION_IDLE_TIMEOUT,
        )?,
        hairpin_mode: string_or(&src.hairpin_mode, "promiscuous-bridge"),
        container_runtime_endpoint: string_or(
            &src.container_runtime_endpoint,
            DEFAULT_CONTAINER_RUNTIME_ENDPOINT,
        ),
    })
}

/// Empty strings count as unset, matching the kubelet's defaulting
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn string_or(value: &Option<String>, default: &str) -> String {
    present(value).unwrap_or(default).to_string()
}

fn duration_or(
    field: &'static str,
    value: &Option<String>,
    default: Duration,
) -> Result<Duration, ConversionError> {
    match present(value) {
        Some(raw) => parse_go_duration(raw).map_err(|source| ConversionError::InvalidDuration {
            field,
            value: raw.to_string(),
            source,
        }),
        None => Ok(default),
    }
}

fn port_or(field: &'static str, value: Option<i32>, default: u16) -> Result<u16, ConversionError> {
    match value {
        Some(port) => u16::try_from(port).map_err(|_| ConversionError::InvalidValue {
            field,
            value: port.to_string(),
        }),
        None => Ok(default),
    }
}

fn enum_or_default<T: FromStr + Default>(
    field: &'static str,
    value: &Option<String>,
) -> Result<T, ConversionError> {
    match present(value) {
        Some(raw) => raw.parse().map_err(|_| ConversionError::InvalidValue {
            field,
            value: raw.to_string(),
        }),
        None => Ok(T::default()),
    }
}
