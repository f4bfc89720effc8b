//! Kubelet configuration commands

use anyhow::{Context, Result};
use colored::Colorize;
use configz_lib::kubelet::format_go_duration;
use configz_lib::{ConfigzClient, KubeletConfiguration};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::output::{join_or_none, print_heading, print_json, OutputFormat};

/// Topology manager settings of one node
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TopologyReport<'a> {
    node: &'a str,
    topology_manager_policy: &'static str,
    topology_manager_scope: &'static str,
    topology_manager_policy_options: &'a BTreeMap<String, String>,
}

pub async fn fetch(client: &ConfigzClient, node: &str) -> Result<KubeletConfiguration> {
    client
        .fetch(node)
        .await
        .with_context(|| format!("Failed to get kubelet configuration of node '{}'", node))
}

/// Print the topology manager policy of a node
pub async fn show_topology(client: &ConfigzClient, node: &str, format: OutputFormat) -> Result<()> {
    let config = fetch(client, node).await?;

    match format {
        OutputFormat::Json => print_json(&TopologyReport {
            node,
            topology_manager_policy: config.topology_manager_policy.as_str(),
            topology_manager_scope: config.topology_manager_scope.as_str(),
            topology_manager_policy_options: &config.topology_manager_policy_options,
        })?,
        OutputFormat::Table => {
            println!(
                "our topology manager policy is {}",
                config.topology_manager_policy.as_str().cyan()
            );
        }
    }

    Ok(())
}

/// Print the full kubelet configuration of a node
pub async fn show_configz(client: &ConfigzClient, node: &str, format: OutputFormat) -> Result<()> {
    let config = fetch(client, node).await?;

    match format {
        OutputFormat::Json => print_json(&config)?,
        OutputFormat::Table => print_config(node, &config),
    }

    Ok(())
}

fn print_config(node: &str, config: &KubeletConfiguration) {
    println!("{}", "Kubelet Configuration".bold());
    println!("{}", "=".repeat(60));
    println!("Node:                        {}", node.cyan());
    println!();

    print_heading("Topology", 60);
    println!(
        "Topology Manager Policy:     {}",
        config.topology_manager_policy.as_str().cyan()
    );
    println!(
        "Topology Manager Scope:      {}",
        config.topology_manager_scope
    );
    println!(
        "Policy Options:              {}",
        format_map(&config.topology_manager_policy_options)
    );
    println!("CPU Manager Policy:          {}", config.cpu_manager_policy);
    println!(
        "CPU Reconcile Period:        {}",
        format_go_duration(config.cpu_manager_reconcile_period)
    );
    println!("Memory Manager Policy:       {}", config.memory_manager_policy);
    println!(
        "Reserved System CPUs:        {}",
        or_none(&config.reserved_system_cpus)
    );
    println!();

    print_heading("Serving", 60);
    println!("Address:                     {}:{}", config.address, config.port);
    println!("Read-Only Port:              {}", config.read_only_port);
    println!(
        "Healthz:                     {}:{}",
        config.healthz_bind_address, config.healthz_port
    );
    println!("Cluster Domain:              {}", or_none(&config.cluster_domain));
    println!("Cluster DNS:                 {}", join_or_none(&config.cluster_dns));
    println!(
        "Runtime Endpoint:            {}",
        config.container_runtime_endpoint
    );
    println!();

    print_heading("Resources", 60);
    println!("Max Pods:                    {}", config.max_pods);
    println!("Pod PIDs Limit:              {}", config.pod_pids_limit);
    println!(
        "Cgroup Driver:               {} (per QoS: {})",
        config.cgroup_driver, config.cgroups_per_qos
    );
    println!("System Reserved:             {}", format_map(&config.system_reserved));
    println!("Kube Reserved:               {}", format_map(&config.kube_reserved));
    println!("Eviction Hard:               {}", format_map(&config.eviction_hard));
    println!(
        "Enforce Allocatable:         {}",
        join_or_none(&config.enforce_node_allocatable)
    );
    println!(
        "Image GC Thresholds:         {}% / {}%",
        config.image_gc_low_threshold_percent, config.image_gc_high_threshold_percent
    );
    println!("Fail Swap On:                {}", config.fail_swap_on);
    println!();

    print_heading("Timing", 60);
    println!(
        "Sync Frequency:              {}",
        format_go_duration(config.sync_frequency)
    );
    println!(
        "Node Status Update:          {}",
        format_go_duration(config.node_status_update_frequency)
    );
    println!(
        "Streaming Idle Timeout:      {}",
        format_go_duration(config.streaming_connection_idle_timeout)
    );

    if !config.feature_gates.is_empty() {
        println!();
        print_heading("Feature Gates", 60);
        for (gate, enabled) in &config.feature_gates {
            let state = if *enabled {
                "enabled".green()
            } else {
                "disabled".red()
            };
            println!("{:<29}{}", gate, state);
        }
    }
}

fn format_map(map: &BTreeMap<String, String>) -> String {
    if map.is_empty() {
        return "<none>".to_string();
    }
    map.iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

fn or_none(value: &str) -> &str {
    if value.is_empty() {
        "<none>"
    } else {
        value
    }
}
