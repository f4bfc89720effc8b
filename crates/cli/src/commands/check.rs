//! Node listing followed by the topology manager policy of one node

use anyhow::Result;
use configz_lib::{first_node_name, list_nodes, ConfigzClient, NodeSummary, TopologyManagerPolicy};
use serde::Serialize;

use super::{configz, nodes};
use crate::output::{print_json, OutputFormat};

/// Combined result printed for `--format json`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReport<'a> {
    nodes: &'a [NodeSummary],
    node: &'a str,
    topology_manager_policy: TopologyManagerPolicy,
}

pub async fn run_check(
    client: &ConfigzClient,
    kube_client: &kube::Client,
    node: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let listed = nodes::show_nodes(kube_client, format).await?;
            let node = pick_node(&listed, node)?;
            println!();
            configz::show_topology(client, &node, format).await
        }
        OutputFormat::Json => {
            let listed = list_nodes(kube_client).await?;
            let node = pick_node(&listed, node)?;
            let config = configz::fetch(client, &node).await?;
            print_json(&CheckReport {
                nodes: &listed,
                node: &node,
                topology_manager_policy: config.topology_manager_policy,
            })
        }
    }
}

fn pick_node(listed: &[NodeSummary], node: Option<String>) -> Result<String> {
    match node {
        Some(node) => Ok(node),
        None => Ok(first_node_name(listed)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str) -> NodeSummary {
        NodeSummary {
            name: name.to_string(),
            status: "Ready".to_string(),
            roles: vec!["control-plane".to_string()],
            kubelet_version: Some("v1.28.0".to_string()),
            created: None,
        }
    }

    #[test]
    fn test_report_is_one_json_document() {
        let listed = vec![summary("kind-control-plane"), summary("kind-worker")];
        let report = CheckReport {
            nodes: &listed,
            node: "kind-worker",
            topology_manager_policy: TopologyManagerPolicy::BestEffort,
        };

        let json = serde_json::to_string_pretty(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["node"], "kind-worker");
        assert_eq!(value["topologyManagerPolicy"], "best-effort");
        assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(value["nodes"][0]["name"], "kind-control-plane");
        assert_eq!(value["nodes"][1]["kubeletVersion"], "v1.28.0");
    }

    #[test]
    fn test_pick_node_prefers_explicit_name() {
        let listed = vec![summary("a"), summary("b")];

        assert_eq!(pick_node(&listed, Some("b".to_string())).unwrap(), "b");
        assert_eq!(pick_node(&listed, None).unwrap(), "a");
        assert!(pick_node(&[], None).is_err());
    }
}
