//! Kubernetes API access: client setup and node listing

use std::path::Path;

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Node;
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig, KubeconfigError};
use kube::{Client, Config};
use serde::Serialize;
use tracing::debug;

use crate::error::ClusterError;

const ROLE_LABEL_PREFIX: &str = "node-role.kubernetes.io/";
const LEGACY_ROLE_LABEL: &str = "kubernetes.io/role";

/// Build a client from an explicit kubeconfig, or from the ambient
/// configuration (in-cluster or `~/.kube/config`) when none is given
pub async fn init_kube_client(kubeconfig: Option<&Path>) -> Result<Client, ClusterError> {
    let client = match kubeconfig {
        Some(path) => {
            let kubeconfig_error = |source: KubeconfigError| ClusterError::Kubeconfig {
                path: path.to_path_buf(),
                source,
            };

            let kubeconfig = Kubeconfig::read_from(path).map_err(kubeconfig_error)?;
            let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(kubeconfig_error)?;
            Client::try_from(config).map_err(ClusterError::Client)?
        }
        None => Client::try_default().await.map_err(ClusterError::Client)?,
    };
    Ok(client)
}

/// One row of the node listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub name: String,
    /// `Ready`, `NotReady` or `Unknown`, with `SchedulingDisabled` appended when cordoned
    pub status: String,
    pub roles: Vec<String>,
    pub kubelet_version: Option<String>,
    pub created: Option<DateTime<Utc>>,
}

impl From<&Node> for NodeSummary {
    fn from(node: &Node) -> Self {
        let ready = node
            .status
            .as_ref()
            .and_then(|s| s.conditions.as_ref())
            .and_then(|conditions| conditions.iter().find(|c| c.type_ == "Ready"))
            .map(|c| c.status.as_str());
        let mut status = match ready {
            Some("True") => "Ready",
            Some("False") => "NotReady",
            _ => "Unknown",
        }
        .to_string();

        let unschedulable = node
            .spec
            .as_ref()
            .and_then(|s| s.unschedulable)
            .unwrap_or(false);
        if unschedulable {
            status.push_str(",SchedulingDisabled");
        }

        let mut roles: Vec<String> = node
            .metadata
            .labels
            .iter()
            .flatten()
            .filter_map(|(key, value)| {
                if let Some(role) = key.strip_prefix(ROLE_LABEL_PREFIX) {
                    (!role.is_empty()).then(|| role.to_string())
                } else if key == LEGACY_ROLE_LABEL && !value.is_empty() {
                    Some(value.clone())
                } else {
                    None
                }
            })
            .collect();
        roles.sort();
        roles.dedup();

        Self {
            name: node.metadata.name.clone().unwrap_or_default(),
            status,
            roles,
            kubelet_version: node
                .status
                .as_ref()
                .and_then(|s| s.node_info.as_ref())
                .map(|info| info.kubelet_version.clone()),
            created: node.metadata.creation_timestamp.as_ref().map(|t| t.0),
        }
    }
}

/// List every node in the cluster
pub async fn list_nodes(client: &Client) -> Result<Vec<NodeSummary>, ClusterError> {
    let api: Api<Node> = Api::all(client.clone());
    let nodes = api
        .list(&ListParams::default())
        .await
        .map_err(ClusterError::ListNodes)?;

    debug!(count = nodes.items.len(), "Listed cluster nodes");
    Ok(nodes.items.iter().map(NodeSummary::from).collect())
}

/// Name of the first listed node
pub fn first_node_name(nodes: &[NodeSummary]) -> Result<String, ClusterError> {
    nodes
        .first()
        .map(|node| node.name.clone())
        .ok_or(ClusterError::NoNodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn node(value: serde_json::Value) -> Node {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_summary_of_ready_control_plane() {
        let node = node(json!({
            "apiVersion": "v1",
            "kind": "Node",
            "metadata": {
                "name": "kind-control-plane",
                "creationTimestamp": "2024-03-01T10:00:00Z",
                "labels": {
                    "kubernetes.io/hostname": "kind-control-plane",
                    "node-role.kubernetes.io/control-plane": ""
                }
            },
            "status": {
                "conditions": [
                    { "type": "MemoryPressure", "status": "False" },
                    { "type": "Ready", "status": "True" }
                ],
                "nodeInfo": {
                    "architecture": "amd64",
                    "bootID": "",
                    "containerRuntimeVersion": "containerd://1.7.1",
                    "kernelVersion": "6.1.0",
                    "kubeProxyVersion": "v1.28.0",
                    "kubeletVersion": "v1.28.0",
                    "machineID": "",
                    "operatingSystem": "linux",
                    "osImage": "Debian",
                    "systemUUID": ""
                }
            }
        }));

        let summary = NodeSummary::from(&node);
        assert_eq!(summary.name, "kind-control-plane");
        assert_eq!(summary.status, "Ready");
        assert_eq!(summary.roles, vec!["control-plane".to_string()]);
        assert_eq!(summary.kubelet_version.as_deref(), Some("v1.28.0"));
        assert_eq!(
            summary.created.unwrap().to_rfc3339(),
            "2024-03-01T10:00:00+00:00"
        );
    }

    #[test]
    fn test_summary_of_cordoned_worker_without_status() {
        let node = node(json!({
            "apiVersion": "v1",
            "kind": "Node",
            "metadata": {
                "name": "worker-1",
                "labels": { "kubernetes.io/role": "worker" }
            },
            "spec": { "unschedulable": true }
        }));

        let summary = NodeSummary::from(&node);
        assert_eq!(summary.status, "Unknown,SchedulingDisabled");
        assert_eq!(summary.roles, vec!["worker".to_string()]);
        assert!(summary.kubelet_version.is_none());
        assert!(summary.created.is_none());
    }

    #[test]
    fn test_first_node_name() {
        assert!(matches!(first_node_name(&[]), Err(ClusterError::NoNodes)));

        let nodes = vec![
            NodeSummary::from(&node(json!({ "kind": "Node", "apiVersion": "v1", "metadata": { "name": "a" } }))),
            NodeSummary::from(&node(json!({ "kind": "Node", "apiVersion": "v1", "metadata": { "name": "b" } }))),
        ];
        assert_eq!(first_node_name(&nodes).unwrap(), "a");
    }

    #[tokio::test]
    async fn test_missing_kubeconfig_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-kubeconfig");

        match init_kube_client(Some(path.as_path())).await {
            Err(ClusterError::Kubeconfig { path: reported, .. }) => assert_eq!(reported, path),
            Err(other) => panic!("expected kubeconfig error, got {:?}", other),
            Ok(_) => panic!("expected kubeconfig error, got a client"),
        }
    }

    #[tokio::test]
    async fn test_malformed_kubeconfig_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "clusters: [this is: not valid").unwrap();

        let result = init_kube_client(Some(file.path())).await;
        assert!(matches!(result, Err(ClusterError::Kubeconfig { .. })));
    }
}
