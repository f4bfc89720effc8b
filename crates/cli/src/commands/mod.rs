//! CLI command implementations

pub mod check;
pub mod configz;
pub mod nodes;

use anyhow::{Context, Result};
use configz_lib::{first_node_name, init_kube_client, list_nodes};
use std::path::Path;

/// The requested node, or the first node of the cluster
pub async fn resolve_node(kubeconfig: Option<&Path>, node: Option<String>) -> Result<String> {
    if let Some(node) = node {
        return Ok(node);
    }

    let client = init_kube_client(kubeconfig).await?;
    let nodes = list_nodes(&client).await?;
    first_node_name(&nodes).context("No node given and none could be discovered")
}
