//! Node listing command

use anyhow::Result;
use chrono::Utc;
use configz_lib::{list_nodes, NodeSummary};
use tabled::{settings::Style, Table, Tabled};

use crate::output::{color_status, format_age, join_or_none, print_json, print_warning, OutputFormat};

/// Row for nodes table
#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Roles")]
    roles: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Version")]
    version: String,
}

/// List the cluster's nodes and print them
pub async fn show_nodes(client: &kube::Client, format: OutputFormat) -> Result<Vec<NodeSummary>> {
    let nodes = list_nodes(client).await?;
    print_nodes(&nodes, format)?;
    Ok(nodes)
}

pub fn print_nodes(nodes: &[NodeSummary], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(nodes)?,
        OutputFormat::Table => {
            if nodes.is_empty() {
                print_warning("No nodes found");
                return Ok(());
            }

            let now = Utc::now();
            let rows: Vec<NodeRow> = nodes
                .iter()
                .map(|node| NodeRow {
                    name: node.name.clone(),
                    status: color_status(&node.status),
                    roles: join_or_none(&node.roles),
                    age: format_age(node.created, now),
                    version: node.kubelet_version.clone().unwrap_or_default(),
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{}", table);
            println!("\nTotal: {} nodes", nodes.len());
        }
    }

    Ok(())
}
