//! Kubelet configz CLI
//!
//! A command-line tool for listing cluster nodes and inspecting the kubelet
//! configuration a node reports on its `/configz` debug endpoint.

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{check, configz, nodes};
use configz_lib::{init_kube_client, logging, ConfigzClient, ConfigzError, ProbeConfig};

/// Poll timed out before `/configz` answered 200
const EXIT_POLL_TIMEOUT: u8 = 2;
/// `/configz` answered but the body could not be read, decoded or converted
const EXIT_DECODE: u8 = 3;

/// Kubelet configz CLI
#[derive(Parser)]
#[command(name = "kcz")]
#[command(author, version, about = "Inspect kubelet configuration through the node proxy /configz endpoint", long_about = None)]
pub struct Cli {
    /// API server or kubectl proxy URL (defaults to http://localhost:8001)
    #[arg(long, env = "CONFIGZ_API_URL")]
    pub api_url: Option<String>,

    /// Path to kubeconfig file (uses the ambient configuration if not specified)
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Pause between /configz attempts in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Give up polling /configz after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Give up polling /configz after this many attempts
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Verify the TLS certificate of the API endpoint
    #[arg(long)]
    pub verify_tls: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List cluster nodes
    Nodes,

    /// Show the full kubelet configuration of a node
    Configz {
        /// Node name (defaults to the first listed node)
        #[arg(long, short)]
        node: Option<String>,
    },

    /// Show the topology manager policy of a node
    Topology {
        /// Node name (defaults to the first listed node)
        #[arg(long, short)]
        node: Option<String>,
    },

    /// List nodes, then show the topology manager policy of a node
    Check {
        /// Node name (defaults to the first listed node)
        #[arg(long, short)]
        node: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.log_json) {
        output::print_error(&format!("Failed to initialize logging: {}", e));
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&format!("{:#}", err));
            ExitCode::from(exit_code(&err))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.format;

    match cli.command {
        Commands::Nodes => {
            let client = init_kube_client(cli.kubeconfig.as_deref()).await?;
            nodes::show_nodes(&client, format).await?;
        }
        Commands::Configz { ref node } => {
            let client = configz_client(&cli)?;
            let node = commands::resolve_node(cli.kubeconfig.as_deref(), node.clone()).await?;
            configz::show_configz(&client, &node, format).await?;
        }
        Commands::Topology { ref node } => {
            let client = configz_client(&cli)?;
            let node = commands::resolve_node(cli.kubeconfig.as_deref(), node.clone()).await?;
            configz::show_topology(&client, &node, format).await?;
        }
        Commands::Check { ref node } => {
            let client = configz_client(&cli)?;
            let kube_client = init_kube_client(cli.kubeconfig.as_deref()).await?;
            check::run_check(&client, &kube_client, node.clone(), format).await?;
        }
    }

    Ok(())
}

/// Environment configuration with command-line overrides applied
fn probe_config(cli: &Cli) -> Result<ProbeConfig> {
    let mut config = ProbeConfig::load().context("Failed to load configuration")?;

    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.interval_ms = interval_ms;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    if cli.max_attempts.is_some() {
        config.max_attempts = cli.max_attempts;
    }
    if cli.verify_tls {
        config.accept_invalid_certs = false;
    }

    Ok(config)
}

fn configz_client(cli: &Cli) -> Result<ConfigzClient> {
    let config = probe_config(cli)?;
    ConfigzClient::new(&config).context("Invalid configz settings")
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| match cause.downcast_ref::<ConfigzError>()? {
            ConfigzError::Poll(_) => Some(EXIT_POLL_TIMEOUT),
            ConfigzError::Decode(_) => Some(EXIT_DECODE),
            ConfigzError::Config(_) => None,
        })
        .unwrap_or(1)
}
