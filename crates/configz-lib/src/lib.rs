//! Kubelet configuration inspection through the node proxy
//!
//! This crate provides:
//! - Bounded polling of the `/configz` endpoint until it answers 200
//! - Decoding of the `{"kubeletconfig": ...}` envelope into a versioned payload
//! - A conversion scheme from versioned payloads to a canonical configuration
//! - Node listing through the Kubernetes API
//! - Configuration loading and logging setup

pub mod client;
pub mod cluster;
pub mod config;
pub mod decoder;
pub mod error;
pub mod kubelet;
pub mod logging;
pub mod poller;
pub mod scheme;

pub use client::ConfigzClient;
pub use cluster::{first_node_name, init_kube_client, list_nodes, NodeSummary};
pub use config::{configz_url, ProbeConfig};
pub use decoder::{ConfigzEnvelope, Decoder};
pub use error::{
    AttemptError, ClusterError, ConfigError, ConfigzError, ConversionError, DecodeError, PollError,
};
pub use kubelet::{KubeletConfiguration, TopologyManagerPolicy, TopologyManagerScope};
pub use poller::{ConfigzProbe, PollPolicy, Poller, Probe};
pub use scheme::{GroupVersion, Scheme, VersionedConfig};
