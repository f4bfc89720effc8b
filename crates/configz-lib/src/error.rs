//! Error types for polling, decoding and cluster access
//!
//! Per-attempt failures ([`AttemptError`]) are recovered by the poller.
//! Everything else surfaces to the caller.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::kubelet::DurationParseError;
use crate::scheme::GroupVersion;

/// Boxed error used where the concrete transport error type is not fixed
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of a single probe attempt
#[derive(Debug, Error)]
pub enum AttemptError {
    /// The request never produced a response
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The endpoint answered with something other than 200
    #[error("unexpected status {status}: {detail}")]
    Status { status: u16, detail: String },
}

impl AttemptError {
    /// Wrap any transport-level error
    pub fn transport(error: impl Into<BoxError>) -> Self {
        Self::Transport(error.into())
    }
}

/// Polling gave up without a successful attempt
#[derive(Debug, Error)]
pub enum PollError {
    #[error("poll timed out after {attempts} attempt(s) in {elapsed:?}")]
    Timeout {
        attempts: u32,
        elapsed: Duration,
        #[source]
        last_error: AttemptError,
    },
}

impl PollError {
    /// Number of attempts made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            PollError::Timeout { attempts, .. } => *attempts,
        }
    }

    /// The failure of the final attempt
    pub fn last_error(&self) -> &AttemptError {
        match self {
            PollError::Timeout { last_error, .. } => last_error,
        }
    }
}

/// Failure turning a versioned payload into the canonical configuration
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("no conversion registered for {0}")]
    NotRegistered(GroupVersion),

    #[error("payload registered as {group_version} has an unexpected type")]
    TypeMismatch { group_version: GroupVersion },

    #[error("invalid duration {value:?} for field {field}")]
    InvalidDuration {
        field: &'static str,
        value: String,
        #[source]
        source: DurationParseError,
    },

    #[error("invalid value {value:?} for field {field}")]
    InvalidValue { field: &'static str, value: String },
}

/// Failure decoding a `/configz` response body
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read configz response body")]
    Read(#[source] reqwest::Error),

    #[error("failed to decode configz response")]
    Decode(#[from] serde_json::Error),

    #[error("failed to convert kubelet configuration")]
    Conversion(#[from] ConversionError),
}

/// Failure talking to the Kubernetes API
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("failed to load kubeconfig from {}", path.display())]
    Kubeconfig {
        path: PathBuf,
        #[source]
        source: kube::config::KubeconfigError,
    },

    #[error("failed to create Kubernetes client")]
    Client(#[source] kube::Error),

    #[error("failed to list nodes")]
    ListNodes(#[source] kube::Error),

    #[error("cluster has no nodes")]
    NoNodes,
}

/// Invalid or unloadable probe configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] ::config::ConfigError),

    #[error("invalid URL {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("URL {0:?} cannot carry a path")]
    UnsupportedUrl(String),

    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to create HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

/// Any failure fetching a node's kubelet configuration
#[derive(Debug, Error)]
pub enum ConfigzError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Poll(#[from] PollError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
