//! Probe configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;
use crate::poller::PollPolicy;

/// Environment variable prefix (`CONFIGZ_API_URL`, `CONFIGZ_INTERVAL_MS`, ...)
pub const ENV_PREFIX: &str = "CONFIGZ";

/// Settings for reaching and polling `/configz`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// API server or `kubectl proxy` base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Pause between attempts in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Overall polling deadline in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Optional cap on the number of attempts
    #[serde(default)]
    pub max_attempts: Option<u32>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Skip TLS certificate verification
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
}

fn default_api_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_accept_invalid_certs() -> bool {
    true
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            interval_ms: default_interval_ms(),
            timeout_secs: default_timeout_secs(),
            max_attempts: None,
            request_timeout_secs: default_request_timeout_secs(),
            accept_invalid_certs: default_accept_invalid_certs(),
        }
    }
}

impl ProbeConfig {
    /// Load configuration from `CONFIGZ_*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_environment(::config::Environment::with_prefix(ENV_PREFIX))
    }

    pub(crate) fn from_environment(environment: ::config::Environment) -> Result<Self, ConfigError> {
        let config = ::config::Config::builder()
            .add_source(environment.try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Reject settings the poller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_attempts == Some(0) {
            return Err(ConfigError::Invalid {
                field: "max_attempts",
                reason: "must allow at least one attempt".to_string(),
            });
        }
        self.api_url()?;
        Ok(())
    }

    /// Parsed base URL; only http and https are accepted
    pub fn api_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.api_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.api_url.clone(),
            source,
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::Invalid {
                field: "api_url",
                reason: format!("unsupported scheme {:?}", other),
            }),
        }
    }

    pub fn policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.interval_ms),
            timeout: Duration::from_secs(self.timeout_secs),
            max_attempts: self.max_attempts,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `<base>/api/v1/nodes/<node>/proxy/configz`
pub fn configz_url(base: &Url, node: &str) -> Result<Url, ConfigError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ConfigError::UnsupportedUrl(base.to_string()))?
        .pop_if_empty()
        .extend(["api", "v1", "nodes", node, "proxy", "configz"]);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn environment(vars: &[(&str, &str)]) -> ::config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ::config::Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = ProbeConfig::from_environment(environment(&[])).unwrap();

        assert_eq!(config, ProbeConfig::default());
        assert_eq!(config.policy(), PollPolicy::default());
    }

    #[test]
    fn test_environment_overrides() {
        let config = ProbeConfig::from_environment(environment(&[
            ("CONFIGZ_API_URL", "https://10.0.0.1:6443"),
            ("CONFIGZ_INTERVAL_MS", "250"),
            ("CONFIGZ_TIMEOUT_SECS", "30"),
            ("CONFIGZ_MAX_ATTEMPTS", "7"),
            ("CONFIGZ_ACCEPT_INVALID_CERTS", "false"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://10.0.0.1:6443");
        assert_eq!(config.max_attempts, Some(7));
        assert!(!config.accept_invalid_certs);

        let policy = config.policy();
        assert_eq!(policy.interval, Duration::from_millis(250));
        assert_eq!(policy.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = ProbeConfig {
            interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "interval_ms", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = ProbeConfig {
            api_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl { .. })));

        let config = ProbeConfig {
            api_url: "ftp://localhost".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_configz_url() {
        let base = Url::parse("http://localhost:8001").unwrap();
        let url = configz_url(&base, "kind-control-plane").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8001/api/v1/nodes/kind-control-plane/proxy/configz"
        );

        let base = Url::parse("https://api.example.com:6443/").unwrap();
        let url = configz_url(&base, "worker-1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com:6443/api/v1/nodes/worker-1/proxy/configz"
        );
    }

    #[test]
    fn test_configz_url_keeps_base_path() {
        let base = Url::parse("https://rancher.example.com/k8s/clusters/c-1").unwrap();
        let url = configz_url(&base, "node-a").unwrap();
        assert_eq!(
            url.path(),
            "/k8s/clusters/c-1/api/v1/nodes/node-a/proxy/configz"
        );
    }
}
