//! Fetching a node's kubelet configuration through `/configz`

use reqwest::Client;
use tracing::info;
use url::Url;

use crate::config::{configz_url, ProbeConfig};
use crate::decoder::Decoder;
use crate::error::{ConfigError, ConfigzError};
use crate::kubelet::KubeletConfiguration;
use crate::poller::{ConfigzProbe, Poller};

/// Polls a node's `/configz` endpoint and decodes the answer
#[derive(Debug, Clone)]
pub struct ConfigzClient {
    http: Client,
    api_url: Url,
    poller: Poller,
    decoder: Decoder<'static>,
}

impl ConfigzClient {
    /// Create a client from validated settings
    pub fn new(config: &ProbeConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.request_timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http,
            api_url: config.api_url()?,
            poller: Poller::new(config.policy()),
            decoder: Decoder::default(),
        })
    }

    /// Use a specific decoder instead of the global scheme's
    pub fn with_decoder(mut self, decoder: Decoder<'static>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Probe for `node`'s `/configz` endpoint
    pub fn probe(&self, node: &str) -> Result<ConfigzProbe, ConfigError> {
        let url = configz_url(&self.api_url, node)?;
        Ok(ConfigzProbe::new(self.http.clone(), url))
    }

    /// Poll `node`'s `/configz` until it answers 200, then decode the body.
    ///
    /// A poll timeout returns before any decoding happens.
    pub async fn fetch(&self, node: &str) -> Result<KubeletConfiguration, ConfigzError> {
        let probe = self.probe(node)?;
        info!(node, url = %probe.url(), "Polling kubelet configz");

        let response = self.poller.poll(&probe).await?;
        let config = self.decoder.decode_response(response).await?;

        info!(
            node,
            topology_manager_policy = %config.topology_manager_policy,
            "Decoded kubelet configuration"
        );
        Ok(config)
    }
}
