//! Decoding of `/configz` responses
//!
//! `/configz` wraps the versioned kubelet configuration in a one-field
//! envelope: `{"kubeletconfig": {...}}`. Decoding parses the envelope, then
//! converts the payload to the canonical form through a [`Scheme`].

use reqwest::Response;
use serde::Deserialize;
use tracing::debug;

use crate::error::DecodeError;
use crate::kubelet::{v1beta1, KubeletConfiguration};
use crate::scheme::Scheme;

/// The `/configz` response envelope.
///
/// A missing `kubeletconfig` field yields the payload's default rather than
/// an error. Other fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigzEnvelope<T> {
    #[serde(default)]
    pub kubeletconfig: T,
}

/// Turns response bodies into canonical kubelet configurations
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'s> {
    scheme: &'s Scheme,
}

impl Default for Decoder<'static> {
    fn default() -> Self {
        Self::new(Scheme::global())
    }
}

impl<'s> Decoder<'s> {
    pub fn new(scheme: &'s Scheme) -> Self {
        Self { scheme }
    }

    /// Read the whole body of a successful response and decode it
    pub async fn decode_response(
        &self,
        response: Response,
    ) -> Result<KubeletConfiguration, DecodeError> {
        let body = response.bytes().await.map_err(DecodeError::Read)?;
        debug!(bytes = body.len(), "Read configz response body");
        self.decode(&body)
    }

    /// Decode a complete response body.
    ///
    /// Either the whole conversion succeeds or an error is returned.
    pub fn decode(&self, body: &[u8]) -> Result<KubeletConfiguration, DecodeError> {
        let envelope: ConfigzEnvelope<v1beta1::KubeletConfiguration> =
            serde_json::from_slice(body)?;
        let config = self.scheme.convert(&envelope.kubeletconfig)?;
        Ok(config)
    }
}
