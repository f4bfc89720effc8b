//! HTTP probe for the node proxy `/configz` endpoint

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode};
use tracing::trace;
use url::Url;

use super::Probe;
use crate::error::AttemptError;

/// Upper bound on the response body kept for a bad-status diagnostic
const MAX_DETAIL_BYTES: usize = 512;

/// One `GET <url>` with `Accept: application/json` per attempt
#[derive(Debug, Clone)]
pub struct ConfigzProbe {
    client: Client,
    url: Url,
}

impl ConfigzProbe {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Probe for ConfigzProbe {
    type Output = Response;

    fn target(&self) -> &str {
        self.url.as_str()
    }

    async fn attempt(&self) -> Result<Response, AttemptError> {
        trace!(url = %self.url, "Requesting configz");
        let response = self
            .client
            .get(self.url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(AttemptError::transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            // Reading the body to the end releases the connection.
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::Status {
                status: status.as_u16(),
                detail: summarize(status, &body),
            });
        }

        Ok(response)
    }
}

fn summarize(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return status.canonical_reason().unwrap_or("no body").to_string();
    }
    if body.len() <= MAX_DETAIL_BYTES {
        return body.to_string();
    }

    let mut end = MAX_DETAIL_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_empty_body_uses_reason() {
        assert_eq!(
            summarize(StatusCode::SERVICE_UNAVAILABLE, "  "),
            "Service Unavailable"
        );
    }

    #[test]
    fn test_summarize_truncates_long_body() {
        let body = "é".repeat(400);
        let detail = summarize(StatusCode::INTERNAL_SERVER_ERROR, &body);

        assert!(detail.ends_with("..."));
        assert!(detail.len() <= MAX_DETAIL_BYTES + 3);
    }
}
