use anyhow::anyhow;
use gloo::net::http::Request;
use portal_core::{
    Transport,
    TransportReply,
};

/// `fetch`-backed transport. Requests go to the page origin unless a base URL
/// is configured, and carry the browser's session cookie.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchTransport {
    base: String,
}

impl FetchTransport {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base.trim_end_matches('/'), path)
    }
}

impl Transport for FetchTransport {
    async fn post_json(&self, path: &str, body: String) -> anyhow::Result<TransportReply> {
        let url = self.url(path);
        let request = Request::post(&url)
            .header("Content-Type", "application/json")
            .body(body)
            .map_err(|e| anyhow!("failed to build request for {url}: {e}"))?;

        let response = request
            .send()
            .await
            .map_err(|e| anyhow!("request to {url} failed: {e}"))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("failed reading reply from {url}: {e}"))?;

        tracing::debug!(url = %url, status, "portal API replied");
        Ok(TransportReply { status, body })
    }
}
