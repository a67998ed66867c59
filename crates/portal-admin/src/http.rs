use anyhow::Context;
use portal_core::{
  Transport,
  TransportReply
};
use reqwest::header::{
  ACCEPT,
  CONTENT_TYPE,
  COOKIE
};
use tracing::{
  debug,
  warn
};

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct HttpTransport {
  client:   reqwest::Client,
  base_url: String,
  cookie:   Option<String>
}

impl HttpTransport {
  pub fn from_config(
    cfg: &Config
  ) -> anyhow::Result<Self> {
    let mut builder =
      reqwest::Client::builder();
    if let Some(timeout) = cfg.timeout()? {
      debug!(?timeout, "applying HTTP timeout");
      builder = builder.timeout(timeout);
    }
    let client = builder.build().context(
      "failed building HTTP client for \
       portal API"
    )?;

    Ok(Self {
      client,
      base_url: cfg.base_url(),
      cookie: cfg.cookie()
    })
  }

  pub fn endpoint_url(
    &self,
    path: &str
  ) -> String {
    format!(
      "{}/{}",
      self.base_url.trim_end_matches('/'),
      path.trim_start_matches('/')
    )
  }
}

impl Transport for HttpTransport {
  async fn post_json(
    &self,
    path: &str,
    body: String
  ) -> anyhow::Result<TransportReply> {
    let url = self.endpoint_url(path);
    let mut request = self
      .client
      .post(url.as_str())
      .header(CONTENT_TYPE, "application/json")
      .header(ACCEPT, "application/json")
      .body(body);
    if let Some(cookie) = &self.cookie {
      request =
        request.header(COOKIE, cookie.as_str());
    }

    let response =
      request.send().await.with_context(|| {
        format!("failed requesting {url}")
      })?;
    let status = response.status();
    if !status.is_success() {
      warn!(url = %url, status = %status, "portal API returned error status");
    }
    let body =
      response.text().await.with_context(|| {
        format!(
          "failed reading response body \
           from {url}"
        )
      })?;
    debug!(url = %url, status = status.as_u16(), bytes = body.len(), "portal API replied");

    Ok(TransportReply {
      status: status.as_u16(),
      body
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn endpoint_url_joins_without_double_slash(
  ) {
    let mut cfg = Config::defaults();
    cfg.apply_overrides([(
      "api.base_url".to_string(),
      "https://lms.example.edu/".to_string()
    )]);
    let transport =
      HttpTransport::from_config(&cfg)
        .unwrap();
    assert_eq!(
      transport.endpoint_url(
        "/api/toggle-visibility"
      ),
      "https://lms.example.edu/api/toggle-visibility"
    );
  }

  #[test]
  fn invalid_timeout_is_rejected() {
    let mut cfg = Config::defaults();
    cfg.apply_overrides([(
      "http.timeout_secs".to_string(),
      "soon".to_string()
    )]);
    assert!(
      HttpTransport::from_config(&cfg)
        .is_err()
    );
  }
}
