//! Client for the two visibility
//! endpoints of the portal server.
//!
//! The HTTP layer is abstracted behind
//! [`Transport`] so the same client runs
//! in the browser and on the command line.

use anyhow::{
  Context,
  anyhow,
  bail
};
use serde::Serialize;
use tracing::{
  info,
  warn
};

use crate::wire::{
  BULK_VISIBILITY_PATH,
  BulkVisibilityRequest,
  TOGGLE_VISIBILITY_PATH,
  ToggleVisibilityRequest,
  VisibilityEntity,
  VisibilityResponse
};

pub const VISIBILITY_ALERT: &str =
  "Could not update visibility. Please \
   try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
  pub status: u16,
  pub body:   String
}

impl TransportReply {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

/// Sends a JSON body with `POST` and
/// hands back the raw reply. Transport
/// errors cover everything that prevented
/// a reply from arriving.
#[allow(async_fn_in_trait)]
pub trait Transport {
  async fn post_json(
    &self,
    path: &str,
    body: String
  ) -> anyhow::Result<TransportReply>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityOutcome {
  Updated {
    is_visible: Option<bool>,
    count:      Option<u64>
  },
  Failed {
    reason: String
  }
}

impl VisibilityOutcome {
  pub fn is_updated(&self) -> bool {
    matches!(
      self,
      VisibilityOutcome::Updated { .. }
    )
  }

  fn from_result(
    result: anyhow::Result<VisibilityResponse>
  ) -> Self {
    match result {
      | Ok(reply) => {
        VisibilityOutcome::Updated {
          is_visible: reply.is_visible,
          count:      reply.count
        }
      }
      | Err(err) => {
        warn!(error = %format!("{err:#}"), "visibility update failed");
        VisibilityOutcome::Failed {
          reason: format!("{err:#}")
        }
      }
    }
  }
}

#[derive(Debug, Clone)]
pub struct VisibilityClient<T> {
  transport: T
}

impl<T: Transport> VisibilityClient<T> {
  pub fn new(transport: T) -> Self {
    Self { transport }
  }

  pub fn transport(&self) -> &T {
    &self.transport
  }

  pub async fn toggle_visibility(
    &self,
    entity: VisibilityEntity,
    id: i64
  ) -> VisibilityOutcome {
    VisibilityOutcome::from_result(
      self.send_toggle(entity, id).await
    )
  }

  pub async fn bulk_visibility(
    &self,
    activity_id: i64,
    make_visible: bool
  ) -> VisibilityOutcome {
    VisibilityOutcome::from_result(
      self
        .send_bulk(activity_id, make_visible)
        .await
    )
  }

  #[tracing::instrument(skip(self))]
  pub async fn send_toggle(
    &self,
    entity: VisibilityEntity,
    id: i64
  ) -> anyhow::Result<VisibilityResponse> {
    let request =
      ToggleVisibilityRequest { entity, id };
    let reply = self
      .post(TOGGLE_VISIBILITY_PATH, &request)
      .await
      .with_context(|| {
        format!(
          "failed to toggle visibility of \
           {entity} {id}"
        )
      })?;
    info!(
      %entity,
      id,
      is_visible = ?reply.is_visible,
      "visibility toggled"
    );
    Ok(reply)
  }

  #[tracing::instrument(skip(self))]
  pub async fn send_bulk(
    &self,
    activity_id: i64,
    make_visible: bool
  ) -> anyhow::Result<VisibilityResponse> {
    let request = BulkVisibilityRequest {
      activity_id,
      make_visible
    };
    let reply = self
      .post(BULK_VISIBILITY_PATH, &request)
      .await
      .with_context(|| {
        format!(
          "failed to update score \
           visibility for activity \
           {activity_id}"
        )
      })?;
    info!(
      activity_id,
      make_visible,
      count = ?reply.count,
      "bulk visibility applied"
    );
    Ok(reply)
  }

  async fn post<B: Serialize>(
    &self,
    path: &str,
    request: &B
  ) -> anyhow::Result<VisibilityResponse> {
    let body = serde_json::to_string(request)
      .context("failed to encode request")?;
    let reply = self
      .transport
      .post_json(path, body)
      .await
      .with_context(|| {
        format!("request to {path} failed")
      })?;

    let decoded =
      serde_json::from_str::<VisibilityResponse>(
        &reply.body
      );

    if !reply.is_success() {
      let detail = decoded
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_default();
      return Err(anyhow!(
        "server answered {} {}",
        reply.status,
        detail
      ));
    }

    let decoded = decoded.with_context(|| {
      format!(
        "undecodable reply from {path}"
      )
    })?;
    if !decoded.success {
      bail!(
        "server reported failure{}",
        decoded
          .error
          .as_deref()
          .map(|e| format!(": {e}"))
          .unwrap_or_default()
      );
    }
    Ok(decoded)
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use super::*;

  struct ScriptedTransport {
    reply: anyhow::Result<TransportReply>,
    seen:  RefCell<Vec<(String, String)>>
  }

  impl ScriptedTransport {
    fn replying(status: u16, body: &str) -> Self {
      Self {
        reply: Ok(TransportReply {
          status,
          body: body.to_string()
        }),
        seen:  RefCell::new(Vec::new())
      }
    }

    fn unreachable() -> Self {
      Self {
        reply: Err(anyhow!("connection refused")),
        seen:  RefCell::new(Vec::new())
      }
    }
  }

  impl Transport for ScriptedTransport {
    async fn post_json(
      &self,
      path: &str,
      body: String
    ) -> anyhow::Result<TransportReply> {
      self
        .seen
        .borrow_mut()
        .push((path.to_string(), body));
      match &self.reply {
        | Ok(reply) => Ok(reply.clone()),
        | Err(err) => Err(anyhow!("{err}"))
      }
    }
  }

  #[tokio::test]
  async fn toggle_success_reports_update() {
    let client = VisibilityClient::new(
      ScriptedTransport::replying(
        200,
        r#"{"success":true,"is_visible":false}"#
      )
    );
    let outcome = client
      .toggle_visibility(
        VisibilityEntity::Session,
        42
      )
      .await;
    assert_eq!(
      outcome,
      VisibilityOutcome::Updated {
        is_visible: Some(false),
        count:      None
      }
    );

    let seen =
      client.transport().seen.borrow();
    assert_eq!(
      seen[0].0,
      "/api/toggle-visibility"
    );
    let body: serde_json::Value =
      serde_json::from_str(&seen[0].1)
        .unwrap();
    assert_eq!(
      body,
      serde_json::json!({
        "type": "session",
        "id": 42
      })
    );
  }

  #[tokio::test]
  async fn toggle_success_false_is_failure() {
    let client = VisibilityClient::new(
      ScriptedTransport::replying(
        200,
        r#"{"success":false}"#
      )
    );
    let outcome = client
      .toggle_visibility(
        VisibilityEntity::Session,
        42
      )
      .await;
    assert!(!outcome.is_updated());
  }

  #[tokio::test]
  async fn non_success_status_carries_server_error(
  ) {
    let client = VisibilityClient::new(
      ScriptedTransport::replying(
        403,
        r#"{"error":"Unauthorized"}"#
      )
    );
    let err = client
      .send_toggle(VisibilityEntity::Quiz, 3)
      .await
      .unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("403"));
    assert!(chain.contains("Unauthorized"));
  }

  #[tokio::test]
  async fn transport_error_is_failure_for_both_calls(
  ) {
    let client = VisibilityClient::new(
      ScriptedTransport::unreachable()
    );
    assert!(
      !client
        .toggle_visibility(
          VisibilityEntity::Exam,
          1
        )
        .await
        .is_updated()
    );
    assert!(
      !client
        .bulk_visibility(1, true)
        .await
        .is_updated()
    );
  }

  #[tokio::test]
  async fn bulk_success_reports_count() {
    let client = VisibilityClient::new(
      ScriptedTransport::replying(
        200,
        r#"{"success":true,"count":12}"#
      )
    );
    let outcome =
      client.bulk_visibility(7, true).await;
    assert_eq!(
      outcome,
      VisibilityOutcome::Updated {
        is_visible: None,
        count:      Some(12)
      }
    );
    let seen =
      client.transport().seen.borrow();
    assert_eq!(
      seen[0].0,
      "/api/bulk-visibility"
    );
  }

  #[tokio::test]
  async fn garbage_body_is_failure() {
    let client = VisibilityClient::new(
      ScriptedTransport::replying(
        200,
        "<html>login</html>"
      )
    );
    assert!(
      !client
        .bulk_visibility(7, false)
        .await
        .is_updated()
    );
  }
}
