use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{
  Deserialize,
  Serialize
};

pub const TOGGLE_VISIBILITY_PATH: &str =
  "/api/toggle-visibility";
pub const BULK_VISIBILITY_PATH: &str =
  "/api/bulk-visibility";

/// Kinds of record whose visibility
/// flag the portal server can flip.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityEntity {
  Session,
  Activity,
  ActivityActive,
  Quiz,
  Exam,
  Score,
  QuizScore,
  ExamScore
}

impl VisibilityEntity {
  pub const ALL: [VisibilityEntity; 8] = [
    VisibilityEntity::Session,
    VisibilityEntity::Activity,
    VisibilityEntity::ActivityActive,
    VisibilityEntity::Quiz,
    VisibilityEntity::Exam,
    VisibilityEntity::Score,
    VisibilityEntity::QuizScore,
    VisibilityEntity::ExamScore
  ];

  pub fn as_key(
    self
  ) -> &'static str {
    match self {
      | Self::Session => "session",
      | Self::Activity => "activity",
      | Self::ActivityActive => {
        "activity_active"
      }
      | Self::Quiz => "quiz",
      | Self::Exam => "exam",
      | Self::Score => "score",
      | Self::QuizScore => "quiz_score",
      | Self::ExamScore => "exam_score"
    }
  }
}

impl fmt::Display for VisibilityEntity {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_key())
  }
}

impl FromStr for VisibilityEntity {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let wanted = s.trim();
    Self::ALL
      .into_iter()
      .find(|entity| {
        entity
          .as_key()
          .eq_ignore_ascii_case(wanted)
      })
      .ok_or_else(|| {
        anyhow!(
          "unknown visibility type \
           '{wanted}'"
        )
      })
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct ToggleVisibilityRequest {
  #[serde(rename = "type")]
  pub entity: VisibilityEntity,
  pub id:     i64
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct BulkVisibilityRequest {
  pub activity_id:  i64,
  pub make_visible: bool
}

/// Body returned by both visibility
/// endpoints. Error replies carry only
/// `error`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct VisibilityResponse {
  #[serde(default)]
  pub success:    bool,
  #[serde(default)]
  pub is_visible: Option<bool>,
  #[serde(default)]
  pub count:      Option<u64>,
  #[serde(default)]
  pub error:      Option<String>
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn toggle_request_uses_type_field_name()
  {
    let request =
      ToggleVisibilityRequest {
        entity: VisibilityEntity::QuizScore,
        id:     42
      };
    let json =
      serde_json::to_value(&request)
        .unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "type": "quiz_score",
        "id": 42
      })
    );
  }

  #[test]
  fn bulk_request_field_names() {
    let request = BulkVisibilityRequest {
      activity_id:  7,
      make_visible: false
    };
    let json =
      serde_json::to_value(&request)
        .unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "activity_id": 7,
        "make_visible": false
      })
    );
  }

  #[test]
  fn error_reply_decodes_as_failure() {
    let reply: VisibilityResponse =
      serde_json::from_str(
        r#"{"error":"Unauthorized"}"#
      )
      .unwrap();
    assert!(!reply.success);
    assert_eq!(
      reply.error.as_deref(),
      Some("Unauthorized")
    );
  }

  #[test]
  fn entity_parses_case_insensitively() {
    assert_eq!(
      "Activity_Active"
        .parse::<VisibilityEntity>()
        .unwrap(),
      VisibilityEntity::ActivityActive
    );
    assert!(
      "lesson"
        .parse::<VisibilityEntity>()
        .is_err()
    );
  }
}
