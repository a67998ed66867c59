use anyhow::Context;
use portal_core::QuestionType;
use portal_core::questions::TRUE_FALSE_OPTIONS;
use serde::Deserialize;

pub const PAGE_DATA_ELEMENT: &str =
  "portal-data";
pub const DEFAULT_QUESTION_ACTION: &str =
  "/quiz/add-question";

/// Values read from `data-*` attributes of
/// the mount element.
#[derive(Clone, Debug, PartialEq)]
pub struct PageSettings {
  pub api_base:        String,
  pub question_action: String,
  pub quiz_form:       String
}

impl Default for PageSettings {
  fn default() -> Self {
    Self {
      api_base:        String::new(),
      question_action:
        DEFAULT_QUESTION_ACTION.to_string(),
      quiz_form:       portal_core::timer::DEFAULT_QUIZ_FORM
        .to_string()
    }
  }
}

impl PageSettings {
  pub fn from_mount(
    mount: &web_sys::Element
  ) -> Self {
    let defaults = Self::default();
    let attr = |name: &str| {
      mount
        .get_attribute(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    };

    Self {
      api_base:        attr("data-api-base")
        .map(|base| {
          base.trim_end_matches('/').to_string()
        })
        .unwrap_or(defaults.api_base),
      question_action: attr(
        "data-question-action"
      )
      .unwrap_or(defaults.question_action),
      quiz_form:       attr("data-quiz-form")
        .unwrap_or(defaults.quiz_form)
    }
  }
}

#[derive(
  Clone, Debug, PartialEq, Deserialize,
)]
pub struct ActivityRow {
  pub id:         i64,
  pub title:      String,
  #[serde(default)]
  pub is_visible: bool
}

#[derive(
  Clone, Debug, PartialEq, Deserialize,
)]
pub struct SessionRow {
  pub id:         i64,
  pub title:      String,
  #[serde(default)]
  pub is_visible: bool,
  #[serde(default)]
  pub activities: Vec<ActivityRow>
}

#[derive(
  Clone, Debug, PartialEq, Deserialize,
)]
pub struct QuizQuestion {
  pub id:            i64,
  pub question_text: String,
  pub question_type: QuestionType,
  #[serde(default)]
  pub options:       String,
  #[serde(default = "default_points")]
  pub points:        u32
}

impl QuizQuestion {
  /// Answer field name expected by the
  /// quiz submit handler.
  pub fn answer_field(&self) -> String {
    format!("q_{}", self.id)
  }

  /// True/false questions stored without
  /// options still offer both answers.
  pub fn option_list(&self) -> Vec<String> {
    let options = split_options(&self.options);
    if options.is_empty()
      && self.question_type
        == QuestionType::TrueFalse
    {
      return split_options(TRUE_FALSE_OPTIONS);
    }
    options
  }
}

#[derive(
  Clone, Debug, PartialEq, Deserialize,
)]
pub struct QuizData {
  pub title:     String,
  pub action:    String,
  pub minutes:   u32,
  #[serde(default)]
  pub questions: Vec<QuizQuestion>
}

#[derive(
  Clone,
  Debug,
  Default,
  PartialEq,
  Deserialize,
)]
pub struct PageData {
  #[serde(default)]
  pub sessions: Vec<SessionRow>,
  #[serde(default)]
  pub quiz:     Option<QuizData>
}

fn default_points() -> u32 {
  portal_core::questions::DEFAULT_POINTS
}

pub fn parse_page_data(
  raw: &str
) -> anyhow::Result<PageData> {
  if raw.trim().is_empty() {
    return Ok(PageData::default());
  }
  serde_json::from_str(raw)
    .context("invalid portal page data")
}

/// Reads the JSON island rendered by the
/// server next to the mount element.
pub fn load_page_data() -> PageData {
  let raw = web_sys::window()
    .and_then(|window| window.document())
    .and_then(|document| {
      document
        .get_element_by_id(PAGE_DATA_ELEMENT)
    })
    .and_then(|element| element.text_content())
    .unwrap_or_default();

  match parse_page_data(&raw) {
    | Ok(data) => data,
    | Err(err) => {
      tracing::error!(error = %format!("{err:#}"), "falling back to empty page data");
      PageData::default()
    }
  }
}

pub fn split_options(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|option| !option.is_empty())
    .map(str::to_string)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_sessions_and_quiz() {
    let data = parse_page_data(
      r#"{
        "sessions": [
          {"id": 1, "title": "Session 1", "is_visible": true,
           "activities": [{"id": 4, "title": "Lab 1"}]}
        ],
        "quiz": {
          "title": "Quiz 1",
          "action": "/quiz/3/submit",
          "minutes": 15,
          "questions": [
            {"id": 9, "question_text": "2+2?", "question_type": "multiple_choice",
             "options": "3, 4, ,5"}
          ]
        }
      }"#
    )
    .unwrap();

    assert_eq!(data.sessions.len(), 1);
    assert!(!data.sessions[0].activities[0].is_visible);
    let quiz = data.quiz.unwrap();
    assert_eq!(quiz.minutes, 15);
    assert_eq!(quiz.questions[0].points, 1);
    assert_eq!(
      quiz.questions[0].answer_field(),
      "q_9"
    );
    assert_eq!(
      quiz.questions[0].option_list(),
      vec!["3", "4", "5"]
    );
  }

  #[test]
  fn true_false_without_options_offers_both_answers(
  ) {
    let question = |question_type, options: &str| {
      QuizQuestion {
        id: 3,
        question_text: "The sky is blue.".to_string(),
        question_type,
        options: options.to_string(),
        points: 1
      }
    };
    assert_eq!(
      question(QuestionType::TrueFalse, " ")
        .option_list(),
      vec!["True", "False"]
    );
    assert_eq!(
      question(QuestionType::TrueFalse, "Yes, No")
        .option_list(),
      vec!["Yes", "No"]
    );
    assert!(
      question(QuestionType::ShortAnswer, "")
        .option_list()
        .is_empty()
    );
  }

  #[test]
  fn blank_page_data_is_empty() {
    assert_eq!(
      parse_page_data("  ").unwrap(),
      PageData::default()
    );
  }

  #[test]
  fn malformed_page_data_is_error() {
    assert!(parse_page_data("{").is_err());
  }
}
