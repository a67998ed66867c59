//! Editor blocks for quiz questions.
//!
//! Blocks are numbered from a counter that
//! only grows, so deleting a block and
//! adding another never renames the form
//! fields of the blocks already on the
//! page.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{
  Deserialize,
  Serialize
};
use tracing::debug;

pub const OPTIONS_PLACEHOLDER: &str =
  "Option A, Option B, Option C, Option D";
pub const TRUE_FALSE_OPTIONS: &str =
  "True, False";
pub const DEFAULT_POINTS: u32 = 1;
pub const MIN_POINTS: u32 = 1;

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
  #[default]
  MultipleChoice,
  TrueFalse,
  ShortAnswer
}

impl QuestionType {
  pub const ALL: [QuestionType; 3] = [
    QuestionType::MultipleChoice,
    QuestionType::TrueFalse,
    QuestionType::ShortAnswer
  ];

  pub fn as_key(self) -> &'static str {
    match self {
      | Self::MultipleChoice => {
        "multiple_choice"
      }
      | Self::TrueFalse => "true_false",
      | Self::ShortAnswer => "short_answer"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Self::MultipleChoice => {
        "Multiple Choice"
      }
      | Self::TrueFalse => "True/False",
      | Self::ShortAnswer => "Short Answer"
    }
  }
}

impl fmt::Display for QuestionType {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_key())
  }
}

impl FromStr for QuestionType {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|ty| ty.as_key() == s.trim())
      .ok_or_else(|| {
        anyhow!("unknown question type '{s}'")
      })
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum QuestionPart {
  Text,
  Type,
  Options,
  Answer,
  Points
}

impl QuestionPart {
  fn key(self) -> &'static str {
    match self {
      | Self::Text => "text",
      | Self::Type => "type",
      | Self::Options => "options",
      | Self::Answer => "answer",
      | Self::Points => "points"
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsField {
  Editable {
    value:       String,
    placeholder: &'static str
  },
  ReadOnly {
    value: &'static str
  },
  Hidden
}

impl OptionsField {
  pub fn for_type(ty: QuestionType) -> Self {
    match ty {
      | QuestionType::MultipleChoice => {
        OptionsField::Editable {
          value:       String::new(),
          placeholder: OPTIONS_PLACEHOLDER
        }
      }
      | QuestionType::TrueFalse => {
        OptionsField::ReadOnly {
          value: TRUE_FALSE_OPTIONS
        }
      }
      | QuestionType::ShortAnswer => {
        OptionsField::Hidden
      }
    }
  }

  pub fn is_visible(&self) -> bool {
    !matches!(self, OptionsField::Hidden)
  }

  pub fn is_read_only(&self) -> bool {
    matches!(
      self,
      OptionsField::ReadOnly { .. }
    )
  }

  pub fn label(&self) -> &'static str {
    match self {
      | OptionsField::Editable { .. } => {
        "Options (comma-separated)"
      }
      | _ => "Options"
    }
  }

  pub fn value(&self) -> &str {
    match self {
      | OptionsField::Editable {
        value,
        ..
      } => value,
      | OptionsField::ReadOnly { value } => {
        value
      }
      | OptionsField::Hidden => ""
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBlock {
  pub number:        u32,
  pub question_type: QuestionType,
  pub options:       OptionsField
}

impl QuestionBlock {
  fn new(number: u32) -> Self {
    let question_type =
      QuestionType::default();
    Self {
      number,
      question_type,
      options: OptionsField::for_type(
        question_type
      )
    }
  }

  pub fn title(&self) -> String {
    format!("Question {}", self.number)
  }

  /// Form field name, e.g.
  /// `questions[3][answer]`.
  pub fn field_name(
    &self,
    part: QuestionPart
  ) -> String {
    format!(
      "questions[{}][{}]",
      self.number,
      part.key()
    )
  }

  pub fn options_container_id(
    &self
  ) -> String {
    format!("options-{}", self.number)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBuilder {
  next_number: u32,
  blocks:      Vec<QuestionBlock>
}

impl Default for QuestionBuilder {
  fn default() -> Self {
    Self::new()
  }
}

impl QuestionBuilder {
  pub fn new() -> Self {
    Self {
      next_number: 1,
      blocks:      Vec::new()
    }
  }

  pub fn blocks(&self) -> &[QuestionBlock] {
    &self.blocks
  }

  pub fn len(&self) -> usize {
    self.blocks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.blocks.is_empty()
  }

  pub fn get(
    &self,
    number: u32
  ) -> Option<&QuestionBlock> {
    self
      .blocks
      .iter()
      .find(|block| block.number == number)
  }

  fn get_mut(
    &mut self,
    number: u32
  ) -> Option<&mut QuestionBlock> {
    self
      .blocks
      .iter_mut()
      .find(|block| block.number == number)
  }

  pub fn add_question_field(
    &mut self
  ) -> &QuestionBlock {
    let number = self.next_number;
    self.next_number += 1;
    debug!(number, "adding question block");
    let index = self.blocks.len();
    self.blocks.push(QuestionBlock::new(number));
    &self.blocks[index]
  }

  pub fn remove_question_field(
    &mut self,
    number: u32
  ) -> bool {
    let before = self.blocks.len();
    self
      .blocks
      .retain(|block| block.number != number);
    let removed = self.blocks.len() != before;
    debug!(number, removed, "removing question block");
    removed
  }

  /// Swaps the options field to match the
  /// selected type. The previous content
  /// of the field is discarded.
  pub fn toggle_options(
    &mut self,
    number: u32,
    question_type: QuestionType
  ) -> Option<&OptionsField> {
    let block = self.get_mut(number)?;
    block.question_type = question_type;
    block.options =
      OptionsField::for_type(question_type);
    debug!(
      number,
      question_type = %question_type,
      "question options toggled"
    );
    Some(&block.options)
  }

  /// Only editable options accept text.
  pub fn set_options_text(
    &mut self,
    number: u32,
    text: impl Into<String>
  ) -> bool {
    match self
      .get_mut(number)
      .map(|block| &mut block.options)
    {
      | Some(OptionsField::Editable {
        value,
        ..
      }) => {
        *value = text.into();
        true
      }
      | _ => false
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn numbers_are_stable_across_removal() {
    let mut builder = QuestionBuilder::new();
    builder.add_question_field();
    builder.add_question_field();
    builder.add_question_field();
    assert!(builder.remove_question_field(2));

    let added =
      builder.add_question_field().number;
    assert_eq!(added, 4);

    let numbers: Vec<u32> = builder
      .blocks()
      .iter()
      .map(|block| block.number)
      .collect();
    assert_eq!(numbers, vec![1, 3, 4]);
  }

  #[test]
  fn new_block_defaults_to_multiple_choice(
  ) {
    let mut builder = QuestionBuilder::new();
    let block = builder.add_question_field();
    assert_eq!(block.title(), "Question 1");
    assert_eq!(
      block.question_type,
      QuestionType::MultipleChoice
    );
    assert_eq!(
      block.field_name(QuestionPart::Options),
      "questions[1][options]"
    );
    assert_eq!(
      block.options_container_id(),
      "options-1"
    );
    assert_eq!(
      block.options.label(),
      "Options (comma-separated)"
    );
  }

  #[test]
  fn toggle_options_ignores_prior_state() {
    let mut builder = QuestionBuilder::new();
    builder.add_question_field();

    for prior in QuestionType::ALL {
      for next in QuestionType::ALL {
        builder.toggle_options(1, prior);
        builder.set_options_text(1, "A, B, C");
        let field = builder
          .toggle_options(1, next)
          .cloned()
          .unwrap();
        match next {
          | QuestionType::TrueFalse => {
            assert!(field.is_read_only());
            assert!(field.is_visible());
            assert_eq!(
              field.value(),
              "True, False"
            );
          }
          | QuestionType::ShortAnswer => {
            assert!(!field.is_visible());
          }
          | QuestionType::MultipleChoice => {
            assert_eq!(
              field,
              OptionsField::Editable {
                value:       String::new(),
                placeholder:
                  OPTIONS_PLACEHOLDER
              }
            );
          }
        }
      }
    }
  }

  #[test]
  fn read_only_options_reject_text() {
    let mut builder = QuestionBuilder::new();
    builder.add_question_field();
    builder.toggle_options(
      1,
      QuestionType::TrueFalse
    );
    assert!(
      !builder.set_options_text(1, "Yes, No")
    );
    assert_eq!(
      builder
        .get(1)
        .map(|block| block.options.value()),
      Some("True, False")
    );
  }

  #[test]
  fn toggling_unknown_block_is_none() {
    let mut builder = QuestionBuilder::new();
    assert!(
      builder
        .toggle_options(
          9,
          QuestionType::ShortAnswer
        )
        .is_none()
    );
  }

  #[test]
  fn question_type_uses_snake_case_keys(
  ) {
    let json = serde_json::to_string(
      &QuestionType::TrueFalse
    )
    .unwrap();
    assert_eq!(json, "\"true_false\"");
    assert_eq!(
      "short_answer"
        .parse::<QuestionType>()
        .unwrap(),
      QuestionType::ShortAnswer
    );
  }
}
