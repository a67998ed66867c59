pub const INVALID_BORDER: &str = "#EF4444";
pub const VALID_BORDER: &str = "#E5E7EB";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredInput {
  pub name:  String,
  pub value: String
}

impl RequiredInput {
  pub fn new(
    name: impl Into<String>,
    value: impl Into<String>
  ) -> Self {
    Self {
      name:  name.into(),
      value: value.into()
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum FieldMark {
  Valid,
  Invalid
}

impl FieldMark {
  pub fn border_color(
    self
  ) -> &'static str {
    match self {
      | FieldMark::Valid => VALID_BORDER,
      | FieldMark::Invalid => INVALID_BORDER
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
  pub valid: bool,
  pub marks: Vec<(String, FieldMark)>
}

impl ValidationReport {
  pub fn invalid_fields(
    &self
  ) -> impl Iterator<Item = &str> {
    self
      .marks
      .iter()
      .filter(|(_, mark)| {
        *mark == FieldMark::Invalid
      })
      .map(|(name, _)| name.as_str())
  }
}

/// Checks the required inputs of one
/// form. Every input gets a mark, so a
/// previously flagged field is cleared
/// once it is filled in.
#[tracing::instrument(skip(inputs), fields(count = inputs.len()))]
pub fn validate(
  inputs: &[RequiredInput]
) -> ValidationReport {
  let marks: Vec<(String, FieldMark)> =
    inputs
      .iter()
      .map(|input| {
        let mark =
          if input.value.trim().is_empty() {
            FieldMark::Invalid
          } else {
            FieldMark::Valid
          };
        (input.name.clone(), mark)
      })
      .collect();

  let valid = marks
    .iter()
    .all(|(_, mark)| *mark == FieldMark::Valid);
  if !valid {
    tracing::debug!(
      invalid = marks
        .iter()
        .filter(|(_, m)| *m == FieldMark::Invalid)
        .count(),
      "form failed required-field check"
    );
  }

  ValidationReport { valid, marks }
}
