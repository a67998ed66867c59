use portal_core::QuestionType;
use portal_core::questions::{
  DEFAULT_POINTS,
  MIN_POINTS,
  OptionsField,
  QuestionBlock,
  QuestionPart
};
use web_sys::{
  HtmlInputElement,
  HtmlSelectElement
};
use yew::{
  Callback,
  Event,
  Html,
  InputEvent,
  MouseEvent,
  Properties,
  TargetCast,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct QuestionCardProps {
  pub block:           QuestionBlock,
  pub on_type_change:
    Callback<(u32, QuestionType)>,
  pub on_options_input:
    Callback<(u32, String)>,
  pub on_remove:       Callback<u32>
}

#[function_component(QuestionCard)]
pub fn question_card(
  props: &QuestionCardProps
) -> Html {
  let block = &props.block;
  let number = block.number;

  let on_type_change = {
    let on_type_change =
      props.on_type_change.clone();
    Callback::from(move |e: Event| {
      let select: HtmlSelectElement =
        e.target_unchecked_into();
      match select.value().parse::<QuestionType>() {
        | Ok(question_type) => {
          on_type_change.emit((number, question_type))
        }
        | Err(err) => tracing::warn!(error = %err, "ignoring unknown question type"),
      }
    })
  };

  let on_options_input = {
    let on_options_input =
      props.on_options_input.clone();
    Callback::from(move |e: InputEvent| {
      let input: HtmlInputElement =
        e.target_unchecked_into();
      on_options_input.emit((number, input.value()))
    })
  };

  let on_remove = {
    let on_remove = props.on_remove.clone();
    Callback::from(move |_: MouseEvent| {
      on_remove.emit(number)
    })
  };

  let options_style = if block.options.is_visible() {
    "display:block;"
  } else {
    "display:none;"
  };
  let options_name =
    block.field_name(QuestionPart::Options);
  let options_input = match &block.options {
    | OptionsField::Editable {
      value,
      placeholder
    } => html! {
        <input type="text" name={options_name} value={value.clone()} placeholder={*placeholder} oninput={on_options_input} />
    },
    | OptionsField::ReadOnly { value } => html! {
        <input type="text" name={options_name} value={*value} readonly=true />
    },
    | OptionsField::Hidden => html! {}
  };

  html! {
      <div class="question-card">
          <div class="question-card-header">
              <h4>{ block.title() }</h4>
              <button class="btn danger" type="button" onclick={on_remove}>{ "Remove" }</button>
          </div>
          <div class="form-group">
              <label>{ "Question Text" }</label>
              <textarea name={block.field_name(QuestionPart::Text)} required=true />
          </div>
          <div class="form-group">
              <label>{ "Type" }</label>
              <select name={block.field_name(QuestionPart::Type)} onchange={on_type_change}>
                  {
                      for QuestionType::ALL.into_iter().map(|ty| html! {
                          <option value={ty.as_key()} selected={ty == block.question_type}>{ ty.label() }</option>
                      })
                  }
              </select>
          </div>
          <div class="form-group" id={block.options_container_id()} style={options_style}>
              <label>{ block.options.label() }</label>
              { options_input }
          </div>
          <div class="form-group">
              <label>{ "Correct Answer" }</label>
              <input type="text" name={block.field_name(QuestionPart::Answer)} required=true />
          </div>
          <div class="form-group">
              <label>{ "Points" }</label>
              <input
                  type="number"
                  name={block.field_name(QuestionPart::Points)}
                  value={DEFAULT_POINTS.to_string()}
                  min={MIN_POINTS.to_string()}
              />
          </div>
      </div>
  }
}
