use yew::{
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct CountdownBadgeProps {
  pub display_id: String,
  pub text:       Option<String>
}

#[function_component(CountdownBadge)]
pub fn countdown_badge(
  props: &CountdownBadgeProps
) -> Html {
  let text = props
    .text
    .clone()
    .unwrap_or_else(|| "--:--".to_string());
  let class = if text == "00:00" {
    "timer expired"
  } else {
    "timer"
  };

  html! {
      <span id={props.display_id.clone()} class={class}>{ text }</span>
  }
}
