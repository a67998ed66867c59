use yew::{
  Callback,
  Children,
  Html,
  MouseEvent,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct ModalFrameProps {
  pub modal_key:   String,
  pub title:       String,
  pub open:        bool,
  pub on_close:    Callback<String>,
  pub on_backdrop: Callback<String>,
  #[prop_or_default]
  pub children:    Children
}

/// Overlay panel. The outer element is the
/// backdrop; clicks inside the panel do
/// not reach it.
#[function_component(ModalFrame)]
pub fn modal_frame(
  props: &ModalFrameProps
) -> Html {
  let on_backdrop = {
    let on_backdrop =
      props.on_backdrop.clone();
    let key = props.modal_key.clone();
    Callback::from(move |_: MouseEvent| {
      on_backdrop.emit(key.clone())
    })
  };
  let on_close = {
    let on_close = props.on_close.clone();
    let key = props.modal_key.clone();
    Callback::from(move |_: MouseEvent| {
      on_close.emit(key.clone())
    })
  };
  let display = if props.open {
    "display:block;"
  } else {
    "display:none;"
  };

  html! {
      <div id={props.modal_key.clone()} class="modal" style={display} onclick={on_backdrop}>
          <div class="modal-content" onclick={Callback::from(|e: MouseEvent| e.stop_propagation())}>
              <div class="modal-header">
                  <h3>{ props.title.clone() }</h3>
                  <button class="close" type="button" onclick={on_close}>{ "×" }</button>
              </div>
              { props.children.clone() }
          </div>
      </div>
  }
}
