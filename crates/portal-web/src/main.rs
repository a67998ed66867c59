mod api;
mod app;
mod components;
mod settings;

pub const MOUNT_ELEMENT: &str = "app";

fn main() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  tracing::info!("starting portal page");

  let Some(mount) = web_sys::window()
    .and_then(|window| window.document())
    .and_then(|document| {
      document.get_element_by_id(MOUNT_ELEMENT)
    })
  else {
    tracing::error!(
      mount = MOUNT_ELEMENT,
      "missing mount element, nothing to render"
    );
    return;
  };

  let settings =
    settings::PageSettings::from_mount(&mount);
  let data = settings::load_page_data();
  tracing::debug!(
    sessions = data.sessions.len(),
    quiz = data.quiz.is_some(),
    "loaded page data"
  );

  yew::Renderer::<app::App>::with_root_and_props(
    mount,
    app::AppProps { settings, data }
  )
  .render();
}
