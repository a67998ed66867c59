use portal_core::VisibilityEntity;
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  function_component,
  html
};

use crate::settings::SessionRow;

#[derive(Properties, PartialEq)]
pub struct SessionListProps {
  pub sessions:  Vec<SessionRow>,
  pub on_toggle:
    Callback<(VisibilityEntity, i64)>,
  pub on_bulk:   Callback<(i64, bool)>
}

fn visibility_badge(visible: bool) -> Html {
  if visible {
    html! { <span class="badge ok">{ "Visible" }</span> }
  } else {
    html! { <span class="badge muted">{ "Hidden" }</span> }
  }
}

#[function_component(SessionList)]
pub fn session_list(
  props: &SessionListProps
) -> Html {
  if props.sessions.is_empty() {
    return html! {
        <div class="panel">
            <div class="header">{ "Sessions" }</div>
            <div class="empty">{ "No sessions on this page." }</div>
        </div>
    };
  }

  let toggle = |entity: VisibilityEntity, id: i64| {
    let on_toggle = props.on_toggle.clone();
    Callback::from(move |_: MouseEvent| {
      on_toggle.emit((entity, id))
    })
  };
  let bulk = |activity_id: i64, make_visible: bool| {
    let on_bulk = props.on_bulk.clone();
    Callback::from(move |_: MouseEvent| {
      on_bulk.emit((activity_id, make_visible))
    })
  };

  html! {
      <div class="panel">
          <div class="header">{ "Sessions" }</div>
          {
              for props.sessions.iter().map(|session| html! {
                  <div class="session-row">
                      <div class="session-title">
                          <strong>{ &session.title }</strong>
                          { visibility_badge(session.is_visible) }
                          <button class="btn" type="button" onclick={toggle(VisibilityEntity::Session, session.id)}>
                              { if session.is_visible { "Hide" } else { "Show" } }
                          </button>
                      </div>
                      <ul class="activity-list">
                          {
                              for session.activities.iter().map(|activity| html! {
                                  <li class="activity-row">
                                      <span>{ &activity.title }</span>
                                      { visibility_badge(activity.is_visible) }
                                      <button class="btn" type="button" onclick={toggle(VisibilityEntity::Activity, activity.id)}>
                                          { if activity.is_visible { "Hide" } else { "Show" } }
                                      </button>
                                      <button class="btn ok" type="button" onclick={bulk(activity.id, true)}>
                                          { "Release scores" }
                                      </button>
                                      <button class="btn" type="button" onclick={bulk(activity.id, false)}>
                                          { "Withhold scores" }
                                      </button>
                                  </li>
                              })
                          }
                      </ul>
                  </div>
              })
          }
      </div>
  }
}
