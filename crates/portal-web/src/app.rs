use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::timers::callback::Interval;
use portal_core::page::{
  Page,
  PageEffect,
  PageEvent
};
use portal_core::validate::{
  FieldMark,
  RequiredInput
};
use portal_core::{
  Key,
  ModalRegistry,
  QuestionType,
  QuizTimer,
  TimerHandle,
  VisibilityClient,
  VisibilityEntity,
  confirm_delete_message
};
use wasm_bindgen::JsCast;
use web_sys::{
  HtmlElement,
  HtmlFormElement,
  HtmlInputElement,
  HtmlTextAreaElement,
  KeyboardEvent,
  SubmitEvent
};
use yew::functional::{
  UseForceUpdateHandle,
  use_force_update
};
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  function_component,
  html,
  use_effect_with,
  use_memo,
  use_mut_ref
};

use crate::api::FetchTransport;
use crate::components::{
  CountdownBadge,
  ModalFrame,
  QuestionCard,
  SessionList
};
use crate::settings::{
  PageData,
  PageSettings,
  QuizData
};

pub const LOGIN_MODAL: &str = "loginModal";
pub const QUESTIONS_MODAL: &str =
  "questionsModal";
pub const LOGIN_FORM: &str = "loginForm";
pub const QUESTION_FORM: &str =
  "questionForm";
pub const TIMER_DISPLAY: &str = "quizTimer";

#[derive(Properties, PartialEq)]
pub struct AppProps {
  pub settings: PageSettings,
  pub data:     PageData
}

fn build_page(
  settings: &PageSettings
) -> Page {
  let mut modals = ModalRegistry::new();
  modals.register(LOGIN_MODAL);
  modals.register(QUESTIONS_MODAL);
  Page::new(
    modals,
    QuizTimer::new(settings.quiz_form.clone())
  )
}

/// Bridges the page engine and the DOM:
/// events go in through `dispatch`, the
/// returned effects are applied here.
#[derive(Clone)]
struct PageHost {
  page:      Rc<RefCell<Page>>,
  ticker:
    Rc<RefCell<Option<(TimerHandle, Interval)>>>,
  countdown: Rc<RefCell<Option<String>>>,
  client:
    Rc<VisibilityClient<FetchTransport>>,
  redraw:    UseForceUpdateHandle
}

impl PageHost {
  fn dispatch(&self, event: PageEvent) {
    let effects =
      self.page.borrow_mut().dispatch(event);
    for effect in effects {
      self.apply(effect);
    }
    self.redraw.force_update();
  }

  fn apply(&self, effect: PageEffect) {
    match effect {
      | PageEffect::LockScroll => {
        set_body_scroll_locked(true)
      }
      | PageEffect::RestoreScroll => {
        set_body_scroll_locked(false)
      }
      | PageEffect::StartTicking {
        handle,
        interval_ms
      } => {
        let host = self.clone();
        let interval =
          Interval::new(interval_ms, move || {
            host.dispatch(PageEvent::TimerTick(
              handle
            ))
          });
        let previous = self
          .ticker
          .borrow_mut()
          .replace((handle, interval));
        if let Some((old, interval)) = previous
        {
          tracing::debug!(timer = old.id(), "replacing countdown interval");
          release_interval(interval);
        }
      }
      | PageEffect::StopTicking(handle) => {
        let stopped = {
          let mut ticker =
            self.ticker.borrow_mut();
          if ticker.as_ref().is_some_and(
            |(current, _)| *current == handle
          ) {
            ticker.take()
          } else {
            None
          }
        };
        if let Some((_, interval)) = stopped {
          release_interval(interval);
        }
      }
      | PageEffect::RenderCountdown {
        display: shown,
        text
      } => {
        tracing::trace!(display = %shown, text = %text, "countdown tick");
        *self.countdown.borrow_mut() = Some(text);
      }
      | PageEffect::MarkField {
        form,
        name,
        mark
      } => {
        mark_field(&form, &name, mark);
      }
      | PageEffect::SubmitForm(form) => {
        submit_form(&form)
      }
      | PageEffect::Reload => reload_page(),
      | PageEffect::Alert(message) => {
        gloo::dialogs::alert(&message)
      }
    }
  }

  fn request_toggle(
    &self,
    entity: VisibilityEntity,
    id: i64
  ) {
    let host = self.clone();
    wasm_bindgen_futures::spawn_local(
      async move {
        let outcome = host
          .client
          .toggle_visibility(entity, id)
          .await;
        host.dispatch(
          PageEvent::VisibilityResolved(outcome)
        );
      }
    );
  }

  fn request_bulk(
    &self,
    activity_id: i64,
    make_visible: bool
  ) {
    let host = self.clone();
    wasm_bindgen_futures::spawn_local(
      async move {
        let outcome = host
          .client
          .bulk_visibility(
            activity_id,
            make_visible
          )
          .await;
        host.dispatch(
          PageEvent::VisibilityResolved(outcome)
        );
      }
    );
  }
}

/// The interval may be stopped from inside
/// its own callback, so the closure is
/// freed on a later turn of the event loop.
fn release_interval(interval: Interval) {
  let closure = interval.cancel();
  wasm_bindgen_futures::spawn_local(
    async move {
      drop(closure);
    }
  );
}

fn document() -> Option<web_sys::Document> {
  web_sys::window()
    .and_then(|window| window.document())
}

fn find_form(
  key: &str
) -> Option<HtmlFormElement> {
  document()?
    .get_element_by_id(key)?
    .dyn_into::<HtmlFormElement>()
    .ok()
}

fn set_body_scroll_locked(locked: bool) {
  let Some(body) =
    document().and_then(|doc| doc.body())
  else {
    return;
  };
  let style = body.style();
  let result = if locked {
    style.set_property("overflow", "hidden")
  } else {
    style
      .remove_property("overflow")
      .and_then(|_| {
        style.remove_property("pointer-events")
      })
      .map(|_| ())
  };
  if let Err(err) = result {
    tracing::warn!(?err, locked, "failed updating body scroll");
  }
}

/// Returns whether the field was found and
/// its border updated.
fn mark_field(
  form_key: &str,
  name: &str,
  mark: FieldMark
) -> bool {
  let Some(form) = find_form(form_key) else {
    tracing::debug!(form = form_key, "mark target form missing");
    return false;
  };
  let selector = format!("[name=\"{name}\"]");
  let field = form
    .query_selector(&selector)
    .ok()
    .flatten()
    .and_then(|el| {
      el.dyn_into::<HtmlElement>().ok()
    });
  let Some(field) = field else {
    tracing::debug!(form = form_key, field = name, "mark target field missing");
    return false;
  };
  match field
    .style()
    .set_property("border-color", mark.border_color())
  {
    | Ok(()) => true,
    | Err(err) => {
      tracing::warn!(?err, form = form_key, field = name, "failed marking field");
      false
    }
  }
}

fn submit_form(form_key: &str) {
  match find_form(form_key) {
    | Some(form) => {
      tracing::info!(form = form_key, "submitting form");
      if let Err(err) = form.submit() {
        tracing::error!(?err, form = form_key, "form submit failed");
      }
    }
    | None => {
      tracing::debug!(form = form_key, "submit target missing")
    }
  }
}

fn reload_page() {
  if let Some(window) = web_sys::window()
    && let Err(err) = window.location().reload()
  {
    tracing::error!(?err, "page reload failed");
  }
}

fn collect_required_inputs(
  form: &HtmlFormElement
) -> Vec<RequiredInput> {
  let Ok(nodes) = form.query_selector_all(
    "input[required], textarea[required]"
  ) else {
    return Vec::new();
  };

  (0..nodes.length())
    .filter_map(|index| nodes.item(index))
    .filter_map(|node| {
      if let Some(input) =
        node.dyn_ref::<HtmlInputElement>()
      {
        Some(RequiredInput::new(
          input.name(),
          input.value()
        ))
      } else {
        node
          .dyn_ref::<HtmlTextAreaElement>()
          .map(|area| {
            RequiredInput::new(
              area.name(),
              area.value()
            )
          })
      }
    })
    .collect()
}

fn render_quiz(
  quiz: &QuizData,
  form_id: &str,
  countdown: Option<String>
) -> Html {
  html! {
      <div class="panel quiz-panel">
          <div class="header">
              <span>{ &quiz.title }</span>
              <CountdownBadge display_id={TIMER_DISPLAY} text={countdown} />
          </div>
          <form id={form_id.to_string()} method="post" action={quiz.action.clone()}>
              {
                  for quiz.questions.iter().enumerate().map(|(index, question)| {
                      let field = question.answer_field();
                      let answer = match question.question_type {
                          QuestionType::ShortAnswer => html! {
                              <input type="text" name={field} />
                          },
                          QuestionType::MultipleChoice | QuestionType::TrueFalse => html! {
                              <div class="choices">
                                  {
                                      for question.option_list().into_iter().map(|option| html! {
                                          <label class="choice">
                                              <input type="radio" name={field.clone()} value={option.clone()} />
                                              { option }
                                          </label>
                                      })
                                  }
                              </div>
                          },
                      };
                      html! {
                          <div class="question-card">
                              <h4>{ format!("{}. {}", index + 1, question.question_text) }</h4>
                              <div class="field-help">{ format!("{} pt(s)", question.points) }</div>
                              { answer }
                          </div>
                      }
                  })
              }
              <button class="btn ok" type="submit">{ "Submit Quiz" }</button>
          </form>
      </div>
  }
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
  let redraw = use_force_update();
  let page = {
    let settings = props.settings.clone();
    use_mut_ref(move || build_page(&settings))
  };
  let ticker = use_mut_ref(|| {
    None::<(TimerHandle, Interval)>
  });
  let countdown =
    use_mut_ref(|| None::<String>);
  let client = {
    let base = props.settings.api_base.clone();
    use_memo((), move |_| {
      VisibilityClient::new(FetchTransport::new(
        base
      ))
    })
  };

  let host = PageHost {
    page: page.clone(),
    ticker: ticker.clone(),
    countdown: countdown.clone(),
    client,
    redraw
  };

  {
    let host = host.clone();
    let quiz_minutes = props
      .data
      .quiz
      .as_ref()
      .map(|quiz| quiz.minutes);
    use_effect_with((), move |_| {
      host.dispatch(PageEvent::Loaded);
      if let Some(minutes) = quiz_minutes {
        host.dispatch(PageEvent::StartTimer {
          minutes,
          display: TIMER_DISPLAY.to_string()
        });
      }

      let listener = document().map(|doc| {
        let host = host.clone();
        EventListener::new(
          &doc,
          "keydown",
          move |event| {
            let Some(event) =
              event.dyn_ref::<KeyboardEvent>()
            else {
              return;
            };
            let key = Key::from_dom(&event.key());
            if key == Key::Escape {
              host.dispatch(PageEvent::KeyPressed(
                key
              ));
            }
          }
        )
      });

      let ticker = host.ticker.clone();
      move || {
        drop(listener);
        if let Some((_, interval)) =
          ticker.borrow_mut().take()
        {
          drop(interval);
        }
      }
    });
  }

  let open_modal = |key: &'static str| {
    let host = host.clone();
    Callback::from(move |_: MouseEvent| {
      host.dispatch(PageEvent::OpenModal(
        key.to_string()
      ))
    })
  };
  let on_modal_close = {
    let host = host.clone();
    Callback::from(move |key: String| {
      host.dispatch(PageEvent::CloseModal(key))
    })
  };
  let on_backdrop = {
    let host = host.clone();
    Callback::from(move |key: String| {
      host.dispatch(
        PageEvent::BackdropClicked(key)
      )
    })
  };
  let validated_submit =
    |form_key: &'static str| {
      let host = host.clone();
      Callback::from(move |e: SubmitEvent| {
        e.prevent_default();
        let inputs = find_form(form_key)
          .map(|form| {
            collect_required_inputs(&form)
          })
          .unwrap_or_default();
        host.dispatch(
          PageEvent::SubmitRequested {
            form: form_key.to_string(),
            inputs
          }
        );
      })
    };

  let on_add_question = {
    let host = host.clone();
    Callback::from(move |_: MouseEvent| {
      host.dispatch(PageEvent::AddQuestion)
    })
  };
  let on_type_change = {
    let host = host.clone();
    Callback::from(
      move |(number, question_type): (
        u32,
        QuestionType
      )| {
        host.dispatch(
          PageEvent::QuestionTypeChanged {
            number,
            question_type
          }
        )
      }
    )
  };
  let on_options_input = {
    let host = host.clone();
    Callback::from(
      move |(number, text): (u32, String)| {
        host.dispatch(PageEvent::OptionsEdited {
          number,
          text
        })
      }
    )
  };
  let on_remove_question = {
    let host = host.clone();
    Callback::from(move |number: u32| {
      let message = confirm_delete_message(
        Some("Remove this question?")
      );
      if gloo::dialogs::confirm(message) {
        host.dispatch(
          PageEvent::RemoveQuestion(number)
        );
      }
    })
  };
  let on_toggle = {
    let host = host.clone();
    Callback::from(
      move |(entity, id): (
        VisibilityEntity,
        i64
      )| host.request_toggle(entity, id)
    )
  };
  let on_bulk = {
    let host = host.clone();
    Callback::from(
      move |(activity_id, make_visible): (
        i64,
        bool
      )| {
        host.request_bulk(
          activity_id,
          make_visible
        )
      }
    )
  };

  let snapshot = page.borrow();
  let countdown_text =
    countdown.borrow().clone();

  html! {
      <div class="portal">
          <div class="toolbar">
              <button class="btn" type="button" onclick={open_modal(LOGIN_MODAL)}>{ "Log in" }</button>
              <button class="btn" type="button" onclick={open_modal(QUESTIONS_MODAL)}>{ "Add questions" }</button>
          </div>

          <SessionList sessions={props.data.sessions.clone()} {on_toggle} {on_bulk} />

          {
              match &props.data.quiz {
                  Some(quiz) => render_quiz(quiz, snapshot.timer.form(), countdown_text),
                  None => html! {},
              }
          }

          <ModalFrame
              modal_key={LOGIN_MODAL}
              title="Log in"
              open={snapshot.modals.is_open(LOGIN_MODAL)}
              on_close={on_modal_close.clone()}
              on_backdrop={on_backdrop.clone()}
          >
              <form id={LOGIN_FORM} method="post" action="/login" onsubmit={validated_submit(LOGIN_FORM)}>
                  <div class="form-group">
                      <label>{ "Username" }</label>
                      <input type="text" name="username" required=true />
                  </div>
                  <div class="form-group">
                      <label>{ "Password" }</label>
                      <input type="password" name="password" required=true />
                  </div>
                  <button class="btn ok" type="submit">{ "Log in" }</button>
              </form>
          </ModalFrame>

          <ModalFrame
              modal_key={QUESTIONS_MODAL}
              title="Add questions"
              open={snapshot.modals.is_open(QUESTIONS_MODAL)}
              on_close={on_modal_close}
              on_backdrop={on_backdrop}
          >
              <form
                  id={QUESTION_FORM}
                  method="post"
                  action={props.settings.question_action.clone()}
                  onsubmit={validated_submit(QUESTION_FORM)}
              >
                  <div id="questionsContainer">
                      {
                          for snapshot.questions.blocks().iter().map(|block| html! {
                              <QuestionCard
                                  key={block.number}
                                  block={block.clone()}
                                  on_type_change={on_type_change.clone()}
                                  on_options_input={on_options_input.clone()}
                                  on_remove={on_remove_question.clone()}
                              />
                          })
                      }
                  </div>
                  <div class="actions">
                      <button class="btn" type="button" onclick={on_add_question}>{ "Add Question" }</button>
                      <button class="btn ok" type="submit">{ "Save Questions" }</button>
                  </div>
              </form>
          </ModalFrame>
      </div>
  }
}
