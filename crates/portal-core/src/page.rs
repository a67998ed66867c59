//! Event dispatch for one page view.
//!
//! Hosts translate their native events
//! (DOM listeners, interval callbacks,
//! finished requests) into [`PageEvent`]s
//! and apply the returned [`PageEffect`]s.
//! Events queued while another one is
//! being handled run afterwards, in order.

use std::collections::VecDeque;

use tracing::{
  debug,
  trace
};

use crate::modal::{
  Key,
  ModalRegistry
};
use crate::questions::{
  QuestionBuilder,
  QuestionType
};
use crate::timer::{
  QuizTimer,
  TICK_INTERVAL_MS,
  TickOutcome,
  TimerHandle
};
use crate::validate::{
  FieldMark,
  RequiredInput,
  validate
};
use crate::visibility::{
  VISIBILITY_ALERT,
  VisibilityOutcome
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
  Loaded,
  OpenModal(String),
  CloseModal(String),
  CloseAllModals,
  BackdropClicked(String),
  KeyPressed(Key),
  StartTimer {
    minutes: u32,
    display: String
  },
  TimerTick(TimerHandle),
  CancelTimer(TimerHandle),
  SubmitRequested {
    form:   String,
    inputs: Vec<RequiredInput>
  },
  AddQuestion,
  RemoveQuestion(u32),
  QuestionTypeChanged {
    number:        u32,
    question_type: QuestionType
  },
  OptionsEdited {
    number: u32,
    text:   String
  },
  VisibilityResolved(VisibilityOutcome)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEffect {
  LockScroll,
  RestoreScroll,
  StartTicking {
    handle:      TimerHandle,
    interval_ms: u32
  },
  StopTicking(TimerHandle),
  RenderCountdown {
    display: String,
    text:    String
  },
  MarkField {
    form: String,
    name: String,
    mark: FieldMark
  },
  SubmitForm(String),
  Reload,
  Alert(String)
}

#[derive(Debug, Clone, Default)]
pub struct Page {
  pub modals:    ModalRegistry,
  pub timer:     QuizTimer,
  pub questions: QuestionBuilder,
  queue:         VecDeque<PageEvent>
}

impl Page {
  pub fn new(
    modals: ModalRegistry,
    timer: QuizTimer
  ) -> Self {
    Self {
      modals,
      timer,
      questions: QuestionBuilder::new(),
      queue: VecDeque::new()
    }
  }

  /// Queues `event`, then handles every
  /// queued event in arrival order.
  pub fn dispatch(
    &mut self,
    event: PageEvent
  ) -> Vec<PageEffect> {
    self.queue.push_back(event);
    let mut effects = Vec::new();
    while let Some(next) =
      self.queue.pop_front()
    {
      trace!(event = ?next, "handling page event");
      self.handle(next, &mut effects);
    }
    effects
  }

  pub fn enqueue(&mut self, event: PageEvent) {
    self.queue.push_back(event);
  }

  fn handle(
    &mut self,
    event: PageEvent,
    effects: &mut Vec<PageEffect>
  ) {
    match event {
      | PageEvent::Loaded => {
        self.modals.reset_on_load();
        effects.push(PageEffect::RestoreScroll);
      }
      | PageEvent::OpenModal(key) => {
        let was_locked =
          self.modals.scroll_locked();
        if self.modals.open(&key)
          && !was_locked
        {
          effects.push(PageEffect::LockScroll);
        }
      }
      | PageEvent::CloseModal(key) => {
        self.with_scroll_tracking(
          effects,
          |modals| modals.close(&key)
        );
      }
      | PageEvent::CloseAllModals => {
        self.with_scroll_tracking(
          effects,
          ModalRegistry::close_all
        );
      }
      | PageEvent::BackdropClicked(key) => {
        self.with_scroll_tracking(
          effects,
          |modals| {
            modals.backdrop_clicked(&key)
          }
        );
      }
      | PageEvent::KeyPressed(key) => {
        self.with_scroll_tracking(
          effects,
          |modals| modals.key_pressed(key)
        );
      }
      | PageEvent::StartTimer {
        minutes,
        display
      } => {
        let (handle, replaced) =
          self.timer.start(minutes, display);
        if let Some(old) = replaced {
          effects
            .push(PageEffect::StopTicking(old));
        }
        effects.push(PageEffect::StartTicking {
          handle,
          interval_ms: TICK_INTERVAL_MS
        });
      }
      | PageEvent::TimerTick(handle) => {
        match self.timer.tick(handle) {
          | TickOutcome::Stale => {
            effects.push(
              PageEffect::StopTicking(handle)
            );
          }
          | TickOutcome::Running {
            display,
            text
          } => {
            effects.push(
              PageEffect::RenderCountdown {
                display,
                text
              }
            );
          }
          | TickOutcome::Expired {
            display,
            text,
            form
          } => {
            effects.push(
              PageEffect::RenderCountdown {
                display,
                text
              }
            );
            effects.push(
              PageEffect::StopTicking(handle)
            );
            effects
              .push(PageEffect::SubmitForm(form));
          }
        }
      }
      | PageEvent::CancelTimer(handle) => {
        if self.timer.cancel(handle) {
          effects.push(
            PageEffect::StopTicking(handle)
          );
        }
      }
      | PageEvent::SubmitRequested {
        form,
        inputs
      } => {
        let report = validate(&inputs);
        effects.extend(
          report.marks.into_iter().map(
            |(name, mark)| {
              PageEffect::MarkField {
                form: form.clone(),
                name,
                mark
              }
            }
          )
        );
        if report.valid {
          effects.push(PageEffect::SubmitForm(form));
        } else {
          debug!(form = %form, "submission blocked by validation");
        }
      }
      | PageEvent::AddQuestion => {
        self.questions.add_question_field();
      }
      | PageEvent::RemoveQuestion(number) => {
        self
          .questions
          .remove_question_field(number);
      }
      | PageEvent::QuestionTypeChanged {
        number,
        question_type
      } => {
        self
          .questions
          .toggle_options(number, question_type);
      }
      | PageEvent::OptionsEdited {
        number,
        text
      } => {
        self
          .questions
          .set_options_text(number, text);
      }
      | PageEvent::VisibilityResolved(
        outcome
      ) => {
        effects.push(match outcome {
          | VisibilityOutcome::Updated {
            ..
          } => PageEffect::Reload,
          | VisibilityOutcome::Failed {
            ..
          } => PageEffect::Alert(
            VISIBILITY_ALERT.to_string()
          )
        });
      }
    }
  }

  fn with_scroll_tracking(
    &mut self,
    effects: &mut Vec<PageEffect>,
    change: impl FnOnce(&mut ModalRegistry)
  ) {
    let was_locked =
      self.modals.scroll_locked();
    change(&mut self.modals);
    if was_locked
      && !self.modals.scroll_locked()
    {
      effects.push(PageEffect::RestoreScroll);
    }
  }
}

/// Message shown before destructive
/// actions.
pub fn confirm_delete_message(
  custom: Option<&str>
) -> &str {
  match custom {
    | Some(message)
      if !message.trim().is_empty() =>
    {
      message
    }
    | _ => "Are you sure you want to delete this?"
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn page() -> Page {
    let mut modals = ModalRegistry::new();
    modals.register("loginModal");
    modals.register("signupModal");
    Page::new(modals, QuizTimer::default())
  }

  #[test]
  fn login_then_signup_then_escape() {
    let mut page = page();
    assert_eq!(
      page.dispatch(PageEvent::OpenModal(
        "loginModal".to_string()
      )),
      vec![PageEffect::LockScroll]
    );
    assert!(
      page
        .dispatch(PageEvent::OpenModal(
          "signupModal".to_string()
        ))
        .is_empty()
    );
    assert!(!page.modals.is_open("loginModal"));
    assert!(page.modals.is_open("signupModal"));

    assert_eq!(
      page.dispatch(PageEvent::KeyPressed(
        Key::Escape
      )),
      vec![PageEffect::RestoreScroll]
    );
    assert_eq!(page.modals.open_key(), None);
  }

  #[test]
  fn load_forces_modals_closed() {
    let mut page = page();
    page.modals.open("loginModal");
    let effects =
      page.dispatch(PageEvent::Loaded);
    assert_eq!(
      effects,
      vec![PageEffect::RestoreScroll]
    );
    assert!(!page.modals.scroll_locked());
  }

  #[test]
  fn unknown_modal_has_no_effect() {
    let mut page = page();
    assert!(
      page
        .dispatch(PageEvent::OpenModal(
          "ghostModal".to_string()
        ))
        .is_empty()
    );
  }

  #[test]
  fn countdown_submits_quiz_form_once() {
    let mut page = page();
    let effects =
      page.dispatch(PageEvent::StartTimer {
        minutes: 1,
        display: "timer".to_string()
      });
    let PageEffect::StartTicking {
      handle,
      interval_ms
    } = effects[0].clone()
    else {
      panic!("expected StartTicking, got {effects:?}");
    };
    assert_eq!(interval_ms, 1_000);

    let mut submits = 0;
    for _ in 0..61 {
      for effect in
        page.dispatch(PageEvent::TimerTick(handle))
      {
        if effect
          == PageEffect::SubmitForm(
            "quizForm".to_string()
          )
        {
          submits += 1;
        }
      }
    }
    assert_eq!(submits, 1);
    assert_eq!(
      page.dispatch(PageEvent::TimerTick(handle)),
      vec![PageEffect::StopTicking(handle)]
    );
  }

  #[test]
  fn restarting_timer_stops_old_interval() {
    let mut page = page();
    page.dispatch(PageEvent::StartTimer {
      minutes: 2,
      display: "timer".to_string()
    });
    let first = page
      .timer
      .active()
      .map(|(handle, _)| handle)
      .unwrap();
    let effects =
      page.dispatch(PageEvent::StartTimer {
        minutes: 1,
        display: "timer".to_string()
      });
    assert_eq!(
      effects[0],
      PageEffect::StopTicking(first)
    );
  }

  #[test]
  fn invalid_submit_is_blocked() {
    let mut page = page();
    let effects = page.dispatch(
      PageEvent::SubmitRequested {
        form:   "loginForm".to_string(),
        inputs: vec![
          RequiredInput::new("username", "ana"),
          RequiredInput::new("password", " "),
        ]
      }
    );
    assert!(!effects.iter().any(|e| {
      matches!(e, PageEffect::SubmitForm(_))
    }));
    assert!(effects.contains(
      &PageEffect::MarkField {
        form: "loginForm".to_string(),
        name: "password".to_string(),
        mark: FieldMark::Invalid
      }
    ));
  }

  #[test]
  fn valid_submit_goes_through() {
    let mut page = page();
    let effects = page.dispatch(
      PageEvent::SubmitRequested {
        form:   "loginForm".to_string(),
        inputs: vec![RequiredInput::new(
          "username", "ana"
        )]
      }
    );
    assert_eq!(
      effects.last(),
      Some(&PageEffect::SubmitForm(
        "loginForm".to_string()
      ))
    );
  }

  #[test]
  fn visibility_outcomes_map_to_reload_or_alert(
  ) {
    let mut page = page();
    assert_eq!(
      page.dispatch(
        PageEvent::VisibilityResolved(
          VisibilityOutcome::Updated {
            is_visible: Some(true),
            count:      None
          }
        )
      ),
      vec![PageEffect::Reload]
    );
    assert_eq!(
      page.dispatch(
        PageEvent::VisibilityResolved(
          VisibilityOutcome::Failed {
            reason: "boom".to_string()
          }
        )
      ),
      vec![PageEffect::Alert(
        VISIBILITY_ALERT.to_string()
      )]
    );
  }

  #[test]
  fn queued_events_run_in_order() {
    let mut page = page();
    page.enqueue(PageEvent::AddQuestion);
    page.enqueue(PageEvent::AddQuestion);
    page.dispatch(PageEvent::QuestionTypeChanged {
      number:        2,
      question_type: QuestionType::ShortAnswer
    });
    let numbers: Vec<u32> = page
      .questions
      .blocks()
      .iter()
      .map(|b| b.number)
      .collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(
      page.questions.get(2).map(|b| {
        b.question_type
      }),
      Some(QuestionType::ShortAnswer)
    );
  }

  #[test]
  fn delete_confirmation_falls_back_to_default(
  ) {
    assert_eq!(
      confirm_delete_message(None),
      "Are you sure you want to delete this?"
    );
    assert_eq!(
      confirm_delete_message(Some("  ")),
      "Are you sure you want to delete this?"
    );
    assert_eq!(
      confirm_delete_message(Some(
        "Remove student?"
      )),
      "Remove student?"
    );
  }
}
