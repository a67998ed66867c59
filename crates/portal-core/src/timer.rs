//! Quiz countdown.
//!
//! A [`QuizTimer`] owns at most one
//! running [`Countdown`]. Every `start`
//! cancels the previous countdown and
//! hands out a fresh [`TimerHandle`];
//! ticks carrying an older handle are
//! ignored, so a leftover interval can
//! never render or submit.

use tracing::{
  debug,
  info,
  trace
};

pub const DEFAULT_QUIZ_FORM: &str =
  "quizForm";
pub const TICK_INTERVAL_MS: u32 = 1_000;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
)]
pub struct TimerHandle(u64);

impl TimerHandle {
  pub fn id(self) -> u64 {
    self.0
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
  remaining_seconds: i64,
  target_form:       String,
  display:           String
}

impl Countdown {
  pub fn new(
    duration_minutes: u32,
    display: impl Into<String>,
    target_form: impl Into<String>
  ) -> Self {
    Self {
      remaining_seconds: i64::from(
        duration_minutes
      ) * 60,
      target_form:       target_form
        .into(),
      display:           display.into()
    }
  }

  pub fn remaining_seconds(&self) -> i64 {
    self.remaining_seconds
  }

  pub fn display(&self) -> &str {
    &self.display
  }

  pub fn target_form(&self) -> &str {
    &self.target_form
  }

  pub fn is_expired(&self) -> bool {
    self.remaining_seconds < 0
  }

  /// Renders the current value, then
  /// counts down by one second.
  fn step(&mut self) -> String {
    let text =
      format_mmss(self.remaining_seconds);
    self.remaining_seconds -= 1;
    text
  }
}

/// `MM:SS`, both parts zero padded.
/// Negative input clamps to `00:00`.
pub fn format_mmss(seconds: i64) -> String {
  let seconds = seconds.max(0);
  format!(
    "{:02}:{:02}",
    seconds / 60,
    seconds % 60
  )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
  /// The handle does not belong to the
  /// running countdown.
  Stale,
  Running {
    display: String,
    text:    String
  },
  /// Last render of the countdown; the
  /// form must be submitted now.
  Expired {
    display: String,
    text:    String,
    form:    String
  }
}

#[derive(Debug, Clone)]
pub struct QuizTimer {
  form:        String,
  next_handle: u64,
  active:      Option<(TimerHandle, Countdown)>
}

impl Default for QuizTimer {
  fn default() -> Self {
    Self::new(DEFAULT_QUIZ_FORM)
  }
}

impl QuizTimer {
  pub fn new(
    form: impl Into<String>
  ) -> Self {
    Self {
      form:        form.into(),
      next_handle: 1,
      active:      None
    }
  }

  pub fn form(&self) -> &str {
    &self.form
  }

  pub fn active(
    &self
  ) -> Option<(TimerHandle, &Countdown)> {
    self
      .active
      .as_ref()
      .map(|(handle, countdown)| {
        (*handle, countdown)
      })
  }

  pub fn is_running(
    &self,
    handle: TimerHandle
  ) -> bool {
    self
      .active
      .as_ref()
      .is_some_and(|(current, _)| {
        *current == handle
      })
  }

  /// Starts a countdown and returns its
  /// handle. The handle of any countdown
  /// still running is returned as the
  /// second value after being cancelled.
  pub fn start(
    &mut self,
    duration_minutes: u32,
    display: impl Into<String>
  ) -> (TimerHandle, Option<TimerHandle>) {
    let replaced =
      self.active.take().map(|(old, _)| {
        debug!(
          timer = old.id(),
          "cancelling running countdown \
           before restart"
        );
        old
      });

    let handle =
      TimerHandle(self.next_handle);
    self.next_handle += 1;

    let countdown = Countdown::new(
      duration_minutes,
      display,
      self.form.clone()
    );
    info!(
      timer = handle.id(),
      minutes = duration_minutes,
      display = countdown.display(),
      form = countdown.target_form(),
      "quiz countdown started"
    );
    self.active = Some((handle, countdown));
    (handle, replaced)
  }

  pub fn cancel(
    &mut self,
    handle: TimerHandle
  ) -> bool {
    if self.is_running(handle) {
      self.active = None;
      debug!(timer = handle.id(), "countdown cancelled");
      true
    } else {
      false
    }
  }

  pub fn tick(
    &mut self,
    handle: TimerHandle
  ) -> TickOutcome {
    let Some((current, countdown)) =
      self.active.as_mut()
    else {
      trace!(timer = handle.id(), "tick with no countdown");
      return TickOutcome::Stale;
    };
    if *current != handle {
      trace!(
        timer = handle.id(),
        running = current.id(),
        "ignoring stale tick"
      );
      return TickOutcome::Stale;
    }

    let text = countdown.step();
    let display =
      countdown.display().to_string();
    if !countdown.is_expired() {
      return TickOutcome::Running {
        display,
        text
      };
    }

    let form =
      countdown.target_form().to_string();
    self.active = None;
    info!(
      timer = handle.id(),
      form = %form,
      "quiz countdown expired"
    );
    TickOutcome::Expired {
      display,
      text,
      form
    }
  }
}
