//! Registry of named overlay panels.
//!
//! At most one modal is open at any
//! time: opening one closes every other.
//! Background scrolling is locked while a
//! modal is open and restored as soon as
//! none is.
//!
//! Lookups of unregistered keys never
//! fail; they are logged and ignored so a
//! stale trigger cannot break the page.

use std::collections::BTreeMap;

use tracing::{
  debug,
  trace
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Key {
  Escape,
  Enter,
  Other
}

impl Key {
  /// Maps a DOM `KeyboardEvent.key`
  /// value.
  pub fn from_dom(key: &str) -> Self {
    match key {
      | "Escape" | "Esc" => Key::Escape,
      | "Enter" => Key::Enter,
      | _ => Key::Other
    }
  }
}

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct ModalState {
  pub is_open: bool
}

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct ModalRegistry {
  modals:        BTreeMap<String, ModalState>,
  scroll_locked: bool
}

/// Overlay keys follow the
/// `loginModal` / `confirm-modal`
/// naming convention.
pub fn is_modal_key(key: &str) -> bool {
  key.len() > "modal".len()
    && (key.ends_with("Modal")
      || key.ends_with("modal"))
}

impl ModalRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(
    &mut self,
    key: impl Into<String>
  ) {
    let key = key.into();
    trace!(modal = %key, "registering modal");
    self.modals.entry(key).or_default();
  }

  /// Registers every key that follows
  /// the overlay naming convention and
  /// returns how many were accepted.
  pub fn register_discovered<I, S>(
    &mut self,
    keys: I
  ) -> usize
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>
  {
    let mut accepted = 0;
    for key in keys {
      let key = key.as_ref();
      if is_modal_key(key) {
        self.register(key);
        accepted += 1;
      } else {
        trace!(key, "skipping non-modal key");
      }
    }
    accepted
  }

  pub fn contains(
    &self,
    key: &str
  ) -> bool {
    self.modals.contains_key(key)
  }

  pub fn keys(
    &self
  ) -> impl Iterator<Item = &str> {
    self.modals.keys().map(String::as_str)
  }

  pub fn is_open(
    &self,
    key: &str
  ) -> bool {
    self
      .modals
      .get(key)
      .is_some_and(|state| state.is_open)
  }

  pub fn open_key(&self) -> Option<&str> {
    self
      .modals
      .iter()
      .find(|(_, state)| state.is_open)
      .map(|(key, _)| key.as_str())
  }

  pub fn scroll_locked(&self) -> bool {
    self.scroll_locked
  }

  /// Returns `false` when `key` is not
  /// registered.
  pub fn open(
    &mut self,
    key: &str
  ) -> bool {
    if !self.modals.contains_key(key) {
      debug!(modal = key, "open ignored for unknown modal");
      return false;
    }

    for (name, state) in &mut self.modals
    {
      state.is_open = name == key;
    }
    self.scroll_locked = true;
    debug!(modal = key, "modal opened");
    true
  }

  pub fn close(&mut self, key: &str) {
    match self.modals.get_mut(key) {
      | Some(state) => {
        state.is_open = false;
        debug!(modal = key, "modal closed");
      }
      | None => {
        debug!(modal = key, "close ignored for unknown modal");
      }
    }
    self.sync_scroll();
  }

  pub fn close_all(&mut self) {
    for state in self.modals.values_mut()
    {
      state.is_open = false;
    }
    self.scroll_locked = false;
    debug!(
      count = self.modals.len(),
      "all modals closed"
    );
  }

  /// A click on the dimmed area behind
  /// an open modal dismisses it.
  pub fn backdrop_clicked(
    &mut self,
    key: &str
  ) {
    if self.is_open(key) {
      self.close(key);
    }
  }

  pub fn key_pressed(&mut self, key: Key) {
    if key == Key::Escape {
      self.close_all();
    }
  }

  /// Forces the closed state whatever the
  /// previous page view left behind.
  pub fn reset_on_load(&mut self) {
    self.close_all();
  }

  fn sync_scroll(&mut self) {
    self.scroll_locked = self
      .modals
      .values()
      .any(|state| state.is_open);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn registry() -> ModalRegistry {
    let mut modals = ModalRegistry::new();
    modals.register("loginModal");
    modals.register("signupModal");
    modals.register("deleteModal");
    modals
  }

  #[test]
  fn opening_second_modal_closes_first() {
    let mut modals = registry();
    assert!(modals.open("loginModal"));
    assert!(modals.open("signupModal"));

    assert!(!modals.is_open("loginModal"));
    assert!(modals.is_open("signupModal"));
    assert_eq!(
      modals.open_key(),
      Some("signupModal")
    );
    assert!(modals.scroll_locked());
  }

  #[test]
  fn every_ordered_pair_leaves_only_last_open(
  ) {
    let keys: Vec<String> = registry()
      .keys()
      .map(str::to_string)
      .collect();
    for a in &keys {
      for b in keys.iter().filter(|b| *b != a)
      {
        let mut modals = registry();
        modals.open(a);
        modals.open(b);
        assert!(!modals.is_open(a));
        assert!(modals.is_open(b));
      }
    }
  }

  #[test]
  fn escape_closes_everything_and_restores_scroll(
  ) {
    let mut modals = registry();
    modals.open("loginModal");
    modals.open("signupModal");
    modals.key_pressed(Key::Escape);

    assert!(!modals.is_open("loginModal"));
    assert!(!modals.is_open("signupModal"));
    assert!(!modals.scroll_locked());
  }

  #[test]
  fn other_keys_leave_modal_open() {
    let mut modals = registry();
    modals.open("deleteModal");
    modals.key_pressed(Key::Enter);
    assert!(modals.is_open("deleteModal"));
  }

  #[test]
  fn close_all_closes_every_modal() {
    let mut modals = registry();
    modals.open("deleteModal");
    modals.close_all();
    for key in
      ["loginModal", "signupModal", "deleteModal"]
    {
      assert!(!modals.is_open(key));
    }
    assert!(!modals.scroll_locked());
  }

  #[test]
  fn unknown_key_is_silently_ignored() {
    let mut modals = registry();
    modals.open("loginModal");
    assert!(!modals.open("missingModal"));
    modals.close("missingModal");

    assert!(modals.is_open("loginModal"));
    assert!(modals.scroll_locked());
  }

  #[test]
  fn closing_last_open_modal_restores_scroll(
  ) {
    let mut modals = registry();
    modals.open("loginModal");
    modals.close("signupModal");
    assert!(modals.scroll_locked());

    modals.close("loginModal");
    assert!(!modals.scroll_locked());
  }

  #[test]
  fn backdrop_click_only_affects_open_modal(
  ) {
    let mut modals = registry();
    modals.open("loginModal");
    modals.backdrop_clicked("signupModal");
    assert!(modals.is_open("loginModal"));

    modals.backdrop_clicked("loginModal");
    assert!(!modals.is_open("loginModal"));
    assert!(!modals.scroll_locked());
  }

  #[test]
  fn reset_on_load_forces_closed_state() {
    let mut modals = registry();
    modals.open("signupModal");
    modals.reset_on_load();
    assert_eq!(modals.open_key(), None);
    assert!(!modals.scroll_locked());
  }

  #[test]
  fn discovery_follows_naming_convention()
  {
    let mut modals = ModalRegistry::new();
    let accepted = modals.register_discovered([
      "loginModal",
      "confirm-modal",
      "quizForm",
      "modal",
    ]);
    assert_eq!(accepted, 2);
    assert!(modals.contains("loginModal"));
    assert!(modals.contains("confirm-modal"));
    assert!(!modals.contains("quizForm"));
  }

  #[test]
  fn dom_key_names_map_to_keys() {
    assert_eq!(
      Key::from_dom("Escape"),
      Key::Escape
    );
    assert_eq!(Key::from_dom("Esc"), Key::Escape);
    assert_eq!(Key::from_dom("a"), Key::Other);
  }
}
