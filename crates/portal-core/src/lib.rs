//! Page behavior of the course portal:
//! modals, the quiz countdown, required
//! field checks, the question editor and
//! the visibility toggles. Nothing in here
//! touches the DOM or the network
//! directly; hosts apply [`page::PageEffect`]s
//! and supply a [`visibility::Transport`].

pub mod modal;
pub mod page;
pub mod questions;
pub mod timer;
pub mod validate;
pub mod visibility;
pub mod wire;

pub use modal::{
  Key,
  ModalRegistry
};
pub use page::{
  Page,
  PageEffect,
  PageEvent,
  confirm_delete_message
};
pub use questions::{
  QuestionBuilder,
  QuestionType
};
pub use timer::{
  QuizTimer,
  TimerHandle
};
pub use visibility::{
  Transport,
  TransportReply,
  VisibilityClient,
  VisibilityOutcome
};
pub use wire::VisibilityEntity;
