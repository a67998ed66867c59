mod countdown_badge;
mod modal_frame;
mod question_card;
mod session_list;

pub use countdown_badge::CountdownBadge;
pub use modal_frame::ModalFrame;
pub use question_card::QuestionCard;
pub use session_list::SessionList;
