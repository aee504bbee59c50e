//! Chat with an avatar, either to talk to it or to train it.

pub mod model;
pub mod responder;
pub mod session;

pub use model::{ChatEvent, ChatMessage, ChatRole, FALLBACK_MESSAGES, fallback_message};
pub use responder::{AvatarResponder, Responder, TrainingResponder};
pub use session::ChatSession;
