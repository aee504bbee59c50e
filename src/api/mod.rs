//! Remote avatar service boundary.
//!
//! The service is opaque: it hosts the avatars, stores their knowledge and
//! answers chat messages. This module only describes the calls the studio
//! makes (`AvatarApi`) and ships one reqwest-backed implementation.

pub mod http;
pub mod traits;
pub mod types;

pub use http::HttpAvatarApi;
pub use traits::AvatarApi;
pub use types::{
    AgentCheck, AvatarDetails, AvatarResponse, ConversationRecord, CreateAvatarRequest,
    DEFAULT_REPLY, DocumentFile, FileMetadata, HistoryMessage, KnowledgePayload, MessageSender,
    Participant, ReplyEnvelope, SenderKind,
};
