//! Chat data model and the rotating fallback text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canned avatar replies shown when an exchange fails, in rotation order.
pub const FALLBACK_MESSAGES: [&str; 4] = [
    "Hmm… something went wrong on my side. Maybe the agent ID didn’t respond correctly. Could you try again?",
    "Still having trouble processing that. It looks like the agent ID might be invalid or disconnected. Please try rephrasing.",
    "I'm trying to reconnect to the agent, but the request failed again. Possibly an incorrect username or session error — try once more?",
    "Connection dropped with the agent. It could be a wrong agent ID or temporary network issue. Please try again differently.",
];

/// Pick the fallback for the `failure_count`-th failure (0-based).
pub fn fallback_message<'a>(failure_count: usize, fallbacks: &[&'a str]) -> &'a str {
    if fallbacks.is_empty() {
        return "";
    }
    fallbacks[failure_count % fallbacks.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    LocalUser,
    RemoteAvatar,
}

/// One utterance in a transcript. Content is markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::LocalUser, content)
    }

    pub fn avatar(content: impl Into<String>) -> Self {
        Self::new(ChatRole::RemoteAvatar, content)
    }

    pub fn is_user(&self) -> bool {
        self.role == ChatRole::LocalUser
    }
}

/// Observable effects of transcript changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// The transcript changed; views scroll to its end.
    ScrollToLatest { len: usize },
    /// The avatar is (or stopped) composing a reply.
    Typing(bool),
}
