//! Wire types exchanged with the avatar service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reply shown when the service answers without any usable text.
pub const DEFAULT_REPLY: &str = "Thanks! I'm processing your instructions.";

/// Availability check / avatar creation request.
///
/// The service reserves the handle on success and answers `422` with
/// per-field errors when it is taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateAvatarRequest {
    pub user_name: String,
    /// Account identifier correlating the avatar to a remote account.
    pub oliv_id: String,
    pub email: String,
}

/// Response to a successful avatar creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvatarResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub oliv_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Metadata of a user-selected document. The content is not retained once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Milliseconds since the Unix epoch.
    pub last_modified: i64,
}

impl FileMetadata {
    /// Lowercased extension after the last dot, if any.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.name.rsplit_once('.')?;
        (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
    }
}

/// A document held in memory until it is uploaded.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    pub metadata: FileMetadata,
    pub bytes: Vec<u8>,
}

impl DocumentFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            metadata: FileMetadata {
                name: name.into(),
                size: bytes.len() as u64,
                mime_type: mime_type.into(),
                last_modified: chrono::Utc::now().timestamp_millis(),
            },
            bytes,
        }
    }
}

/// Knowledge record conditioning the avatar's answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgePayload {
    pub user_name: String,
    pub knowledge: String,
    pub full_name: String,
    pub headline: String,
    pub location: String,
    pub short_bio: String,
    pub personality: String,
    pub skills: Vec<String>,
    pub about_yourself: String,
    pub strength: String,
    #[serde(rename = "customTone", skip_serializing_if = "Option::is_none")]
    pub custom_tone: Option<String>,
}

/// One avatar profile as stored by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AvatarDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub personality: Option<String>,
    #[serde(default)]
    pub about_yourself: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AvatarDetailsResponse {
    #[serde(default)]
    pub data: Option<Vec<AvatarDetails>>,
}

/// Reply envelope for chat and training exchanges.
///
/// `data` is either a list whose first entry carries `reply`, or absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyEnvelope {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ReplyEnvelope {
    /// Extract the text to show: structured reply, then top-level reply,
    /// then the generic message, then [`DEFAULT_REPLY`].
    pub fn reply_text(&self) -> String {
        let structured = self
            .data
            .as_ref()
            .and_then(|d| d.as_array())
            .and_then(|items| items.first())
            .and_then(|first| first.get("reply"))
            .and_then(|r| r.as_str());

        [structured, self.reply.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or(DEFAULT_REPLY)
            .to_string()
    }
}

/// Who wrote a history message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderKind {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSender {
    pub id: i64,
    pub user_name: String,
    #[serde(rename = "type")]
    pub kind: SenderKind,
}

/// One message inside a past conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub id: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub sender: Option<MessageSender>,
}

/// The other party of a conversation (usually a recruiter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    pub user_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// A past conversation thread, fetched wholesale and never mutated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub conversation_id: i64,
    #[serde(default)]
    pub user: Option<Participant>,
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChatHistoryData {
    #[serde(default)]
    pub chats: Vec<ConversationRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChatHistoryResponse {
    #[serde(default)]
    pub data: Option<ChatHistoryData>,
}

/// Result of resolving an opaque account id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AgentCheck {
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CheckAgentResponse {
    #[serde(default)]
    pub data: Option<AgentCheck>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_text_precedence() {
        let structured: ReplyEnvelope = serde_json::from_value(serde_json::json!({
            "data": [{ "reply": "From data" }],
            "reply": "Top level",
            "message": "ok"
        }))
        .unwrap();
        assert_eq!(structured.reply_text(), "From data");

        let top: ReplyEnvelope = serde_json::from_value(serde_json::json!({
            "data": {},
            "reply": "Top level",
            "message": "ok"
        }))
        .unwrap();
        assert_eq!(top.reply_text(), "Top level");

        let generic: ReplyEnvelope =
            serde_json::from_value(serde_json::json!({ "message": "Knowledge saved" })).unwrap();
        assert_eq!(generic.reply_text(), "Knowledge saved");

        assert_eq!(ReplyEnvelope::default().reply_text(), DEFAULT_REPLY);
    }

    #[test]
    fn empty_reply_falls_through() {
        let env: ReplyEnvelope = serde_json::from_value(serde_json::json!({
            "data": [{ "reply": "" }],
            "message": "fallback"
        }))
        .unwrap();
        assert_eq!(env.reply_text(), "fallback");
    }

    #[test]
    fn conversation_record_deserializes_service_shape() {
        let record: ConversationRecord = serde_json::from_value(serde_json::json!({
            "conversation_id": 7,
            "user": { "id": 3, "user_name": "Recruiter Rita", "email": "rita@corp.test" },
            "messages": [
                {
                    "id": 1,
                    "message": "Hello",
                    "message_type": "text",
                    "created_at": "2025-01-02 10:00:00",
                    "sender": { "id": 3, "user_name": "Recruiter Rita", "type": "user" }
                },
                {
                    "id": 2,
                    "message": "Hi there",
                    "message_type": "text",
                    "sender": { "id": 9, "user_name": "alice", "type": "agent" }
                }
            ]
        }))
        .unwrap();

        assert_eq!(record.conversation_id, 7);
        assert_eq!(record.messages.len(), 2);
        assert_eq!(record.messages[1].sender.as_ref().unwrap().kind, SenderKind::Agent);
        assert!(record.messages[1].created_at.is_none());
    }

    #[test]
    fn file_extension_is_lowercased() {
        let meta = FileMetadata {
            name: "Resume.Final.PDF".into(),
            size: 10,
            mime_type: "application/pdf".into(),
            last_modified: 0,
        };
        assert_eq!(meta.extension().as_deref(), Some("pdf"));

        let bare = FileMetadata {
            name: "README".into(),
            ..meta
        };
        assert!(bare.extension().is_none());
    }
}
