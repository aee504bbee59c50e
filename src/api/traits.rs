//! `AvatarApi` trait: the remote service boundary.

use async_trait::async_trait;

use crate::error::ApiError;

use super::types::{
    AgentCheck, AvatarDetails, AvatarResponse, ConversationRecord, CreateAvatarRequest,
    DocumentFile, KnowledgePayload, ReplyEnvelope,
};

/// Operations the studio needs from the avatar service.
///
/// Every method is a single in-flight request; a timeout or network failure
/// surfaces as [`ApiError::Transport`] like any other failure.
#[async_trait]
pub trait AvatarApi: Send + Sync {
    /// Reserve a handle for an account. A conflict comes back as
    /// [`ApiError::Rejected`] with per-field reasons.
    async fn check_handle_availability(
        &self,
        request: &CreateAvatarRequest,
    ) -> Result<AvatarResponse, ApiError>;

    /// Upload a document (CV) for an avatar.
    async fn upload_document(&self, user_name: &str, file: &DocumentFile) -> Result<(), ApiError>;

    /// Submit a full knowledge record.
    async fn submit_knowledge(&self, payload: &KnowledgePayload) -> Result<(), ApiError>;

    /// Teach the avatar a free-text fact; answers like a chat exchange.
    async fn increase_knowledge(
        &self,
        user_name: &str,
        knowledge: &str,
    ) -> Result<ReplyEnvelope, ApiError>;

    /// Send a chat message to an avatar on behalf of `contact_email`.
    async fn send_message(
        &self,
        user_name: &str,
        text: &str,
        contact_email: &str,
    ) -> Result<ReplyEnvelope, ApiError>;

    /// Fetch the stored profile, `None` when the avatar has no record.
    async fn fetch_profile(&self, user_name: &str) -> Result<Option<AvatarDetails>, ApiError>;

    /// Fetch every past conversation for an avatar.
    async fn fetch_conversation_history(
        &self,
        user_name: &str,
    ) -> Result<Vec<ConversationRecord>, ApiError>;

    /// Resolve an opaque account id to the avatar it owns.
    async fn resolve_identity(&self, account_id: &str) -> Result<AgentCheck, ApiError>;
}
