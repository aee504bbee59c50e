//! Remote responders: who the chat session talks to.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::api::AvatarApi;
use crate::error::ApiError;

/// A remote message exchange plus how to describe its failures.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Send `text` and return the reply to show.
    async fn exchange(&self, text: &str) -> Result<String, ApiError>;

    /// Error fields to look for, most specific first.
    fn error_fields(&self) -> &'static [&'static str];

    /// Toast text when the failure carries no usable detail.
    fn generic_error(&self) -> &'static str {
        "Avatar couldn't respond. Please try again."
    }
}

/// "Talk" context: a visitor chatting with someone's avatar.
pub struct AvatarResponder {
    api: Arc<dyn AvatarApi>,
    handle: String,
    contact_email: String,
}

impl AvatarResponder {
    pub fn new(api: Arc<dyn AvatarApi>, handle: impl Into<String>, contact_email: impl Into<String>) -> Self {
        Self {
            api,
            handle: handle.into(),
            contact_email: contact_email.into(),
        }
    }
}

#[async_trait]
impl Responder for AvatarResponder {
    async fn exchange(&self, text: &str) -> Result<String, ApiError> {
        debug!(handle = %self.handle, "Sending chat message");
        let envelope = self
            .api
            .send_message(&self.handle, text, &self.contact_email)
            .await?;
        Ok(envelope.reply_text())
    }

    fn error_fields(&self) -> &'static [&'static str] {
        &["agentId"]
    }
}

/// "Train" context: the owner teaching their avatar.
pub struct TrainingResponder {
    api: Arc<dyn AvatarApi>,
    handle: String,
}

impl TrainingResponder {
    pub fn new(api: Arc<dyn AvatarApi>, handle: impl Into<String>) -> Self {
        Self {
            api,
            handle: handle.into(),
        }
    }
}

#[async_trait]
impl Responder for TrainingResponder {
    async fn exchange(&self, text: &str) -> Result<String, ApiError> {
        debug!(handle = %self.handle, "Sending training knowledge");
        let envelope = self.api.increase_knowledge(&self.handle, text).await?;
        Ok(envelope.reply_text())
    }

    fn error_fields(&self) -> &'static [&'static str] {
        &["user_name"]
    }
}
