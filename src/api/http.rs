//! `HttpAvatarApi`: reqwest transport for the avatar service.
//!
//! All mutating endpoints take multipart form bodies. A `401` whose message is
//! `Unauthenticated.` drops the held bearer token so later calls go out
//! anonymously instead of repeating a dead credential.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::StudioConfig;
use crate::error::{ApiError, ErrorBody};

use super::traits::AvatarApi;
use super::types::{
    AgentCheck, AvatarDetails, AvatarDetailsResponse, AvatarResponse, ChatHistoryResponse,
    CheckAgentResponse, ConversationRecord, CreateAvatarRequest, DocumentFile, KnowledgePayload,
    ReplyEnvelope,
};

/// Message the service uses for an expired or revoked token.
const UNAUTHENTICATED_MESSAGE: &str = "Unauthenticated.";

/// HTTP client for the avatar service.
pub struct HttpAvatarApi {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<SecretString>>,
}

impl HttpAvatarApi {
    /// Build a client from configuration.
    pub fn new(config: &StudioConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            token: RwLock::new(config.api_token.clone()),
        })
    }

    /// Replace the bearer token.
    pub fn set_token(&self, token: Option<SecretString>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Whether a bearer token is currently held.
    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Build `{base}/seg1/seg2/...`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, ApiError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("bad base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attach auth + accept headers, send, and map non-2xx answers to errors.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let request = {
            let token = self.token.read().unwrap_or_else(PoisonError::into_inner);
            match token.as_ref() {
                Some(token) => request.bearer_auth(token.expose_secret()),
                None => request,
            }
        };

        let response = request.header(ACCEPT, "application/json").send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.bytes().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_slice(&raw).unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED
            && body.message.as_deref() == Some(UNAUTHENTICATED_MESSAGE)
        {
            warn!("Service reports the session as unauthenticated, dropping token");
            self.set_token(None);
            return Err(ApiError::Unauthenticated);
        }

        debug!(status = status.as_u16(), message = ?body.message, "Service rejected request");
        Err(ApiError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        let raw = response.bytes().await?;
        serde_json::from_slice(&raw).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AvatarApi for HttpAvatarApi {
    async fn check_handle_availability(
        &self,
        request: &CreateAvatarRequest,
    ) -> Result<AvatarResponse, ApiError> {
        let form = Form::new()
            .text("user_name", request.user_name.clone())
            .text("oliv_id", request.oliv_id.clone())
            .text("email", request.email.clone());

        let url = self.endpoint(&["avatar", "create"])?;
        let response = self
            .execute_json(self.client.post(url).multipart(form))
            .await?;
        info!(handle = %request.user_name, "Handle reserved");
        Ok(response)
    }

    async fn upload_document(&self, user_name: &str, file: &DocumentFile) -> Result<(), ApiError> {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.metadata.name.clone());
        if !file.metadata.mime_type.is_empty() {
            part = part.mime_str(&file.metadata.mime_type)?;
        }
        let form = Form::new()
            .text("user_name", user_name.to_string())
            .part("file", part);

        let url = self.endpoint(&["avatar", user_name, "upload-document"])?;
        self.execute(self.client.post(url).multipart(form)).await?;
        info!(
            handle = %user_name,
            file = %file.metadata.name,
            size = file.metadata.size,
            "Document uploaded"
        );
        Ok(())
    }

    async fn submit_knowledge(&self, payload: &KnowledgePayload) -> Result<(), ApiError> {
        let mut form = Form::new()
            .text("knowledge", payload.knowledge.clone())
            .text("user_name", payload.user_name.clone())
            .text("full_name", payload.full_name.clone())
            .text("headline", payload.headline.clone())
            .text("location", payload.location.clone())
            .text("short_bio", payload.short_bio.clone())
            .text("personality", payload.personality.clone());
        for skill in &payload.skills {
            form = form.text("skills[]", skill.clone());
        }
        form = form
            .text("about_yourself", payload.about_yourself.clone())
            .text("strength", payload.strength.clone());
        if let Some(ref tone) = payload.custom_tone {
            form = form.text("customTone", tone.clone());
        }

        let url = self.endpoint(&["avatar", "add-knowledge"])?;
        self.execute(self.client.post(url).multipart(form)).await?;
        info!(handle = %payload.user_name, skills = payload.skills.len(), "Knowledge record submitted");
        Ok(())
    }

    async fn increase_knowledge(
        &self,
        user_name: &str,
        knowledge: &str,
    ) -> Result<ReplyEnvelope, ApiError> {
        let form = Form::new()
            .text("user_name", user_name.to_string())
            .text("knowledge", knowledge.to_string());
        let url = self.endpoint(&["avatar", "increase-knowledge"])?;
        self.execute_json(self.client.post(url).multipart(form)).await
    }

    async fn send_message(
        &self,
        user_name: &str,
        text: &str,
        contact_email: &str,
    ) -> Result<ReplyEnvelope, ApiError> {
        let form = Form::new()
            .text("user_name", user_name.to_string())
            .text("message", text.to_string())
            .text("email", contact_email.to_string());
        let url = self.endpoint(&["avatar", user_name, "chat"])?;
        self.execute_json(self.client.post(url).multipart(form)).await
    }

    async fn fetch_profile(&self, user_name: &str) -> Result<Option<AvatarDetails>, ApiError> {
        let url = self.endpoint(&["avatar", "details"])?;
        let response: AvatarDetailsResponse = self
            .execute_json(self.client.get(url).query(&[("user_name", user_name)]))
            .await?;
        Ok(response.data.and_then(|records| records.into_iter().next()))
    }

    async fn fetch_conversation_history(
        &self,
        user_name: &str,
    ) -> Result<Vec<ConversationRecord>, ApiError> {
        let url = self.endpoint(&["avatar", user_name, "chat-history"])?;
        let response: ChatHistoryResponse = self.execute_json(self.client.get(url)).await?;
        let chats = response.data.map(|d| d.chats).unwrap_or_default();
        debug!(handle = %user_name, conversations = chats.len(), "Chat history fetched");
        Ok(chats)
    }

    async fn resolve_identity(&self, account_id: &str) -> Result<AgentCheck, ApiError> {
        let form = Form::new().text("oliv_id", account_id.to_string());
        let url = self.endpoint(&["avatar", "check-agent"])?;
        let response: CheckAgentResponse = self
            .execute_json(self.client.post(url).multipart(form))
            .await?;
        Ok(response.data.unwrap_or_default())
    }
}
