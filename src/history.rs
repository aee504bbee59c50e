//! Chat history viewer: read-only list of past conversations.
//!
//! Conversations are fetched wholesale for the resolved avatar and never
//! mutated locally. Filtering and sorting happen client-side.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::api::{AvatarApi, ConversationRecord, HistoryMessage, SenderKind};
use crate::error::ApiError;
use crate::identity::resolve_agent_identity;
use crate::lifecycle::ViewLifecycle;
use crate::notify::{Clipboard, Notifier};
use crate::store::LocalStore;

const LOAD_FAILED: &str = "Unable to load chat history.";
const AVATAR_LABEL: &str = "Your Avatar";
const DEFAULT_PARTICIPANT: &str = "Recruiter";

/// Parse a service timestamp: `YYYY-MM-DD HH:MM:SS` (space or `T`, naive
/// times are UTC) or RFC 3339. Anything else is treated as missing.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let normalized = raw.replacen(' ', "T", 1);
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Timestamp of the conversation's last message.
pub fn last_activity(conversation: &ConversationRecord) -> Option<DateTime<Utc>> {
    conversation
        .messages
        .last()
        .and_then(|m| m.created_at.as_deref())
        .and_then(parse_timestamp)
}

/// Most recent first; conversations without a timestamp go last. Ties keep
/// list order.
pub fn sort_by_recent(conversations: &[ConversationRecord]) -> Vec<ConversationRecord> {
    let mut sorted = conversations.to_vec();
    sorted.sort_by_key(|c| std::cmp::Reverse(last_activity(c)));
    sorted
}

/// Conversations whose participant name or any message contains `query`,
/// case-insensitively. A blank query keeps everything.
pub fn filter_conversations(
    conversations: &[ConversationRecord],
    query: &str,
) -> Vec<ConversationRecord> {
    let term = query.trim().to_lowercase();
    if term.is_empty() {
        return conversations.to_vec();
    }
    conversations
        .iter()
        .filter(|c| {
            let participant = c
                .user
                .as_ref()
                .map(|u| u.user_name.to_lowercase())
                .unwrap_or_default();
            participant.contains(&term)
                || c.messages
                    .iter()
                    .any(|m| m.message.to_lowercase().contains(&term))
        })
        .cloned()
        .collect()
}

/// Selection after a load: keep `previous` when it is still listed, else the
/// most recent conversation. On equal or missing timestamps the later entry
/// in the list wins.
pub fn select_most_recent(conversations: &[ConversationRecord], previous: Option<i64>) -> Option<i64> {
    if let Some(id) = previous
        && conversations.iter().any(|c| c.conversation_id == id)
    {
        return Some(id);
    }

    let mut best: Option<(Option<DateTime<Utc>>, i64)> = None;
    for conversation in conversations {
        let ts = last_activity(conversation);
        if best.as_ref().is_none_or(|(best_ts, _)| ts >= *best_ts) {
            best = Some((ts, conversation.conversation_id));
        }
    }
    best.map(|(_, id)| id)
}

/// Label shown above a message.
pub fn sender_label(message: &HistoryMessage, participant: Option<&str>) -> String {
    let is_avatar = message
        .sender
        .as_ref()
        .is_some_and(|s| s.kind == SenderKind::Agent);
    if is_avatar {
        return AVATAR_LABEL.to_string();
    }
    participant
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_PARTICIPANT)
        .to_string()
}

/// Human-readable timestamp, or the raw value when it cannot be parsed.
pub fn format_timestamp(raw: Option<&str>) -> String {
    match raw {
        None => String::new(),
        Some(raw) => parse_timestamp(raw)
            .map(|dt| dt.format("%b %-d, %Y, %-I:%M %p").to_string())
            .unwrap_or_else(|| raw.to_string()),
    }
}

fn load_error_message(e: &ApiError) -> String {
    if let Some(message) = e.detail(&[]) {
        return message;
    }
    match e {
        ApiError::Transport(m) | ApiError::Decode(m) if !m.is_empty() => m.clone(),
        _ => LOAD_FAILED.to_string(),
    }
}

#[derive(Debug, Default)]
struct HistoryState {
    user_name: Option<String>,
    conversations: Vec<ConversationRecord>,
    selected: Option<i64>,
    query: String,
    loading: bool,
}

/// Chat history view state.
pub struct ChatHistoryView {
    api: Arc<dyn AvatarApi>,
    store: Arc<dyn LocalStore>,
    notifier: Arc<dyn Notifier>,
    /// Handle known to the current session, used when nothing else resolves.
    session_handle: Option<String>,
    lifecycle: ViewLifecycle,
    state: RwLock<HistoryState>,
}

impl ChatHistoryView {
    pub fn new(
        api: Arc<dyn AvatarApi>,
        store: Arc<dyn LocalStore>,
        notifier: Arc<dyn Notifier>,
        session_handle: Option<String>,
    ) -> Self {
        Self {
            api,
            store,
            notifier,
            session_handle: session_handle.filter(|h| !h.is_empty()),
            lifecycle: ViewLifecycle::new(),
            state: RwLock::new(HistoryState {
                loading: true,
                ..Default::default()
            }),
        }
    }

    /// Resolve the avatar and fetch its conversations.
    ///
    /// Results arriving after [`ChatHistoryView::unmount`] are discarded.
    pub async fn load(&self) {
        let guard = self.lifecycle.guard();

        let identity = resolve_agent_identity(self.api.as_ref(), self.store.as_ref()).await;
        if !guard.is_mounted() {
            return;
        }
        let Some(user_name) = identity.user_name.or_else(|| self.session_handle.clone()) else {
            debug!("No avatar identity, nothing to load");
            self.state.write().await.loading = false;
            return;
        };

        {
            let mut state = self.state.write().await;
            state.user_name = Some(user_name.clone());
            state.loading = true;
        }

        let result = self.api.fetch_conversation_history(&user_name).await;
        if !guard.is_mounted() {
            debug!(%user_name, "History view unmounted, dropping result");
            return;
        }

        let mut state = self.state.write().await;
        match result {
            Ok(chats) => {
                state.selected = select_most_recent(&chats, state.selected);
                state.conversations = chats;
            }
            Err(e) => {
                warn!(%user_name, error = %e, "Failed to load chat history");
                state.conversations.clear();
                state.selected = None;
                self.notifier.error(&load_error_message(&e));
            }
        }
        state.loading = false;
    }

    /// Tear the view down; in-flight loads are discarded.
    pub fn unmount(&self) {
        self.lifecycle.unmount();
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn user_name(&self) -> Option<String> {
        self.state.read().await.user_name.clone()
    }

    pub async fn set_query(&self, query: &str) {
        self.state.write().await.query = query.to_string();
    }

    /// Sorted then filtered list for the sidebar.
    pub async fn visible(&self) -> Vec<ConversationRecord> {
        let state = self.state.read().await;
        filter_conversations(&sort_by_recent(&state.conversations), &state.query)
    }

    pub async fn select(&self, conversation_id: i64) -> bool {
        let mut state = self.state.write().await;
        let known = state
            .conversations
            .iter()
            .any(|c| c.conversation_id == conversation_id);
        if known {
            state.selected = Some(conversation_id);
        }
        known
    }

    pub async fn selected(&self) -> Option<ConversationRecord> {
        let state = self.state.read().await;
        let id = state.selected?;
        state
            .conversations
            .iter()
            .find(|c| c.conversation_id == id)
            .cloned()
    }

    pub fn copy(&self, clipboard: &dyn Clipboard, content: &str) -> bool {
        if clipboard.write_text(content) {
            self.notifier.success("Copied to clipboard");
            true
        } else {
            self.notifier.error("Clipboard not available in this browser.");
            false
        }
    }
}
