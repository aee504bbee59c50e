//! Hand-written test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::api::{
    AgentCheck, AvatarApi, AvatarDetails, AvatarResponse, ConversationRecord,
    CreateAvatarRequest, DocumentFile, KnowledgePayload, ReplyEnvelope,
};
use crate::error::ApiError;
use crate::notify::{Clipboard, Notifier, ToastKind};
use crate::routes::Navigator;

type Queue<T> = Mutex<VecDeque<Result<T, ApiError>>>;

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn pop_or_default<T: Default>(queue: &Queue<T>) -> Result<T, ApiError> {
    lock(queue).pop_front().unwrap_or_else(|| Ok(T::default()))
}

/// Scripted `AvatarApi`. Each method pops the next queued result and answers
/// `Ok(Default)` once its queue is empty.
#[derive(Default)]
pub(crate) struct StubApi {
    handles: Queue<AvatarResponse>,
    uploads: Queue<()>,
    knowledge: Queue<()>,
    replies: Queue<ReplyEnvelope>,
    profiles: Queue<Option<AvatarDetails>>,
    histories: Queue<Vec<ConversationRecord>>,
    identities: Queue<AgentCheck>,
    calls: Mutex<Vec<(&'static str, Vec<String>)>>,
    handle_requests: Mutex<Vec<CreateAvatarRequest>>,
    submitted: Mutex<Vec<KnowledgePayload>>,
    reply_gate: Mutex<Option<Arc<Notify>>>,
    history_gate: Mutex<Option<Arc<Notify>>>,
}

impl StubApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_handle(&self, result: Result<AvatarResponse, ApiError>) {
        lock(&self.handles).push_back(result);
    }

    pub fn push_upload(&self, result: Result<(), ApiError>) {
        lock(&self.uploads).push_back(result);
    }

    pub fn push_knowledge(&self, result: Result<(), ApiError>) {
        lock(&self.knowledge).push_back(result);
    }

    /// Queue a reply for either `send_message` or `increase_knowledge`.
    pub fn push_reply(&self, result: Result<ReplyEnvelope, ApiError>) {
        lock(&self.replies).push_back(result);
    }

    pub fn push_reply_text(&self, text: &str) {
        self.push_reply(Ok(ReplyEnvelope {
            reply: Some(text.to_string()),
            ..Default::default()
        }));
    }

    pub fn push_profile(&self, result: Result<Option<AvatarDetails>, ApiError>) {
        lock(&self.profiles).push_back(result);
    }

    pub fn push_history(&self, result: Result<Vec<ConversationRecord>, ApiError>) {
        lock(&self.histories).push_back(result);
    }

    pub fn push_identity(&self, result: Result<AgentCheck, ApiError>) {
        lock(&self.identities).push_back(result);
    }

    /// Hold every reply until the returned handle is notified.
    pub fn gate_replies(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.reply_gate) = Some(Arc::clone(&gate));
        gate
    }

    /// Hold every history fetch until the returned handle is notified.
    pub fn gate_history(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.history_gate) = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self, method: &str) -> usize {
        lock(&self.calls).iter().filter(|(m, _)| *m == method).count()
    }

    pub fn last_args(&self, method: &str) -> Option<Vec<String>> {
        lock(&self.calls)
            .iter()
            .rev()
            .find(|(m, _)| *m == method)
            .map(|(_, args)| args.clone())
    }

    pub fn handle_requests(&self) -> Vec<CreateAvatarRequest> {
        lock(&self.handle_requests).clone()
    }

    pub fn submitted(&self) -> Vec<KnowledgePayload> {
        lock(&self.submitted).clone()
    }

    fn record(&self, method: &'static str, args: &[&str]) {
        lock(&self.calls).push((method, args.iter().map(|a| a.to_string()).collect()));
    }

    async fn next_reply(&self) -> Result<ReplyEnvelope, ApiError> {
        let gate = lock(&self.reply_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        pop_or_default(&self.replies)
    }
}

#[async_trait]
impl AvatarApi for StubApi {
    async fn check_handle_availability(
        &self,
        request: &CreateAvatarRequest,
    ) -> Result<AvatarResponse, ApiError> {
        self.record(
            "check_handle_availability",
            &[&request.user_name, &request.oliv_id, &request.email],
        );
        lock(&self.handle_requests).push(request.clone());
        pop_or_default(&self.handles)
    }

    async fn upload_document(&self, user_name: &str, file: &DocumentFile) -> Result<(), ApiError> {
        self.record("upload_document", &[user_name, &file.metadata.name]);
        pop_or_default(&self.uploads)
    }

    async fn submit_knowledge(&self, payload: &KnowledgePayload) -> Result<(), ApiError> {
        self.record("submit_knowledge", &[&payload.user_name, &payload.knowledge]);
        lock(&self.submitted).push(payload.clone());
        pop_or_default(&self.knowledge)
    }

    async fn increase_knowledge(
        &self,
        user_name: &str,
        knowledge: &str,
    ) -> Result<ReplyEnvelope, ApiError> {
        self.record("increase_knowledge", &[user_name, knowledge]);
        self.next_reply().await
    }

    async fn send_message(
        &self,
        user_name: &str,
        text: &str,
        contact_email: &str,
    ) -> Result<ReplyEnvelope, ApiError> {
        self.record("send_message", &[user_name, text, contact_email]);
        self.next_reply().await
    }

    async fn fetch_profile(&self, user_name: &str) -> Result<Option<AvatarDetails>, ApiError> {
        self.record("fetch_profile", &[user_name]);
        pop_or_default(&self.profiles)
    }

    async fn fetch_conversation_history(
        &self,
        user_name: &str,
    ) -> Result<Vec<ConversationRecord>, ApiError> {
        self.record("fetch_conversation_history", &[user_name]);
        let gate = lock(&self.history_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        pop_or_default(&self.histories)
    }

    async fn resolve_identity(&self, account_id: &str) -> Result<AgentCheck, ApiError> {
        self.record("resolve_identity", &[account_id]);
        pop_or_default(&self.identities)
    }
}

/// Notifier that keeps every toast.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    toasts: Mutex<Vec<(ToastKind, String)>>,
}

impl RecordingNotifier {
    pub fn toasts(&self) -> Vec<(ToastKind, String)> {
        lock(&self.toasts).clone()
    }

    pub fn last(&self) -> Option<(ToastKind, String)> {
        lock(&self.toasts).last().cloned()
    }

    pub fn last_error(&self) -> Option<String> {
        lock(&self.toasts)
            .iter()
            .rev()
            .find(|(kind, _)| *kind == ToastKind::Error)
            .map(|(_, message)| message.clone())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: ToastKind, message: &str) {
        lock(&self.toasts).push((kind, message.to_string()));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NavKind {
    Push,
    Replace,
}

/// Navigator that keeps every route write.
#[derive(Default)]
pub(crate) struct RecordingNavigator {
    writes: Mutex<Vec<(NavKind, String)>>,
}

impl RecordingNavigator {
    pub fn writes(&self) -> Vec<(NavKind, String)> {
        lock(&self.writes).clone()
    }

    pub fn last(&self) -> Option<(NavKind, String)> {
        lock(&self.writes).last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn push(&self, path: &str) {
        lock(&self.writes).push((NavKind::Push, path.to_string()));
    }

    fn replace(&self, path: &str) {
        lock(&self.writes).push((NavKind::Replace, path.to_string()));
    }
}

/// Clipboard that keeps every write; `unavailable()` refuses them.
#[derive(Default)]
pub(crate) struct RecordingClipboard {
    unavailable: bool,
    copied: Mutex<Vec<String>>,
}

impl RecordingClipboard {
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn copied(&self) -> Vec<String> {
        lock(&self.copied).clone()
    }
}

impl Clipboard for RecordingClipboard {
    fn write_text(&self, text: &str) -> bool {
        if self.unavailable {
            return false;
        }
        lock(&self.copied).push(text.to_string());
        true
    }
}

/// A rejection carrying the given JSON body.
pub(crate) fn rejection(status: u16, body: serde_json::Value) -> ApiError {
    ApiError::Rejected {
        status,
        body: serde_json::from_value(body).unwrap(),
    }
}
