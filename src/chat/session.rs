//! ChatSession: transcript plus the send / edit-and-resend lifecycle.
//!
//! At most one exchange is in flight per session. A second send while one is
//! outstanding is refused with [`ChatError::Busy`]; the in-flight flag is
//! released by a drop guard, so it clears even if the exchange future is
//! cancelled or panics.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use crate::error::ChatError;
use crate::notify::{Clipboard, Notifier};

use super::model::{ChatEvent, ChatMessage, FALLBACK_MESSAGES, fallback_message};
use super::responder::Responder;

const EVENT_CAPACITY: usize = 256;
const EDIT_FAILED: &str = "Error while updating message.";

/// Clears the in-flight flag on drop.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ChatSession {
    responder: Arc<dyn Responder>,
    notifier: Arc<dyn Notifier>,
    clipboard: Arc<dyn Clipboard>,
    transcript: RwLock<Vec<ChatMessage>>,
    failures: AtomicUsize,
    in_flight: AtomicBool,
    editing: Mutex<Option<usize>>,
    tx: broadcast::Sender<ChatEvent>,
}

impl ChatSession {
    pub fn new(
        responder: Arc<dyn Responder>,
        notifier: Arc<dyn Notifier>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self {
            responder,
            notifier,
            clipboard,
            transcript: RwLock::new(Vec::new()),
            failures: AtomicUsize::new(0),
            in_flight: AtomicBool::new(false),
            editing: Mutex::new(None),
            tx,
        }
    }

    /// Subscribe to scroll and typing events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.tx.subscribe()
    }

    pub async fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.transcript.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.transcript.read().await.is_empty()
    }

    /// Whether a reply is being awaited.
    pub fn is_awaiting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Index being edited, if any.
    pub fn editing(&self) -> Option<usize> {
        *self.editing.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submit input: resends the message being edited, otherwise sends a new one.
    pub async fn submit(&self, text: &str) -> Result<ChatMessage, ChatError> {
        match self.editing() {
            Some(index) => self.edit_and_resend(index, text).await,
            None => self.send(text).await,
        }
    }

    /// Append a user message, await the reply and append it.
    ///
    /// Returns the appended avatar message (a reply or a fallback).
    pub async fn send(&self, text: &str) -> Result<ChatMessage, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyInput);
        }
        let _guard = self.acquire()?;

        let len = {
            let mut transcript = self.transcript.write().await;
            transcript.push(ChatMessage::user(text));
            transcript.len()
        };
        self.emit(ChatEvent::ScrollToLatest { len });

        Ok(self.exchange(text, false).await)
    }

    /// Enter edit mode for a sent user message. Returns the text to prefill.
    pub async fn begin_edit(&self, index: usize) -> Result<String, ChatError> {
        let content = self.editable(index).await?;
        *self.editing.lock().unwrap_or_else(PoisonError::into_inner) = Some(index);
        Ok(content)
    }

    pub fn cancel_edit(&self) {
        *self.editing.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Replace a sent user message in place and resend it.
    ///
    /// The transcript keeps its order; the reply is appended at the end.
    pub async fn edit_and_resend(&self, index: usize, text: &str) -> Result<ChatMessage, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyInput);
        }
        let _guard = self.acquire()?;

        let len = {
            let mut transcript = self.transcript.write().await;
            match transcript.get_mut(index) {
                Some(message) if message.is_user() => message.content = text.to_string(),
                _ => return Err(ChatError::NotEditable { index }),
            }
            transcript.len()
        };
        self.cancel_edit();
        debug!(index, "User message edited");
        self.emit(ChatEvent::ScrollToLatest { len });

        Ok(self.exchange(text, true).await)
    }

    /// Copy a message to the clipboard. No state change.
    pub async fn copy(&self, index: usize) -> bool {
        let Some(content) = self
            .transcript
            .read()
            .await
            .get(index)
            .map(|m| m.content.clone())
        else {
            return false;
        };
        let copied = self.clipboard.write_text(&content);
        if copied {
            self.notifier.success("Copied!");
        }
        copied
    }

    /// Drop the whole transcript, e.g. when switching conversation.
    pub async fn reset(&self) {
        self.transcript.write().await.clear();
        self.cancel_edit();
        self.failures.store(0, Ordering::Release);
        self.emit(ChatEvent::ScrollToLatest { len: 0 });
    }

    fn acquire(&self) -> Result<InFlight<'_>, ChatError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ChatError::Busy)?;
        Ok(InFlight(&self.in_flight))
    }

    async fn editable(&self, index: usize) -> Result<String, ChatError> {
        self.transcript
            .read()
            .await
            .get(index)
            .filter(|m| m.is_user())
            .map(|m| m.content.clone())
            .ok_or(ChatError::NotEditable { index })
    }

    /// Run the remote exchange and append its outcome.
    async fn exchange(&self, text: &str, resend: bool) -> ChatMessage {
        self.emit(ChatEvent::Typing(true));

        let reply = match self.responder.exchange(text).await {
            Ok(reply) => {
                info!(chars = reply.len(), "Avatar replied");
                ChatMessage::avatar(reply)
            }
            Err(e) => {
                let n = self.failures.fetch_add(1, Ordering::AcqRel);
                warn!(error = %e, failures = n + 1, "Avatar exchange failed");
                let generic = if resend {
                    EDIT_FAILED
                } else {
                    self.responder.generic_error()
                };
                let toast = e
                    .detail(self.responder.error_fields())
                    .unwrap_or_else(|| generic.to_string());
                self.notifier.error(&toast);
                ChatMessage::avatar(fallback_message(n, &FALLBACK_MESSAGES))
            }
        };

        let len = {
            let mut transcript = self.transcript.write().await;
            transcript.push(reply.clone());
            transcript.len()
        };
        self.emit(ChatEvent::ScrollToLatest { len });
        self.emit(ChatEvent::Typing(false));
        reply
    }

    fn emit(&self, event: ChatEvent) {
        // No subscribers is fine.
        let _ = self.tx.send(event);
    }
}
