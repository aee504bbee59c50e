//! Handle step: pick a public slug and reserve it remotely.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::CreateAvatarRequest;
use crate::error::{ValidationError, WizardError};
use crate::wizard::draft::DraftPatch;

use super::{StepContext, StepOutcome};

static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9-]").unwrap());

const EMPTY_HANDLE: &str = "Please enter a handle name";
const HANDLE_TAKEN: &str = "This link is already taken";
const HANDLE_AVAILABLE: &str = "This link is available!";
const CONNECTION_FAILED: &str = "Error connecting to server. Please try again.";

/// Lowercase and strip everything outside `[a-z0-9-]`.
pub fn sanitize_handle(raw: &str) -> String {
    DISALLOWED.replace_all(&raw.to_lowercase(), "").into_owned()
}

/// Label of the step's action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleAction {
    Confirm,
    Checking,
    Continue,
}

impl HandleAction {
    pub fn label(self) -> &'static str {
        match self {
            HandleAction::Confirm => "Confirm",
            HandleAction::Checking => "Checking...",
            HandleAction::Continue => "Continue →",
        }
    }
}

impl fmt::Display for HandleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub struct HandleStep {
    ctx: Arc<StepContext>,
    input: String,
    checking: bool,
}

impl HandleStep {
    pub async fn enter(ctx: Arc<StepContext>) -> Self {
        let input = ctx.sequencer.draft().await.handle;
        Self {
            ctx,
            input,
            checking: false,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_checking(&self) -> bool {
        self.checking
    }

    /// Link preview for the current input.
    pub fn public_link(&self) -> String {
        format!("{}/{}", self.ctx.app_host, self.input)
    }

    pub async fn action(&self) -> HandleAction {
        if self.checking {
            return HandleAction::Checking;
        }
        let draft = self.ctx.sequencer.draft().await;
        if draft.handle_verified && draft.handle == self.input && !self.input.is_empty() {
            HandleAction::Continue
        } else {
            HandleAction::Confirm
        }
    }

    /// Replace the input. A different handle drops any earlier verification.
    pub async fn set_input(&mut self, raw: &str) -> &str {
        self.input = sanitize_handle(raw);
        self.ctx
            .sequencer
            .update_draft(DraftPatch::handle(self.input.clone()))
            .await;
        &self.input
    }

    pub async fn clear(&mut self) {
        self.input.clear();
        self.ctx
            .sequencer
            .update_draft(DraftPatch {
                handle: Some(String::new()),
                handle_verified: Some(false),
                ..Default::default()
            })
            .await;
    }

    /// Confirm the handle, or continue once it is verified.
    pub async fn confirm(&mut self) -> Result<StepOutcome, WizardError> {
        if self.action().await == HandleAction::Continue {
            return Ok(StepOutcome::Advanced(self.ctx.sequencer.next()));
        }

        if self.input.trim().is_empty() {
            self.ctx.notifier.error(EMPTY_HANDLE);
            return Err(ValidationError::new("handle", EMPTY_HANDLE).into());
        }

        // Account id first, then the draft's own token, then a fresh one.
        let oliv_id = match self.ctx.account.account_id() {
            Some(id) => id,
            None => self
                .ctx
                .sequencer
                .draft()
                .await
                .external_id
                .unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
        };
        let request = CreateAvatarRequest {
            user_name: self.input.clone(),
            oliv_id,
            email: self.ctx.account.candidate.email.clone(),
        };

        self.checking = true;
        let result = self.ctx.api.check_handle_availability(&request).await;
        self.checking = false;

        match result {
            Ok(_) => {
                info!(handle = %self.input, "Handle verified");
                self.ctx.notifier.success(HANDLE_AVAILABLE);
                self.ctx
                    .sequencer
                    .update_draft(DraftPatch {
                        handle: Some(self.input.clone()),
                        handle_verified: Some(true),
                        external_id: Some(request.oliv_id.clone()),
                        ..Default::default()
                    })
                    .await;
                Ok(StepOutcome::Verified)
            }
            Err(e) => {
                let message = if e.is_structured_rejection() {
                    e.detail(&["user_name", "oliv_id"])
                        .unwrap_or_else(|| HANDLE_TAKEN.to_string())
                } else {
                    CONNECTION_FAILED.to_string()
                };
                warn!(handle = %self.input, error = %e, "Handle check failed");
                self.ctx.notifier.error(&message);
                Err(e.into())
            }
        }
    }
}
