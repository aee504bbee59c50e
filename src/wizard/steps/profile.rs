//! Profile step: name, headline, location and bio.

use std::sync::Arc;

use crate::error::{ValidationError, WizardError};
use crate::identity::AccountRecord;
use crate::wizard::draft::{DraftPatch, ProfileDraft};

use super::{StepContext, StepOutcome};

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 20;
pub const HEADLINE_MIN: usize = 2;
pub const HEADLINE_MAX: usize = 100;
pub const BIO_MAX: usize = 300;

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub full_name: String,
    pub headline: String,
    pub location: String,
    pub bio: String,
}

impl ProfileForm {
    /// Draft values, falling back to the bootstrap record for empty fields.
    pub fn prefilled(draft: &ProfileDraft, account: &AccountRecord) -> Self {
        let pick = |draft_value: &str, seed: &str| {
            if draft_value.is_empty() {
                seed.to_string()
            } else {
                draft_value.to_string()
            }
        };
        Self {
            full_name: pick(&draft.full_name, &account.candidate.full_name),
            headline: draft.headline.clone(),
            location: pick(&draft.location, &account.candidate.location),
            bio: pick(&draft.bio, &account.candidate.about),
        }
    }

    /// Every field error, in display order.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let name_len = self.full_name.trim().chars().count();
        if name_len == 0 {
            errors.push(ValidationError::new("fullName", "Full name is required"));
        } else if !(NAME_MIN..=NAME_MAX).contains(&name_len) {
            errors.push(ValidationError::new(
                "fullName",
                format!("Full name must be between {NAME_MIN} and {NAME_MAX} characters"),
            ));
        }

        let headline_len = self.headline.trim().chars().count();
        if headline_len == 0 {
            errors.push(ValidationError::new("headline", "Headline is required"));
        } else if !(HEADLINE_MIN..=HEADLINE_MAX).contains(&headline_len) {
            errors.push(ValidationError::new(
                "headline",
                format!("Headline must be between {HEADLINE_MIN} and {HEADLINE_MAX} characters"),
            ));
        }

        if self.location.trim().is_empty() {
            errors.push(ValidationError::new("location", "Location is required"));
        }

        let bio_len = self.bio.trim().chars().count();
        if bio_len == 0 {
            errors.push(ValidationError::new("bio", "Bio is required"));
        } else if bio_len > BIO_MAX {
            errors.push(ValidationError::new(
                "bio",
                format!("Bio must be at most {BIO_MAX} characters"),
            ));
        }

        errors
    }
}

pub struct ProfileStep {
    ctx: Arc<StepContext>,
    pub form: ProfileForm,
    errors: Vec<ValidationError>,
}

impl ProfileStep {
    pub async fn enter(ctx: Arc<StepContext>) -> Self {
        let draft = ctx.sequencer.draft().await;
        let form = ProfileForm::prefilled(&draft, &ctx.account);
        Self {
            ctx,
            form,
            errors: Vec::new(),
        }
    }

    /// Error shown under `field`, if any.
    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub async fn submit(&mut self) -> Result<StepOutcome, WizardError> {
        self.errors = self.form.validate();
        if let Some(first) = self.errors.first() {
            return Err(first.clone().into());
        }

        self.ctx
            .sequencer
            .update_draft(DraftPatch {
                full_name: Some(self.form.full_name.trim().to_string()),
                headline: Some(self.form.headline.trim().to_string()),
                location: Some(self.form.location.trim().to_string()),
                bio: Some(self.form.bio.trim().to_string()),
                ..Default::default()
            })
            .await;
        Ok(StepOutcome::Advanced(self.ctx.sequencer.next()))
    }

    pub fn back(&self) -> StepOutcome {
        StepOutcome::Advanced(self.ctx.sequencer.back())
    }
}
