//! Expertise step: suggested and custom tags.

use std::sync::Arc;

use crate::error::{ValidationError, WizardError};
use crate::wizard::draft::DraftPatch;

use super::{StepContext, StepOutcome};

pub const SUGGESTED_EXPERTISE: [&str; 12] = [
    "Design",
    "Engineering",
    "Product",
    "Marketing",
    "Business",
    "Finance",
    "Operations",
    "HR",
    "Sales",
    "Data Science",
    "Content",
    "Strategy",
];

pub struct ExpertiseStep {
    ctx: Arc<StepContext>,
}

impl ExpertiseStep {
    pub fn enter(ctx: Arc<StepContext>) -> Self {
        Self { ctx }
    }

    pub async fn selected(&self) -> Vec<String> {
        self.ctx.sequencer.draft().await.expertise
    }

    /// Select or deselect a tag. Returns whether it is now selected.
    pub async fn toggle(&self, tag: &str) -> bool {
        let mut tags = self.selected().await;
        let now_selected = match tags.iter().position(|t| t == tag) {
            Some(i) => {
                tags.remove(i);
                false
            }
            None => {
                tags.push(tag.to_string());
                true
            }
        };
        self.ctx
            .sequencer
            .update_draft(DraftPatch::expertise(tags))
            .await;
        now_selected
    }

    /// Add a custom tag. Empty or already-selected tags are ignored.
    pub async fn add_custom(&self, raw: &str) -> bool {
        let tag = raw.trim();
        let mut tags = self.selected().await;
        if tag.is_empty() || tags.iter().any(|t| t == tag) {
            return false;
        }
        tags.push(tag.to_string());
        self.ctx
            .sequencer
            .update_draft(DraftPatch::expertise(tags))
            .await;
        true
    }

    pub async fn remove(&self, tag: &str) {
        let tags = self
            .selected()
            .await
            .into_iter()
            .filter(|t| t != tag)
            .collect();
        self.ctx
            .sequencer
            .update_draft(DraftPatch::expertise(tags))
            .await;
    }

    /// Continue; at least one tag is required.
    pub async fn submit(&self) -> Result<StepOutcome, WizardError> {
        if self.selected().await.is_empty() {
            return Err(ValidationError::new(
                "expertise",
                "Please select at least one area of expertise",
            )
            .into());
        }
        Ok(StepOutcome::Advanced(self.ctx.sequencer.next()))
    }
}
