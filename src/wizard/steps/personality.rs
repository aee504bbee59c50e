//! Personality step.

use std::sync::Arc;

use crate::error::{ValidationError, WizardError};
use crate::wizard::draft::{DraftPatch, PersonalityType};

use super::{StepContext, StepOutcome};

pub struct PersonalityStep {
    ctx: Arc<StepContext>,
}

impl PersonalityStep {
    pub fn enter(ctx: Arc<StepContext>) -> Self {
        Self { ctx }
    }

    pub async fn choose(&self, personality: PersonalityType) {
        self.ctx
            .sequencer
            .update_draft(DraftPatch {
                personality: Some(personality),
                ..Default::default()
            })
            .await;
    }

    pub async fn set_custom_tone(&self, tone: &str) {
        self.ctx
            .sequencer
            .update_draft(DraftPatch {
                custom_tone: Some(tone.to_string()),
                ..Default::default()
            })
            .await;
    }

    /// Continue; `custom` needs a non-empty tone.
    pub async fn submit(&self) -> Result<StepOutcome, WizardError> {
        let draft = self.ctx.sequencer.draft().await;
        if draft.personality == PersonalityType::Custom && draft.custom_tone.trim().is_empty() {
            return Err(ValidationError::new("customTone", "Please describe your custom tone").into());
        }
        Ok(StepOutcome::Advanced(self.ctx.sequencer.next()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::WizardStep;
    use crate::wizard::steps::fixtures::harness;

    #[tokio::test]
    async fn custom_needs_tone() {
        let h = harness(WizardStep::Personality);
        let step = PersonalityStep::enter(h.ctx.clone());
        step.choose(PersonalityType::Custom).await;
        assert!(step.submit().await.is_err());

        step.set_custom_tone("Calm and precise").await;
        assert_eq!(
            step.submit().await.unwrap(),
            StepOutcome::Advanced(WizardStep::Preview)
        );
    }

    #[tokio::test]
    async fn preset_personality_continues() {
        let h = harness(WizardStep::Personality);
        let step = PersonalityStep::enter(h.ctx.clone());
        step.choose(PersonalityType::Humorous).await;
        assert!(step.submit().await.is_ok());
        assert_eq!(
            h.ctx.sequencer.draft().await.personality,
            PersonalityType::Humorous
        );
    }
}
