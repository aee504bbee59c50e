//! Preview step: show generated samples, collect feedback, submit the draft.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{ValidationError, WizardError};
use crate::wizard::draft::{PersonalityType, ProfileDraft};

use super::{StepContext, StepOutcome};

const EMPTY_FEEDBACK: &str = "Please describe the adjustments you want before continuing.";
const SUBMITTED: &str = "Your feedback has been shared with the avatar.";
const SUBMIT_FAILED: &str = "Failed to submit feedback. Please try again.";
const HANDLE_NOT_VERIFIED: &str = "Please confirm your handle again before continuing.";

/// A sample question with the answer the avatar would give.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleAnswer {
    pub question: &'static str,
    pub answer: String,
}

/// Opening line the avatar would use.
pub fn sample_intro(draft: &ProfileDraft) -> String {
    format!("Hi! I'm {}, {}. {}", draft.full_name, draft.headline, draft.bio)
}

/// "About yourself" and "strengths" sample answers, in that order.
pub fn sample_answers(draft: &ProfileDraft) -> [SampleAnswer; 2] {
    let top = |n: usize| draft.expertise.iter().take(n).cloned().collect::<Vec<_>>();
    let trait_phrase = match draft.personality {
        PersonalityType::Professional => "results-driven and detail-oriented",
        PersonalityType::Friendly => "collaborative and team-focused",
        _ => "creative and innovative",
    };

    [
        SampleAnswer {
            question: "Tell me about yourself",
            answer: format!(
                "I'm {}, based in {}. {} My expertise spans {}, and I'm passionate about \
                 bringing innovative solutions to challenging problems.",
                draft.full_name,
                draft.location,
                draft.bio,
                top(3).join(", ")
            ),
        },
        SampleAnswer {
            question: "What are your key strengths?",
            answer: format!(
                "My key strengths lie in {}. I combine technical expertise with strong \
                 communication skills, allowing me to bridge the gap between complex concepts \
                 and practical applications. I'm known for being {trait_phrase}.",
                top(2).join(" and ")
            ),
        },
    ]
}

pub struct PreviewStep {
    ctx: Arc<StepContext>,
    submitting: bool,
}

impl PreviewStep {
    pub fn enter(ctx: Arc<StepContext>) -> Self {
        Self {
            ctx,
            submitting: false,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub async fn intro(&self) -> String {
        sample_intro(&self.ctx.sequencer.draft().await)
    }

    pub async fn answers(&self) -> [SampleAnswer; 2] {
        sample_answers(&self.ctx.sequencer.draft().await)
    }

    /// Submit the draft with the user's feedback as knowledge.
    ///
    /// On success the persisted draft is cleared and the wizard moves to the
    /// share step.
    pub async fn submit(&mut self, feedback: &str) -> Result<StepOutcome, WizardError> {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            self.ctx.notifier.error(EMPTY_FEEDBACK);
            return Err(ValidationError::new("knowledge", EMPTY_FEEDBACK).into());
        }

        let draft = self.ctx.sequencer.draft().await;
        if let Err(e) = draft.validate_for_submit() {
            self.ctx.notifier.error(&e.message);
            return Err(e.into());
        }
        if !draft.handle_verified {
            warn!(handle = %draft.handle, "Handle changed since verification, refusing to submit");
            self.ctx.notifier.error(HANDLE_NOT_VERIFIED);
            return Err(WizardError::NotVerified {
                handle: draft.handle,
            });
        }

        let [about, strength] = sample_answers(&draft);
        let payload = draft.knowledge_payload(feedback, &about.answer, &strength.answer);

        self.submitting = true;
        let result = self.ctx.api.submit_knowledge(&payload).await;
        self.submitting = false;

        match result {
            Ok(()) => {
                info!(handle = %draft.handle, "Knowledge record submitted from preview");
                self.ctx.notifier.success(SUBMITTED);
                self.ctx.sequencer.profile().clear_persisted();
                Ok(StepOutcome::Advanced(self.ctx.sequencer.next()))
            }
            Err(e) => {
                warn!(handle = %draft.handle, error = %e, "Knowledge submission failed");
                self.ctx.notifier.error(SUBMIT_FAILED);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::store::keys;
    use crate::wizard::WizardStep;
    use crate::wizard::draft::DraftPatch;
    use crate::wizard::steps::fixtures::harness;

    async fn filled(h: &crate::wizard::steps::fixtures::Harness) {
        h.ctx
            .sequencer
            .update_draft(DraftPatch {
                full_name: Some("Alice".into()),
                headline: Some("Designer".into()),
                location: Some("Lisbon".into()),
                bio: Some("I draw.".into()),
                handle: Some("alice".into()),
                handle_verified: Some(true),
                expertise: Some(vec!["Design".into(), "Product".into(), "HR".into(), "Sales".into()]),
                ..Default::default()
            })
            .await;
    }

    #[test]
    fn samples_use_leading_expertise() {
        let draft = ProfileDraft {
            full_name: "Alice".into(),
            headline: "Designer".into(),
            bio: "I draw.".into(),
            expertise: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            personality: PersonalityType::Friendly,
            ..Default::default()
        };
        assert_eq!(sample_intro(&draft), "Hi! I'm Alice, Designer. I draw.");
        let [about, strength] = sample_answers(&draft);
        assert!(about.answer.contains("My expertise spans A, B, C,"));
        assert!(strength.answer.starts_with("My key strengths lie in A and B."));
        assert!(strength.answer.ends_with("collaborative and team-focused."));
    }

    #[tokio::test]
    async fn empty_feedback_is_rejected() {
        let h = harness(WizardStep::Preview);
        filled(&h).await;
        let mut step = PreviewStep::enter(h.ctx.clone());
        assert!(step.submit("   ").await.is_err());
        assert_eq!(h.notifier.last_error().as_deref(), Some(EMPTY_FEEDBACK));
        assert_eq!(h.api.calls("submit_knowledge"), 0);
    }

    #[tokio::test]
    async fn success_clears_persisted_draft_and_advances() {
        let h = harness(WizardStep::Preview);
        filled(&h).await;
        assert!(h.local.get(keys::DRAFT).is_some());

        let mut step = PreviewStep::enter(h.ctx.clone());
        let outcome = step.submit(" Be more concise ").await.unwrap();
        assert_eq!(outcome, StepOutcome::Advanced(WizardStep::Share));
        assert!(h.local.get(keys::DRAFT).is_none());

        let submitted = h.api.submitted();
        let payload = &submitted[0];
        assert_eq!(payload.knowledge, "Be more concise");
        assert_eq!(payload.personality, "professional");
        assert_eq!(payload.skills.len(), 4);
        assert!(payload.about_yourself.starts_with("I'm Alice, based in Lisbon."));
    }

    #[tokio::test]
    async fn failure_keeps_draft_and_step() {
        let h = harness(WizardStep::Preview);
        filled(&h).await;
        h.api.push_knowledge(Err(ApiError::Transport("down".into())));

        let mut step = PreviewStep::enter(h.ctx.clone());
        assert!(step.submit("More detail").await.is_err());
        assert_eq!(h.notifier.last_error().as_deref(), Some(SUBMIT_FAILED));
        assert!(h.local.get(keys::DRAFT).is_some());
        assert_eq!(h.ctx.sequencer.current_step(), WizardStep::Preview);
        assert!(!step.is_submitting());
    }

    #[tokio::test]
    async fn handle_changed_after_verification_is_not_submitted() {
        let h = harness(WizardStep::Preview);
        filled(&h).await;
        h.ctx
            .sequencer
            .update_draft(DraftPatch::handle("alice2"))
            .await;

        let mut step = PreviewStep::enter(h.ctx.clone());
        let err = step.submit("tweak").await.unwrap_err();
        assert!(matches!(err, WizardError::NotVerified { ref handle } if handle == "alice2"));
        assert_eq!(h.notifier.last_error().as_deref(), Some(HANDLE_NOT_VERIFIED));
        assert!(h.api.submitted().is_empty());
        assert_eq!(h.ctx.sequencer.current_step(), WizardStep::Preview);
    }

    #[tokio::test]
    async fn custom_without_tone_is_not_submitted() {
        let h = harness(WizardStep::Preview);
        filled(&h).await;
        h.ctx
            .sequencer
            .update_draft(DraftPatch {
                personality: Some(PersonalityType::Custom),
                ..Default::default()
            })
            .await;
        let mut step = PreviewStep::enter(h.ctx.clone());
        assert!(step.submit("ok").await.is_err());
        assert_eq!(h.api.calls("submit_knowledge"), 0);
    }
}
