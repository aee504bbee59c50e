//! Per-step controllers.
//!
//! Each controller reads the current draft, validates its own fields and only
//! then calls `next()`. Remote failures are reported through the notifier and
//! leave the wizard on the current step.

pub mod expertise;
pub mod handle;
pub mod personality;
pub mod preview;
pub mod profile;
pub mod share;
pub mod upload;

use std::sync::Arc;

use crate::api::AvatarApi;
use crate::identity::AccountRecord;
use crate::notify::Notifier;

use super::sequencer::WizardSequencer;
use super::step::WizardStep;

pub use expertise::{ExpertiseStep, SUGGESTED_EXPERTISE};
pub use handle::{HandleAction, HandleStep, sanitize_handle};
pub use personality::PersonalityStep;
pub use preview::{PreviewStep, SampleAnswer};
pub use profile::{ProfileForm, ProfileStep};
pub use share::ShareStep;
pub use upload::{ACCEPTED_EXTENSIONS, UploadStep};

/// Everything a step controller needs.
pub struct StepContext {
    pub sequencer: Arc<WizardSequencer>,
    pub api: Arc<dyn AvatarApi>,
    pub notifier: Arc<dyn Notifier>,
    pub account: AccountRecord,
    /// Host shown in public links, e.g. `avatars.example.com`.
    pub app_host: String,
}

/// What a successful step action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Moved on to the given step.
    Advanced(WizardStep),
    /// Handle confirmed; the user continues with a second action.
    Verified,
}

/// The welcome step has no fields; starting simply advances.
pub fn start(ctx: &StepContext) -> StepOutcome {
    StepOutcome::Advanced(ctx.sequencer.next())
}
