//! Avatar creation wizard: step sequencer, profile draft and step controllers.

pub mod draft;
pub mod sequencer;
pub mod step;
pub mod steps;
pub mod store;

pub use draft::{DraftPatch, PersonalityType, ProfileDraft};
pub use sequencer::WizardSequencer;
pub use step::{Progress, WizardStep, clamp_index, step_index_for};
pub use steps::{StepContext, StepOutcome};
pub use store::ProfileStore;
