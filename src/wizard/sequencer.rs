//! WizardSequencer: step pointer plus the single draft mutation entry point.
//!
//! The route is the source of truth for position: the host reports every
//! route change through [`WizardSequencer::on_route`], and navigation writes a
//! route through the [`Navigator`]. Step-specific validation is the business
//! of each step controller; the sequencer only enforces index bounds.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info};

use crate::routes::Navigator;

use super::draft::{DraftPatch, ProfileDraft};
use super::step::{Progress, WizardStep, clamp_index, step_index_for};
use super::store::ProfileStore;

pub struct WizardSequencer {
    navigator: Arc<dyn Navigator>,
    profile: Arc<ProfileStore>,
    current: AtomicUsize,
}

impl WizardSequencer {
    pub fn new(navigator: Arc<dyn Navigator>, profile: Arc<ProfileStore>) -> Self {
        Self {
            navigator,
            profile,
            current: AtomicUsize::new(1),
        }
    }

    /// Sync the pointer with the active route segment.
    ///
    /// An unknown or missing segment resolves to the first step and replaces
    /// the route with the first step's canonical one.
    pub fn on_route(&self, segment: Option<&str>) -> WizardStep {
        let index = step_index_for(segment);
        self.current.store(index, Ordering::Release);

        let step = WizardStep::from_index(index).unwrap_or(WizardStep::Welcome);
        if segment != Some(step.slug()) {
            debug!(segment = ?segment, "Unknown wizard step, redirecting to first step");
            self.navigator.replace(&step.route());
        }
        step
    }

    pub fn current_index(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    pub fn current_step(&self) -> WizardStep {
        WizardStep::from_index(self.current_index()).unwrap_or(WizardStep::Welcome)
    }

    pub fn progress(&self) -> Progress {
        Progress::of(self.current_step())
    }

    /// Clamp `index` into `[1, N]` and route to that step.
    pub fn go_to(&self, index: i64) -> WizardStep {
        let index = clamp_index(index);
        let step = WizardStep::from_index(index).unwrap_or(WizardStep::Welcome);
        let previous = self.current.swap(index, Ordering::AcqRel);
        if previous != index {
            info!(from = previous, to = index, step = %step, "Wizard step changed");
        }
        self.navigator.push(&step.route());
        step
    }

    /// Advance one step; no-op on the last step.
    pub fn next(&self) -> WizardStep {
        let current = self.current_index();
        if current >= WizardStep::COUNT {
            return self.current_step();
        }
        self.go_to(current as i64 + 1)
    }

    /// Go back one step; no-op on the first step.
    pub fn back(&self) -> WizardStep {
        let current = self.current_index();
        if current <= 1 {
            return self.current_step();
        }
        self.go_to(current as i64 - 1)
    }

    /// Merge fields into the shared draft. The only mutation path.
    pub async fn update_draft(&self, patch: DraftPatch) -> ProfileDraft {
        self.profile.update(patch).await
    }

    pub async fn draft(&self) -> ProfileDraft {
        self.profile.snapshot().await
    }

    pub fn profile(&self) -> &Arc<ProfileStore> {
        &self.profile
    }
}
