//! The fixed wizard step sequence and its route mapping.

use std::fmt;

use crate::routes::AVATAR_CREATION_BASE;

/// One step of the avatar creation wizard, in sequence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    Welcome,
    Handle,
    Profile,
    UploadData,
    Expertise,
    Personality,
    Preview,
    Share,
}

impl WizardStep {
    /// Every step, in order.
    pub const ALL: [WizardStep; 8] = [
        WizardStep::Welcome,
        WizardStep::Handle,
        WizardStep::Profile,
        WizardStep::UploadData,
        WizardStep::Expertise,
        WizardStep::Personality,
        WizardStep::Preview,
        WizardStep::Share,
    ];

    /// Number of steps (N).
    pub const COUNT: usize = Self::ALL.len();

    /// Route segment identifying the step.
    pub fn slug(self) -> &'static str {
        match self {
            WizardStep::Welcome => "welcome-step",
            WizardStep::Handle => "handle-step",
            WizardStep::Profile => "profile-step",
            WizardStep::UploadData => "upload-data-step",
            WizardStep::Expertise => "expertise-step",
            WizardStep::Personality => "personality-step",
            WizardStep::Preview => "preview-step",
            WizardStep::Share => "share-step",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Welcome => "Welcome",
            WizardStep::Handle => "Choose your handle",
            WizardStep::Profile => "Your profile",
            WizardStep::UploadData => "Upload your CV",
            WizardStep::Expertise => "Areas of expertise",
            WizardStep::Personality => "Avatar personality",
            WizardStep::Preview => "Preview your avatar",
            WizardStep::Share => "Share your avatar",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.slug() == slug)
    }

    /// 1-based position.
    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|step| *step == self)
            .map_or(1, |i| i + 1)
    }

    /// Step at a 1-based position.
    pub fn from_index(index: usize) -> Option<Self> {
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    /// Canonical route, e.g. `/avatar-creation/handle-step`.
    pub fn route(self) -> String {
        format!("{AVATAR_CREATION_BASE}/{}", self.slug())
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Map a route segment to a 1-based step index. Unknown or missing segments
/// map to 1.
pub fn step_index_for(segment: Option<&str>) -> usize {
    segment
        .and_then(WizardStep::from_slug)
        .map_or(1, WizardStep::index)
}

/// Clamp any requested index into `[1, N]`.
pub fn clamp_index(requested: i64) -> usize {
    requested.clamp(1, WizardStep::COUNT as i64) as usize
}

/// Progress indicator for the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl Progress {
    pub fn of(step: WizardStep) -> Self {
        Self {
            current: step.index(),
            total: WizardStep::COUNT,
        }
    }

    /// "Step i of N".
    pub fn label(&self) -> String {
        format!("Step {} of {}", self.current, self.total)
    }

    /// Rounded completion percentage.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.current as f64 / self.total as f64) * 100.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_slug_maps_to_its_index() {
        for (i, step) in WizardStep::ALL.iter().enumerate() {
            assert_eq!(step_index_for(Some(step.slug())), i + 1);
            assert_eq!(WizardStep::from_index(i + 1), Some(*step));
        }
    }

    #[test]
    fn unknown_segment_is_first_step() {
        assert_eq!(step_index_for(Some("nope")), 1);
        assert_eq!(step_index_for(Some("")), 1);
        assert_eq!(step_index_for(None), 1);
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp_index(-5), 1);
        assert_eq!(clamp_index(0), 1);
        assert_eq!(clamp_index(3), 3);
        assert_eq!(clamp_index(999), WizardStep::COUNT);
        assert_eq!(clamp_index(i64::MAX), WizardStep::COUNT);
    }

    #[test]
    fn progress_label_and_percent() {
        let p = Progress::of(WizardStep::Profile);
        assert_eq!(p.label(), "Step 3 of 8");
        assert_eq!(p.percent(), 38);
        assert_eq!(Progress::of(WizardStep::Share).percent(), 100);
    }

    #[test]
    fn route_uses_creation_base() {
        assert_eq!(WizardStep::Handle.route(), "/avatar-creation/handle-step");
        assert!(WizardStep::from_index(0).is_none());
        assert!(WizardStep::from_index(9).is_none());
    }
}
