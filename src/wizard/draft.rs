//! ProfileDraft: the in-progress avatar profile accumulated across steps.
//!
//! The draft is only ever changed through [`ProfileDraft::merge`], which
//! applies a [`DraftPatch`]. Merging is idempotent: applying the same patch
//! twice leaves the draft as it was after the first application.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::{AvatarDetails, FileMetadata, KnowledgePayload};
use crate::error::ValidationError;

/// Tone the avatar answers in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonalityType {
    #[default]
    Professional,
    Friendly,
    Humorous,
    Custom,
}

impl PersonalityType {
    pub const ALL: [PersonalityType; 4] = [
        PersonalityType::Professional,
        PersonalityType::Friendly,
        PersonalityType::Humorous,
        PersonalityType::Custom,
    ];

    /// Wire name, also used as the personality sent to the service.
    pub fn as_str(self) -> &'static str {
        match self {
            PersonalityType::Professional => "professional",
            PersonalityType::Friendly => "friendly",
            PersonalityType::Humorous => "humorous",
            PersonalityType::Custom => "custom",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PersonalityType::Professional => "Professional",
            PersonalityType::Friendly => "Friendly",
            PersonalityType::Humorous => "Humorous",
            PersonalityType::Custom => "My Own Style",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PersonalityType::Professional => "Clear, formal, and business-focused",
            PersonalityType::Friendly => "Warm, approachable, and conversational",
            PersonalityType::Humorous => "Light-hearted with personality",
            PersonalityType::Custom => "Define your unique tone",
        }
    }

    /// Case-insensitive parse of a wire name.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        Self::ALL.into_iter().find(|p| p.as_str() == normalized)
    }
}

impl fmt::Display for PersonalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The in-progress avatar profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileDraft {
    pub full_name: String,
    pub headline: String,
    pub location: String,
    pub bio: String,
    pub handle: String,
    pub handle_verified: bool,
    /// Unique tags, kept in insertion order for display.
    pub expertise: Vec<String>,
    pub personality: PersonalityType,
    pub custom_tone: String,
    /// Uploaded CV metadata. The bytes are never part of the draft.
    pub document: Option<FileMetadata>,
    /// Account token correlating this draft to a remote account.
    pub external_id: Option<String>,
}

/// A partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftPatch {
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub handle: Option<String>,
    pub handle_verified: Option<bool>,
    pub expertise: Option<Vec<String>>,
    pub personality: Option<PersonalityType>,
    pub custom_tone: Option<String>,
    /// `Some(None)` clears the document.
    pub document: Option<Option<FileMetadata>>,
    pub external_id: Option<String>,
}

impl DraftPatch {
    pub fn handle(handle: impl Into<String>) -> Self {
        Self {
            handle: Some(handle.into()),
            ..Default::default()
        }
    }

    pub fn bio(bio: impl Into<String>) -> Self {
        Self {
            bio: Some(bio.into()),
            ..Default::default()
        }
    }

    pub fn expertise(tags: Vec<String>) -> Self {
        Self {
            expertise: Some(tags),
            ..Default::default()
        }
    }

    /// Patch hydrating a draft from a stored remote profile.
    ///
    /// `personality` is normalized to lowercase. A known non-custom value
    /// clears the custom tone; an unknown value becomes `custom` with the raw
    /// value as tone.
    pub fn from_details(details: &AvatarDetails) -> Self {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());

        let handle = non_empty(&details.agent_id);
        let (personality, custom_tone) = match details
            .personality
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            None => (None, None),
            Some(raw) => match PersonalityType::parse(raw) {
                Some(PersonalityType::Custom) => (Some(PersonalityType::Custom), None),
                Some(known) => (Some(known), Some(String::new())),
                None => (Some(PersonalityType::Custom), Some(raw.to_string())),
            },
        };

        Self {
            full_name: non_empty(&details.name),
            headline: non_empty(&details.headline),
            location: non_empty(&details.location),
            bio: non_empty(&details.bio),
            handle_verified: handle.as_ref().map(|_| true),
            handle,
            expertise: details.skills.clone(),
            personality,
            custom_tone,
            ..Default::default()
        }
    }
}

impl ProfileDraft {
    /// Apply a patch. Returns whether anything changed.
    ///
    /// Changing the handle without an explicit verified flag drops the
    /// verification: a verified handle never changes silently.
    pub fn merge(&mut self, patch: DraftPatch) -> bool {
        let before = self.clone();

        let handle_changed = patch.handle.as_ref().is_some_and(|h| *h != self.handle);

        if let Some(v) = patch.full_name {
            self.full_name = v;
        }
        if let Some(v) = patch.headline {
            self.headline = v;
        }
        if let Some(v) = patch.location {
            self.location = v;
        }
        if let Some(v) = patch.bio {
            self.bio = v;
        }
        if let Some(v) = patch.handle {
            self.handle = v;
        }
        match patch.handle_verified {
            Some(verified) => self.handle_verified = verified,
            None if handle_changed => self.handle_verified = false,
            None => {}
        }
        if let Some(tags) = patch.expertise {
            self.expertise = dedup_tags(tags);
        }
        if let Some(v) = patch.personality {
            self.personality = v;
        }
        if let Some(v) = patch.custom_tone {
            self.custom_tone = v;
        }
        if let Some(v) = patch.document {
            self.document = v;
        }
        if let Some(v) = patch.external_id {
            self.external_id = Some(v);
        }

        *self != before
    }

    /// Whether the draft can be submitted as a knowledge record.
    pub fn validate_for_submit(&self) -> Result<(), ValidationError> {
        if self.handle.trim().is_empty() {
            return Err(ValidationError::new("handle", "Please enter a handle name"));
        }
        if self.personality == PersonalityType::Custom && self.custom_tone.trim().is_empty() {
            return Err(ValidationError::new(
                "customTone",
                "Please describe your custom tone",
            ));
        }
        Ok(())
    }

    /// Personality as sent to the service: the custom tone for `custom`,
    /// otherwise the type name.
    pub fn personality_for_submit(&self) -> String {
        match self.personality {
            PersonalityType::Custom => self.custom_tone.trim().to_string(),
            other => other.as_str().to_string(),
        }
    }

    /// Build the knowledge record for this draft.
    pub fn knowledge_payload(
        &self,
        knowledge: &str,
        about_yourself: &str,
        strength: &str,
    ) -> KnowledgePayload {
        KnowledgePayload {
            user_name: self.handle.clone(),
            knowledge: knowledge.to_string(),
            full_name: self.full_name.clone(),
            headline: self.headline.clone(),
            location: self.location.clone(),
            short_bio: self.bio.clone(),
            personality: self.personality_for_submit(),
            skills: self.expertise.clone(),
            about_yourself: about_yourself.to_string(),
            strength: strength.to_string(),
            custom_tone: (self.personality == PersonalityType::Custom)
                .then(|| self.custom_tone.trim().to_string()),
        }
    }
}

/// Trim tags and drop empties and duplicates, keeping first occurrences.
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_merge_is_idempotent() {
        let mut draft = ProfileDraft::default();
        assert!(draft.merge(DraftPatch::bio("x")));
        let after_first = draft.clone();
        assert!(!draft.merge(DraftPatch::bio("x")));
        assert_eq!(draft, after_first);
        assert_eq!(draft.bio, "x");
    }

    #[test]
    fn changing_handle_drops_verification() {
        let mut draft = ProfileDraft::default();
        draft.merge(DraftPatch {
            handle: Some("alice".into()),
            handle_verified: Some(true),
            ..Default::default()
        });
        assert!(draft.handle_verified);

        // Same handle keeps verification.
        draft.merge(DraftPatch::handle("alice"));
        assert!(draft.handle_verified);

        draft.merge(DraftPatch::handle("alice2"));
        assert!(!draft.handle_verified);
        assert_eq!(draft.handle, "alice2");
    }

    #[test]
    fn expertise_is_unique() {
        let mut draft = ProfileDraft::default();
        draft.merge(DraftPatch::expertise(vec![
            "Design".into(),
            " Design ".into(),
            "Data Science".into(),
            "".into(),
        ]));
        assert_eq!(draft.expertise, vec!["Design", "Data Science"]);
    }

    #[test]
    fn document_can_be_cleared() {
        let mut draft = ProfileDraft {
            document: Some(FileMetadata {
                name: "cv.pdf".into(),
                size: 1,
                mime_type: "application/pdf".into(),
                last_modified: 0,
            }),
            ..Default::default()
        };
        draft.merge(DraftPatch {
            document: Some(None),
            ..Default::default()
        });
        assert!(draft.document.is_none());
    }

    #[test]
    fn custom_personality_requires_tone() {
        let mut draft = ProfileDraft {
            handle: "alice".into(),
            personality: PersonalityType::Custom,
            ..Default::default()
        };
        let err = draft.validate_for_submit().unwrap_err();
        assert_eq!(err.field, "customTone");

        draft.custom_tone = "Dry wit".into();
        assert!(draft.validate_for_submit().is_ok());
        let payload = draft.knowledge_payload("k", "a", "s");
        assert_eq!(payload.personality, "Dry wit");
        assert_eq!(payload.custom_tone.as_deref(), Some("Dry wit"));
    }

    #[test]
    fn non_custom_personality_sends_type_name() {
        let draft = ProfileDraft {
            handle: "alice".into(),
            personality: PersonalityType::Friendly,
            custom_tone: "ignored".into(),
            ..Default::default()
        };
        let payload = draft.knowledge_payload("k", "a", "s");
        assert_eq!(payload.personality, "friendly");
        assert!(payload.custom_tone.is_none());
    }

    #[test]
    fn hydration_normalizes_personality() {
        let mut draft = ProfileDraft {
            custom_tone: "old tone".into(),
            ..Default::default()
        };
        draft.merge(DraftPatch::from_details(&AvatarDetails {
            name: Some("Alice".into()),
            agent_id: Some("alice".into()),
            personality: Some("Friendly".into()),
            skills: Some(vec!["Design".into()]),
            ..Default::default()
        }));
        assert_eq!(draft.personality, PersonalityType::Friendly);
        assert_eq!(draft.custom_tone, "");
        assert_eq!(draft.handle, "alice");
        assert!(draft.handle_verified);
        assert_eq!(draft.expertise, vec!["Design"]);

        draft.merge(DraftPatch::from_details(&AvatarDetails {
            personality: Some("Sarcastic but kind".into()),
            ..Default::default()
        }));
        assert_eq!(draft.personality, PersonalityType::Custom);
        assert_eq!(draft.custom_tone, "Sarcastic but kind");
        assert_eq!(draft.full_name, "Alice");
    }

    #[test]
    fn draft_serializes_camel_case() {
        let draft = ProfileDraft {
            full_name: "Alice".into(),
            handle_verified: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["fullName"], "Alice");
        assert_eq!(json["handleVerified"], true);
        assert_eq!(json["personality"], "professional");
    }
}
