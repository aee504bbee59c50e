//! Manage dashboard: view and edit an existing avatar.
//!
//! Editing works on a copy of the loaded profile. Entering edit mode takes a
//! snapshot; cancel restores it and the dirty flag is simply
//! `current != snapshot`.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::{AvatarApi, DocumentFile, KnowledgePayload};
use crate::error::ApiError;
use crate::identity::{resolve_agent_identity, stored_user_name};
use crate::lifecycle::ViewLifecycle;
use crate::notify::Notifier;
use crate::store::LocalStore;
use crate::wizard::draft::{DraftPatch, PersonalityType, ProfileDraft};
use crate::wizard::steps::upload::check_extension;

pub const PROFILE_UPDATE_KNOWLEDGE: &str = "Profile updated via Manage Avatar page.";

/// `1536` → `1.5 KB`. Bytes have no decimal; zero renders as a dash.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "—".to_string();
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{size:.0} {}", UNITS[unit])
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

/// Knowledge record sent when saving dashboard edits.
pub fn profile_update_payload(user_name: &str, profile: &ProfileDraft) -> KnowledgePayload {
    let strength = if profile.expertise.is_empty() {
        "Key strengths include adaptability and collaboration.".to_string()
    } else {
        format!("Key strengths: {}.", profile.expertise.join(", "))
    };
    let personality = match profile.personality {
        PersonalityType::Custom if profile.custom_tone.trim().is_empty() => "custom".to_string(),
        PersonalityType::Custom => profile.custom_tone.clone(),
        other => other.as_str().to_string(),
    };

    KnowledgePayload {
        user_name: user_name.to_string(),
        knowledge: PROFILE_UPDATE_KNOWLEDGE.to_string(),
        full_name: profile.full_name.clone(),
        headline: profile.headline.clone(),
        location: profile.location.clone(),
        short_bio: profile.bio.clone(),
        personality,
        skills: profile.expertise.clone(),
        about_yourself: format!(
            "Hi! I'm {}, based in {}. {}",
            profile.full_name, profile.location, profile.bio
        ),
        strength,
        custom_tone: Some(profile.custom_tone.clone()),
    }
}

/// A document listed under the avatar's knowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeFile {
    pub name: String,
    pub size_label: String,
}

#[derive(Debug, Default)]
struct ManageState {
    handle: Option<String>,
    profile: ProfileDraft,
    snapshot: ProfileDraft,
    editing: bool,
    saving: bool,
    loading: bool,
    uploading: bool,
    files: Vec<KnowledgeFile>,
}

pub struct ManageDashboard {
    api: Arc<dyn AvatarApi>,
    store: Arc<dyn LocalStore>,
    notifier: Arc<dyn Notifier>,
    lifecycle: ViewLifecycle,
    state: RwLock<ManageState>,
}

impl ManageDashboard {
    pub fn new(api: Arc<dyn AvatarApi>, store: Arc<dyn LocalStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            store,
            notifier,
            lifecycle: ViewLifecycle::new(),
            state: RwLock::new(ManageState::default()),
        }
    }

    /// Resolve the avatar (stored handle first) and load its profile.
    pub async fn load(&self) {
        let guard = self.lifecycle.guard();
        self.state.write().await.loading = true;

        let handle = match stored_user_name(self.store.as_ref()) {
            Some(handle) => Some(handle),
            None => resolve_agent_identity(self.api.as_ref(), self.store.as_ref())
                .await
                .user_name,
        };
        if !guard.is_mounted() {
            return;
        }
        let Some(handle) = handle else {
            debug!("No avatar to manage");
            self.state.write().await.loading = false;
            return;
        };
        self.state.write().await.handle = Some(handle.clone());

        let result = self.api.fetch_profile(&handle).await;
        if !guard.is_mounted() {
            return;
        }
        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(Some(details)) => {
                if state.editing {
                    debug!(%handle, "Editing in progress, keeping local changes");
                } else {
                    state.profile.merge(DraftPatch::from_details(&details));
                    state.snapshot = state.profile.clone();
                }
            }
            Ok(None) => debug!(%handle, "Avatar has no stored profile"),
            Err(e) => {
                warn!(%handle, error = %e, "Failed to load avatar details");
                self.notifier.error("Failed to load avatar details.");
            }
        }
    }

    pub fn unmount(&self) {
        self.lifecycle.unmount();
    }

    pub async fn handle(&self) -> Option<String> {
        self.state.read().await.handle.clone()
    }

    pub async fn profile(&self) -> ProfileDraft {
        self.state.read().await.profile.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn is_editing(&self) -> bool {
        self.state.read().await.editing
    }

    pub async fn is_saving(&self) -> bool {
        self.state.read().await.saving
    }

    pub async fn is_dirty(&self) -> bool {
        let state = self.state.read().await;
        state.profile != state.snapshot
    }

    pub async fn enter_edit(&self) {
        let mut state = self.state.write().await;
        state.snapshot = state.profile.clone();
        state.editing = true;
    }

    pub async fn cancel_edit(&self) {
        let mut state = self.state.write().await;
        state.profile = state.snapshot.clone();
        state.editing = false;
    }

    /// Apply a field change. Ignored unless editing and not saving.
    pub async fn update(&self, patch: DraftPatch) -> bool {
        let mut state = self.state.write().await;
        if !state.editing || state.saving {
            return false;
        }
        state.profile.merge(patch)
    }

    pub async fn toggle_expertise(&self, tag: &str) -> bool {
        let mut tags = self.state.read().await.profile.expertise.clone();
        match tags.iter().position(|t| t == tag) {
            Some(i) => {
                tags.remove(i);
            }
            None => tags.push(tag.to_string()),
        }
        self.update(DraftPatch::expertise(tags)).await
    }

    pub async fn add_custom_skill(&self, raw: &str) -> bool {
        let tag = raw.trim();
        let mut tags = self.state.read().await.profile.expertise.clone();
        if tag.is_empty() || tags.iter().any(|t| t == tag) {
            return false;
        }
        tags.push(tag.to_string());
        self.update(DraftPatch::expertise(tags)).await
    }

    /// Save edits as a knowledge record, then reload the stored profile.
    ///
    /// Returns `Ok(false)` when there is nothing to save.
    pub async fn save(&self) -> Result<bool, ApiError> {
        let (user_name, payload) = {
            let mut state = self.state.write().await;
            if !state.editing || state.saving || state.profile == state.snapshot {
                return Ok(false);
            }
            state.saving = true;
            let user_name = state
                .handle
                .clone()
                .unwrap_or_else(|| state.profile.handle.clone());
            let payload = profile_update_payload(&user_name, &state.profile);
            (user_name, payload)
        };

        let result = self.api.submit_knowledge(&payload).await;
        if let Err(e) = result {
            self.state.write().await.saving = false;
            warn!(handle = %user_name, error = %e, "Failed to save avatar changes");
            let message = e.detail(&[]).unwrap_or_else(|| match &e {
                ApiError::Transport(m) if !m.is_empty() => m.clone(),
                _ => "Failed to save changes.".to_string(),
            });
            self.notifier.error(&message);
            return Err(e);
        }

        info!(handle = %user_name, "Avatar profile updated");
        self.notifier.success("Your avatar has been updated successfully.");

        let refreshed = self.api.fetch_profile(&user_name).await;
        let mut state = self.state.write().await;
        match refreshed {
            Ok(Some(details)) => {
                state.profile.merge(DraftPatch::from_details(&details));
            }
            Ok(None) => {}
            Err(e) => warn!(handle = %user_name, error = %e, "Failed to refresh avatar details"),
        }
        state.snapshot = state.profile.clone();
        state.editing = false;
        state.saving = false;
        Ok(true)
    }

    pub async fn files(&self) -> Vec<KnowledgeFile> {
        self.state.read().await.files.clone()
    }

    /// Upload a knowledge document for the avatar.
    pub async fn upload_document(&self, file: DocumentFile) -> bool {
        if check_extension(&file).is_err() {
            self.notifier.error("Only PDF, DOC, or DOCX files are allowed.");
            return false;
        }

        let user_name = {
            let mut state = self.state.write().await;
            if state.uploading {
                return false;
            }
            state.uploading = true;
            state.files = vec![KnowledgeFile {
                name: file.metadata.name.clone(),
                size_label: format_file_size(file.metadata.size),
            }];
            state.handle.clone().unwrap_or_else(|| {
                let suffix = Uuid::new_v4().simple().to_string();
                format!("user_{}", &suffix[..6])
            })
        };

        let result = self.api.upload_document(&user_name, &file).await;
        let mut state = self.state.write().await;
        state.uploading = false;
        match result {
            Ok(()) => {
                self.notifier.success("Document uploaded successfully.");
                true
            }
            Err(e) => {
                warn!(handle = %user_name, error = %e, "Document upload failed");
                state.files.clear();
                self.notifier.error("Failed to upload document. Please try again.");
                false
            }
        }
    }

    pub async fn remove_file(&self, name: &str) {
        self.state.write().await.files.retain(|f| f.name != name);
        self.notifier.success("Document removed");
    }

    /// `{host}/{handle}`.
    pub async fn public_link(&self, host: &str) -> String {
        let state = self.state.read().await;
        let handle = state.handle.as_deref().unwrap_or(&state.profile.handle);
        format!("{host}/{handle}")
    }
}
