//! ProfileStore: the shared profile draft, mirrored into the local store.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::store::{LocalStore, keys};

use super::draft::{DraftPatch, ProfileDraft};

/// Process-wide holder of the profile draft.
///
/// Every step reads from here, so re-entering a step shows the latest values.
/// The draft is persisted after each change; persistence failures are logged
/// and otherwise ignored.
pub struct ProfileStore {
    draft: RwLock<ProfileDraft>,
    local: Arc<dyn LocalStore>,
}

impl ProfileStore {
    /// Hydrate from the persisted draft, or start empty.
    pub fn load(local: Arc<dyn LocalStore>) -> Arc<Self> {
        let draft = match local.get(keys::DRAFT) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Persisted draft is malformed, starting empty");
                ProfileDraft::default()
            }),
            None => ProfileDraft::default(),
        };
        Arc::new(Self {
            draft: RwLock::new(draft),
            local,
        })
    }

    pub async fn snapshot(&self) -> ProfileDraft {
        self.draft.read().await.clone()
    }

    /// Merge a patch and persist the result when it changed.
    pub async fn update(&self, patch: DraftPatch) -> ProfileDraft {
        let mut draft = self.draft.write().await;
        if draft.merge(patch) {
            self.persist(&draft);
        }
        draft.clone()
    }

    /// Drop the persisted copy. The in-memory draft stays for the remaining
    /// steps.
    pub fn clear_persisted(&self) {
        match self.local.remove(keys::DRAFT) {
            Ok(()) => debug!("Persisted draft cleared"),
            Err(e) => warn!(error = %e, "Failed to clear persisted draft"),
        }
    }

    fn persist(&self, draft: &ProfileDraft) {
        let json = match serde_json::to_string(draft) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize draft");
                return;
            }
        };
        if let Err(e) = self.local.set(keys::DRAFT, &json) {
            warn!(error = %e, "Failed to persist draft");
        }
    }
}
