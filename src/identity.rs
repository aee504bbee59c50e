//! Account bootstrap record and avatar identity resolution.
//!
//! The studio is opened with a `q` query parameter carrying a base64 JSON
//! blob that seeds the candidate/employer identity. It is cached in the local
//! store and re-read on later loads. Every read goes through
//! [`AccountRecord::load`], which never fails: missing or malformed content
//! yields [`AccountRecord::default`].

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::api::AvatarApi;
use crate::error::AccountError;
use crate::store::{LocalStore, keys};

/// The candidate who owns the avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Candidate {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub about: String,
    pub location: String,
    pub phone_number: String,
}

impl Default for Candidate {
    fn default() -> Self {
        Self {
            id: String::new(),
            username: "guest".to_string(),
            email: "guest@yopmail.com".to_string(),
            full_name: String::new(),
            about: String::new(),
            location: String::new(),
            phone_number: String::new(),
        }
    }
}

/// The employer (recruiter) talking to an avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Employer {
    pub email: String,
}

impl Default for Employer {
    fn default() -> Self {
        Self {
            email: "guestemp@yopmail.com".to_string(),
        }
    }
}

/// Account bootstrap record.
///
/// Older clients stored a flat object (`id`, `user_name`, `handle`, ...); those
/// keys are kept in `legacy` so identity lookups keep working.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(default)]
    pub candidate: Candidate,
    #[serde(default)]
    pub employer: Employer,
    #[serde(flatten)]
    pub legacy: Map<String, Value>,
}

impl AccountRecord {
    /// Read the cached record. Missing or malformed content yields the default.
    pub fn load(store: &dyn LocalStore) -> Self {
        let Some(raw) = store.get(keys::ACCOUNT) else {
            return Self::default();
        };
        match serde_json::from_str::<Self>(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Stored account record is malformed, using default");
                Self::default()
            }
        }
    }

    /// Resolve the record on first load.
    ///
    /// With a `q` parameter the decoded record replaces the cache. Without one,
    /// the cached record is used, and a default is written if nothing usable
    /// is cached.
    pub fn bootstrap(store: &dyn LocalStore, query: Option<&str>) -> Self {
        let record = match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => Self::decode_query(q).unwrap_or_else(|e| {
                warn!(error = %e, "Failed to decode account query parameter, using default");
                Self::default()
            }),
            None => match store.get(keys::ACCOUNT) {
                Some(raw) => match serde_json::from_str::<Self>(&raw) {
                    Ok(record) => return record,
                    Err(e) => {
                        warn!(error = %e, "Stored account record is malformed, resetting");
                        Self::default()
                    }
                },
                None => Self::default(),
            },
        };
        record.save(store);
        record
    }

    /// Decode a base64 JSON blob. Only `candidate` and `employer` are kept,
    /// each merged over the defaults.
    pub fn decode_query(q: &str) -> Result<Self, AccountError> {
        let bytes = [STANDARD, URL_SAFE, STANDARD_NO_PAD, URL_SAFE_NO_PAD]
            .iter()
            .find_map(|engine| engine.decode(q).ok())
            .ok_or(AccountError::InvalidBase64)?;
        let parsed: Self = serde_json::from_slice(&bytes)?;
        Ok(Self {
            candidate: parsed.candidate,
            employer: parsed.employer,
            legacy: Map::new(),
        })
    }

    /// Write the record to the store. Failures are logged, never surfaced.
    pub fn save(&self, store: &dyn LocalStore) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize account record");
                return;
            }
        };
        if let Err(e) = store.set(keys::ACCOUNT, &json) {
            warn!(error = %e, "Failed to persist account record");
        }
    }

    fn legacy_str(&self, key: &str) -> Option<String> {
        match self.legacy.get(key)? {
            Value::String(s) if is_present(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Opaque account id: `id`, `oliv_id`, `candidate.id`, `user_id`, `userId`.
    pub fn account_id(&self) -> Option<String> {
        self.legacy_str("id")
            .or_else(|| self.legacy_str("oliv_id"))
            .or_else(|| Some(self.candidate.id.clone()).filter(|s| is_present(s)))
            .or_else(|| self.legacy_str("user_id"))
            .or_else(|| self.legacy_str("userId"))
    }

    /// User name carried directly by the record.
    pub fn user_name(&self) -> Option<String> {
        ["username", "fullName", "user_name", "agent_id", "handle"]
            .iter()
            .find_map(|key| self.legacy_str(key))
    }

    /// Email the avatar should attribute chat messages to.
    pub fn contact_email(&self) -> &str {
        &self.employer.email
    }
}

/// Account ids arrive as strings or numbers depending on the issuer.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn is_present(value: &str) -> bool {
    !value.is_empty() && value != "undefined" && value != "null"
}

/// User name cached locally: flat legacy keys first, then the account record.
pub fn stored_user_name(store: &dyn LocalStore) -> Option<String> {
    keys::LEGACY_USER_NAME_KEYS
        .iter()
        .find_map(|key| store.get(key).filter(|v| is_present(v)))
        .or_else(|| AccountRecord::load(store).user_name())
}

/// Which avatar the current account owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentIdentity {
    pub exists: bool,
    pub user_name: Option<String>,
}

impl AgentIdentity {
    fn from_store(store: &dyn LocalStore) -> Self {
        let user_name = stored_user_name(store);
        Self {
            exists: user_name.is_some(),
            user_name,
        }
    }
}

/// Resolve the avatar owned by this account.
///
/// A remote answer carrying a user name wins. Otherwise, or when the remote
/// call fails, the locally cached name is used.
pub async fn resolve_agent_identity(api: &dyn AvatarApi, store: &dyn LocalStore) -> AgentIdentity {
    let Some(account_id) = AccountRecord::load(store).account_id() else {
        return AgentIdentity::from_store(store);
    };

    match api.resolve_identity(&account_id).await {
        Ok(check) => match check.user_name.filter(|n| !n.is_empty()) {
            Some(user_name) => {
                debug!(%account_id, %user_name, exists = check.exists, "Resolved avatar identity");
                AgentIdentity {
                    exists: check.exists,
                    user_name: Some(user_name),
                }
            }
            None => AgentIdentity::from_store(store),
        },
        Err(e) => {
            warn!(%account_id, error = %e, "Failed to resolve avatar identity, using cached name");
            AgentIdentity::from_store(store)
        }
    }
}
