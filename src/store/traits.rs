//! `LocalStore` trait: the read/write contract for client-local persisted state.
//!
//! Values are opaque strings keyed by name, mirroring browser local storage.
//! Typed access lives with the owners of each key (`identity`, `wizard::store`).

use crate::error::StorageError;

/// Backend-agnostic key/value store for client-local state.
pub trait LocalStore: Send + Sync {
    /// Read a value. Missing keys are `None`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Well-known storage keys.
pub mod keys {
    /// Account bootstrap record (JSON).
    pub const ACCOUNT: &str = "olivData";
    /// In-progress wizard draft (JSON).
    pub const DRAFT: &str = "avatarDraft";
    /// Legacy flat keys that may carry the user name directly.
    pub const LEGACY_USER_NAME_KEYS: &[&str] = &["user_name", "username", "agent_id", "fullName"];
}
