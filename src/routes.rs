//! Route table and navigation.
//!
//! The route is the source of truth for wizard position; everything else
//! (draft contents, chat state) lives in the components.

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Base path of the creation wizard.
pub const AVATAR_CREATION_BASE: &str = "/avatar-creation";

/// Top-level segments that are not avatar handles.
const RESERVED: &[&str] = &["avatar-creation", "update", "chat-history", "manage", "login"];

/// A parsed application route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    /// `/avatar-creation[/{step}]`; the step segment is kept raw.
    AvatarCreation { step: Option<String> },
    /// `/{handle}`: talk to an avatar.
    Chat { handle: String },
    /// `/update` without a handle.
    UpdateIndex,
    /// `/update/{handle}`: train an avatar.
    Update { handle: String },
    ChatHistory,
    Manage,
    NotFound,
}

impl Route {
    /// Parse a path, ignoring query string, fragment and trailing slashes.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["avatar-creation"] => Route::AvatarCreation { step: None },
            ["avatar-creation", step] => Route::AvatarCreation {
                step: Some((*step).to_string()),
            },
            ["update"] => Route::UpdateIndex,
            ["update", handle] => Route::Update {
                handle: (*handle).to_string(),
            },
            ["chat-history"] => Route::ChatHistory,
            ["manage"] => Route::Manage,
            [handle] if !RESERVED.contains(handle) => Route::Chat {
                handle: (*handle).to_string(),
            },
            _ => Route::NotFound,
        }
    }

    /// Canonical path for this route.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::AvatarCreation { step: None } => AVATAR_CREATION_BASE.to_string(),
            Route::AvatarCreation { step: Some(step) } => format!("{AVATAR_CREATION_BASE}/{step}"),
            Route::Chat { handle } => format!("/{handle}"),
            Route::UpdateIndex => "/update".to_string(),
            Route::Update { handle } => format!("/update/{handle}"),
            Route::ChatHistory => "/chat-history".to_string(),
            Route::Manage => "/manage".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Router abstraction: components write routes, the host applies them.
pub trait Navigator: Send + Sync {
    /// Navigate, adding a history entry.
    fn push(&self, path: &str);

    /// Navigate, replacing the current history entry.
    fn replace(&self, path: &str);
}

/// In-memory router keeping a history stack.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    entries: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: Mutex::new(vec![initial.to_string()]),
        }
    }

    /// Current path, if any navigation happened.
    pub fn current(&self) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Number of history entries.
    pub fn depth(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Navigator for HistoryNavigator {
    fn push(&self, path: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }

    fn replace(&self, path: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.last_mut() {
            Some(last) => *last = path.to_string(),
            None => entries.push(path.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(
            Route::parse("/avatar-creation/handle-step?x=1"),
            Route::AvatarCreation {
                step: Some("handle-step".into())
            }
        );
        assert_eq!(
            Route::parse("/avatar-creation/"),
            Route::AvatarCreation { step: None }
        );
        assert_eq!(
            Route::parse("/alice"),
            Route::Chat {
                handle: "alice".into()
            }
        );
        assert_eq!(
            Route::parse("/update/alice"),
            Route::Update {
                handle: "alice".into()
            }
        );
        assert_eq!(Route::parse("/update"), Route::UpdateIndex);
        assert_eq!(Route::parse("/chat-history"), Route::ChatHistory);
        assert_eq!(Route::parse("/manage#top"), Route::Manage);
        assert_eq!(Route::parse("/alice/extra"), Route::NotFound);
    }

    #[test]
    fn path_round_trips_through_parse() {
        for route in [
            Route::Home,
            Route::Login,
            Route::AvatarCreation {
                step: Some("preview-step".into()),
            },
            Route::Chat {
                handle: "bob-1".into(),
            },
            Route::Update {
                handle: "bob-1".into(),
            },
            Route::ChatHistory,
            Route::Manage,
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn history_navigator_push_and_replace() {
        let nav = HistoryNavigator::new("/avatar-creation");
        nav.replace("/avatar-creation/welcome-step");
        assert_eq!(nav.depth(), 1);
        nav.push("/avatar-creation/handle-step");
        assert_eq!(nav.depth(), 2);
        assert_eq!(nav.current().as_deref(), Some("/avatar-creation/handle-step"));
    }
}
