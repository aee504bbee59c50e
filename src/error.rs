//! Error types for Avatar Studio.

use std::collections::HashMap;

use serde::Deserialize;

/// Top-level error type for the studio.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Structured error body returned by the remote service.
///
/// The service answers `{ "success": false, "message": "...", "errors": { "field": ["..."] } }`
/// on validation failures; every part is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "deserialize_field_errors")]
    pub errors: HashMap<String, Vec<String>>,
}

/// `errors` is sometimes an empty JSON array instead of an object.
fn deserialize_field_errors<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let mut out = HashMap::new();
    if let serde_json::Value::Object(map) = value {
        for (field, messages) in map {
            let messages = match messages {
                serde_json::Value::Array(items) => items
                    .into_iter()
                    .filter_map(|m| m.as_str().map(String::from))
                    .collect(),
                serde_json::Value::String(s) => vec![s],
                _ => Vec::new(),
            };
            out.insert(field, messages);
        }
    }
    Ok(out)
}

impl ErrorBody {
    /// First message recorded for `field`, if any.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
            .filter(|m| !m.is_empty())
    }
}

/// Remote service errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Service rejected the request with status {status}")]
    Rejected { status: u16, body: ErrorBody },

    #[error("Session is no longer authenticated")]
    Unauthenticated,

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// The most specific message the service gave us.
    ///
    /// Per-field errors are tried in the order of `fields`, then the body's
    /// generic `message`.
    pub fn detail(&self, fields: &[&str]) -> Option<String> {
        let ApiError::Rejected { body, .. } = self else {
            return None;
        };
        fields
            .iter()
            .find_map(|field| body.field_error(field))
            .map(String::from)
            .or_else(|| body.message.clone().filter(|m| !m.is_empty()))
    }

    /// Whether the service answered with a structured `success: false` body.
    pub fn is_structured_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected { body, .. } if body.success == Some(false))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// Local persisted-state errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Account bootstrap decoding errors.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Account query is not valid base64")]
    InvalidBase64,

    #[error("Account query is not a valid record: {0}")]
    InvalidRecord(#[from] serde_json::Error),
}

/// A field-level validation failure, resolved locally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Wizard step errors.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Remote call failed: {0}")]
    Remote(#[from] ApiError),

    #[error("Handle {handle} has not been verified")]
    NotVerified { handle: String },
}

/// Chat session errors.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("An exchange is already in flight")]
    Busy,

    #[error("Message {index} is not an editable user message")]
    NotEditable { index: usize },

    #[error("Message is empty")]
    EmptyInput,
}

/// Result type alias for the studio.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(json: serde_json::Value) -> ApiError {
        ApiError::Rejected {
            status: 422,
            body: serde_json::from_value(json).unwrap(),
        }
    }

    #[test]
    fn detail_prefers_field_errors_in_order() {
        let err = rejected(serde_json::json!({
            "success": false,
            "message": "The given data was invalid.",
            "errors": {
                "oliv_id": ["The oliv id has already been taken."],
                "user_name": ["The user name has already been taken."]
            }
        }));

        assert_eq!(
            err.detail(&["user_name", "oliv_id"]).as_deref(),
            Some("The user name has already been taken.")
        );
        assert_eq!(
            err.detail(&["oliv_id"]).as_deref(),
            Some("The oliv id has already been taken.")
        );
        assert!(err.is_structured_rejection());
    }

    #[test]
    fn detail_falls_back_to_message() {
        let err = rejected(serde_json::json!({ "message": "Avatar not found" }));
        assert_eq!(err.detail(&["agentId"]).as_deref(), Some("Avatar not found"));
        assert!(!err.is_structured_rejection());
    }

    #[test]
    fn detail_is_none_for_transport_errors() {
        let err = ApiError::Transport("connection refused".into());
        assert!(err.detail(&["user_name"]).is_none());
    }

    #[test]
    fn errors_array_deserializes_as_empty() {
        let body: ErrorBody =
            serde_json::from_value(serde_json::json!({ "success": false, "errors": [] })).unwrap();
        assert!(body.errors.is_empty());
        assert_eq!(body.success, Some(false));
    }
}
