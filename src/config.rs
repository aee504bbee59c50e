//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default transport timeout for remote calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Runtime configuration for the studio client.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Base URL of the avatar service, without trailing slash.
    pub api_base_url: String,
    /// Bearer token sent with every request, if any.
    pub api_token: Option<SecretString>,
    /// Transport timeout. A timeout is handled like any other remote failure.
    pub request_timeout: Duration,
    /// Where the client-local state file lives.
    pub state_path: PathBuf,
    /// Host shown in public avatar links (`{host}/{handle}`).
    pub app_host: String,
}

impl StudioConfig {
    /// Build a config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = std::env::var("AVATAR_API_BASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("AVATAR_API_BASE_URL".to_string()))?;
        let api_base_url = normalize_base_url(&api_base_url)?;

        let api_token = std::env::var("AVATAR_API_TOKEN")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(SecretString::from);

        let timeout_secs: u64 = match std::env::var("AVATAR_API_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "AVATAR_API_TIMEOUT_SECS".to_string(),
                message: format!("expected a whole number of seconds, got {raw:?}"),
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let state_path = std::env::var("AVATAR_STUDIO_STATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/avatar-studio.json"));

        let app_host =
            std::env::var("AVATAR_STUDIO_HOST").unwrap_or_else(|_| "localhost:3000".to_string());

        Ok(Self {
            api_base_url,
            api_token,
            request_timeout: Duration::from_secs(timeout_secs),
            state_path,
            app_host,
        })
    }

    /// Config pointing at `base_url` with defaults for everything else.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: normalize_base_url(base_url)?,
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            state_path: PathBuf::from("./data/avatar-studio.json"),
            app_host: "localhost:3000".to_string(),
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidValue {
            key: "AVATAR_API_BASE_URL".to_string(),
            message: format!("expected an http(s) URL, got {raw:?}"),
        });
    }
    Ok(trimmed.to_string())
}
