//! Configuration for the Spotify remote.
//!
//! Two layers live here:
//!
//! 1. [`ModuleConfig`], the persisted configuration object the host hands to
//!    the instance on `init` / `config_updated` and receives back through
//!    `save_config`. Its JSON keys are the ones the host stores.
//! 2. Environment access for the console host: loading the `.env` file from
//!    the local data directory and resolving endpoint URLs, with defaults
//!    where the value is optional.
//!
//! Environment variables override the `.env` file, which overrides the
//! defaults below.

use std::{env, path::PathBuf};

use serde::{Deserialize, Serialize};

/// Poll interval applied when the configured one is missing or not positive.
pub const DEFAULT_POLL_INTERVAL: i64 = 3;

pub const DEFAULT_API_URL: &str = "https://api.spotify.com";
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";

const APP_DIR: &str = "spotify-remote";

/// Persisted configuration of one remote instance.
///
/// `code` is transient: it is consumed by the first authorization attempt
/// and removed from the config immediately. `auth_url` is generated by the
/// instance when neither a code nor a refresh token is available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(
        default,
        rename = "authURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub auth_url: Option<String>,
    #[serde(default = "default_poll_interval")]
    pub poll_interval: i64,
}

fn default_poll_interval() -> i64 {
    DEFAULT_POLL_INTERVAL
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            code: None,
            refresh_token: None,
            device_id: None,
            auth_url: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ModuleConfig {
    /// Repairs fields that must always hold a usable value.
    ///
    /// Returns `true` when something was changed, in which case the caller
    /// should save the config back to the host.
    pub fn ensure_required_config_is_defined(&mut self) -> bool {
        let mut changed = false;

        if self.poll_interval <= 0 {
            self.poll_interval = DEFAULT_POLL_INTERVAL;
            changed = true;
        }

        changed
    }

    /// Client id, secret and redirect URI are all present and non-empty.
    pub fn has_client_credentials(&self) -> bool {
        is_set(&self.client_id) && is_set(&self.client_secret) && is_set(&self.redirect_uri)
    }

    /// Configured playback device, ignoring blank values.
    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Overlays values from the process environment.
    ///
    /// Only variables that are set and non-empty replace the current value.
    pub fn apply_env(&mut self) {
        overlay(&mut self.client_id, "SPOTIFY_CLIENT_ID");
        overlay(&mut self.client_secret, "SPOTIFY_CLIENT_SECRET");
        overlay(&mut self.redirect_uri, "SPOTIFY_REDIRECT_URI");
        overlay(&mut self.device_id, "SPOTIFY_DEVICE_ID");

        if let Some(interval) = env_value("SPOTIFY_POLL_INTERVAL").and_then(|v| v.parse().ok()) {
            self.poll_interval = interval;
        }
    }
}

pub(crate) fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn overlay(field: &mut Option<String>, key: &str) {
    if let Some(value) = env_value(key) {
        *field = Some(value);
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Directory holding the `.env` file and the persisted config.
///
/// - Linux: `~/.local/share/spotify-remote`
/// - macOS: `~/Library/Application Support/spotify-remote`
/// - Windows: `%LOCALAPPDATA%/spotify-remote`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Loads environment variables from the `.env` file in the data directory.
///
/// Creates the data directory when it does not exist yet. A missing `.env`
/// file is not an error: every value it could provide can also come from
/// the process environment or the persisted config.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file exists
/// but cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir)
        .await
        .map_err(|e| e.to_string())?;

    let path = dir.join(".env");
    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| e.to_string())
}

/// Address the local OAuth callback server binds to.
pub fn server_addr() -> String {
    env_value("SERVER_ADDRESS").unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string())
}

/// Base URL of the Spotify Web API.
pub fn spotify_api_url() -> String {
    env_value("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Base URL of the Spotify accounts service (authorize + token endpoints).
pub fn spotify_accounts_url() -> String {
    env_value("SPOTIFY_ACCOUNTS_URL").unwrap_or_else(|| DEFAULT_ACCOUNTS_URL.to_string())
}
