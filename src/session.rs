//! Per-instance state shared by commands, the poller and the lifecycle
//! hooks: config, tokens, the playback slot and the host handle.

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::{
    config::{self, ModuleConfig, is_set},
    host::{Host, InstanceStatus},
    management::{AuthError, TokenManager},
    spotify::{
        auth::{AUTH_SCOPES, authorize_url},
        transport::{ApiError, Transport},
    },
    state::PlaybackState,
};

pub struct Session<H, T> {
    host: H,
    transport: T,
    accounts_url: String,
    config: RwLock<ModuleConfig>,
    tokens: Mutex<TokenManager>,
    playback: RwLock<Option<PlaybackState>>,
}

impl<H: Host, T: Transport> Session<H, T> {
    pub fn new(host: H, transport: T, config: ModuleConfig) -> Self {
        Self {
            host,
            transport,
            accounts_url: config::spotify_accounts_url(),
            config: RwLock::new(config),
            tokens: Mutex::new(TokenManager::new()),
            playback: RwLock::new(None),
        }
    }

    /// Overrides the accounts service used for the authorize URL.
    pub fn with_accounts_url(mut self, accounts_url: impl Into<String>) -> Self {
        self.accounts_url = accounts_url.into();
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn config(&self) -> ModuleConfig {
        self.config.read().await.clone()
    }

    /// Replaces the config without saving it, as handed over by the host.
    pub async fn set_config(&self, config: ModuleConfig) {
        *self.config.write().await = config;
    }

    /// Applies `change` to the config and saves the result to the host.
    pub async fn update_config<F>(&self, change: F) -> ModuleConfig
    where
        F: FnOnce(&mut ModuleConfig),
    {
        let updated = {
            let mut config = self.config.write().await;
            change(&mut config);
            config.clone()
        };
        self.host.save_config(updated.clone()).await;
        updated
    }

    pub async fn access_token(&self) -> Option<String> {
        self.tokens.lock().await.access_token().map(str::to_string)
    }

    pub async fn token_expires_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.tokens.lock().await.expires_at()
    }

    /// Actions and polls need an access token.
    pub async fn can_poll_or_post(&self) -> bool {
        self.tokens.lock().await.access_token().is_some()
    }

    pub async fn playback_state(&self) -> Option<PlaybackState> {
        self.playback.read().await.clone()
    }

    /// Swaps in a new snapshot and returns the previous one.
    pub async fn replace_playback_state(
        &self,
        state: Option<PlaybackState>,
    ) -> Option<PlaybackState> {
        std::mem::replace(&mut *self.playback.write().await, state)
    }

    /// Reports a status to the host. `Ok` without a selected device is
    /// reported as a config problem instead.
    pub async fn update_status(&self, status: InstanceStatus, message: Option<String>) {
        let has_device = self.config.read().await.device_id().is_some();
        if status == InstanceStatus::Ok && !has_device {
            self.host
                .update_status(
                    InstanceStatus::BadConfig,
                    Some("No playout device selected".to_string()),
                )
                .await;
        } else {
            self.host.update_status(status, message).await;
        }
    }

    /// Decides whether a failed call is worth repeating.
    ///
    /// Only a 401 is: the token is refreshed once and `true` returned when a
    /// new access token was obtained. A failed refresh drops the token and
    /// moves the status back to connecting.
    pub async fn should_retry(&self, err: &ApiError) -> bool {
        if !err.is_unauthorized() {
            debug!(status = err.status_code, error = %err.message, "api call failed");
            return false;
        }

        let config = self.config().await;
        let result = self
            .tokens
            .lock()
            .await
            .refresh(&self.transport, &config)
            .await;

        match result {
            Ok(rotated) => {
                if let Some(refresh_token) = rotated {
                    self.update_config(|config| config.refresh_token = Some(refresh_token))
                        .await;
                }
                self.update_status(InstanceStatus::Ok, None).await;
                true
            }
            Err(AuthError::MissingCredentials) => {
                debug!("missing properties required to refresh access token");
                false
            }
            Err(e) => {
                debug!(error = %e, "failed to refresh access token");
                self.update_status(InstanceStatus::Connecting, None).await;
                false
            }
        }
    }

    /// Brings the session towards an access token with whatever the config
    /// offers: a one-time code, a refresh token, or neither, in which case an
    /// authorize URL is generated for the operator.
    pub async fn setup_or_refresh_authentication(&self, clear_token: bool) {
        if clear_token {
            self.tokens.lock().await.clear();
        }

        let config = self.config().await;

        if !config.has_client_credentials() {
            self.update_status(InstanceStatus::BadConfig, None).await;
        } else if self.can_poll_or_post().await {
            self.update_status(InstanceStatus::Ok, None).await;
        } else if is_set(&config.code) {
            self.update_status(InstanceStatus::Connecting, None).await;

            let code = config.code.as_deref().unwrap_or_default().trim().to_string();
            let config = self.update_config(|config| config.code = None).await;

            let result = self
                .tokens
                .lock()
                .await
                .exchange_code(&self.transport, &config, &code)
                .await;

            match result {
                Ok(refresh_token) => {
                    self.update_config(|config| config.refresh_token = refresh_token)
                        .await;
                    self.update_status(InstanceStatus::Ok, None).await;
                }
                Err(e) => debug!(error = %e, "failed to get access token"),
            }
        } else if is_set(&config.refresh_token) {
            self.update_status(InstanceStatus::Connecting, None).await;

            let result = self
                .tokens
                .lock()
                .await
                .refresh(&self.transport, &config)
                .await;

            match result {
                Ok(rotated) => {
                    if let Some(refresh_token) = rotated {
                        self.update_config(|config| config.refresh_token = Some(refresh_token))
                            .await;
                    }
                    self.update_status(InstanceStatus::Ok, None).await;
                }
                Err(AuthError::NoAccessToken) => {
                    self.update_status(InstanceStatus::Connecting, None).await;
                }
                Err(e) => warn!(error = %e, "failed to refresh access token"),
            }
        } else {
            self.update_status(InstanceStatus::BadConfig, None).await;

            let url = authorize_url(
                &self.accounts_url,
                config.client_id.as_deref().unwrap_or_default(),
                config.redirect_uri.as_deref().unwrap_or_default(),
                &AUTH_SCOPES,
                None,
            );
            match url {
                Ok(url) => {
                    self.update_config(|config| config.auth_url = Some(url.clone()))
                        .await;
                    info!(url = %url, "please visit the following URL to authorize the module");
                }
                Err(e) => warn!(error = %e, "failed to build authorize url"),
            }
        }
    }
}
