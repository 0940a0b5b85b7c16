use chrono::{DateTime, Duration, Utc};

use crate::{
    config::{ModuleConfig, is_set},
    spotify::{auth, transport::ApiError, transport::Transport},
    types::TokenResponse,
};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("client id, client secret or refresh token missing")]
    MissingCredentials,
    #[error("token response did not contain an access token")]
    NoAccessToken,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Holds the in-memory access token.
///
/// The refresh token is not kept here: it belongs to the persisted config,
/// so every successful exchange hands it back to the caller to store.
#[derive(Debug, Default)]
pub struct TokenManager {
    access_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl TokenManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn clear(&mut self) {
        self.access_token = None;
        self.expires_at = None;
    }

    /// Exchanges the stored refresh token for a new access token.
    ///
    /// Returns the rotated refresh token when Spotify issued one. On any
    /// failure the current access token is dropped.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingCredentials`] without contacting Spotify when
    ///   client id, secret or refresh token are absent
    /// - [`AuthError::NoAccessToken`] when the response carries no token
    /// - [`AuthError::Api`] for transport failures
    pub async fn refresh<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        config: &ModuleConfig,
    ) -> Result<Option<String>, AuthError> {
        let (Some(client_id), Some(client_secret), Some(refresh_token)) = (
            config.client_id.as_deref().filter(|_| is_set(&config.client_id)),
            config
                .client_secret
                .as_deref()
                .filter(|_| is_set(&config.client_secret)),
            config
                .refresh_token
                .as_deref()
                .filter(|_| is_set(&config.refresh_token)),
        ) else {
            return Err(AuthError::MissingCredentials);
        };

        let result =
            auth::refresh_access_token(transport, client_id, client_secret, refresh_token).await;
        let response = self.accept(result)?;

        Ok(response
            .refresh_token
            .filter(|rotated| !rotated.is_empty() && rotated != refresh_token))
    }

    /// Exchanges a one-time authorization code.
    ///
    /// Returns the refresh token from the response, `None` when Spotify did
    /// not issue one.
    pub async fn exchange_code<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        config: &ModuleConfig,
        code: &str,
    ) -> Result<Option<String>, AuthError> {
        if !config.has_client_credentials() {
            return Err(AuthError::MissingCredentials);
        }
        let client_id = config.client_id.as_deref().unwrap_or_default();
        let client_secret = config.client_secret.as_deref().unwrap_or_default();
        let redirect_uri = config.redirect_uri.as_deref().unwrap_or_default();

        let result =
            auth::authorization_code_grant(transport, client_id, client_secret, redirect_uri, code)
                .await;
        let response = self.accept(result)?;

        Ok(response.refresh_token.filter(|token| !token.is_empty()))
    }

    fn accept(
        &mut self,
        result: Result<TokenResponse, ApiError>,
    ) -> Result<TokenResponse, AuthError> {
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.clear();
                return Err(e.into());
            }
        };

        match response.access_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => {
                self.access_token = Some(token.to_string());
                self.expires_at = response
                    .expires_in
                    .map(|secs| Utc::now() + Duration::seconds(secs as i64));
                Ok(response)
            }
            None => {
                self.clear();
                Err(AuthError::NoAccessToken)
            }
        }
    }

    #[cfg(test)]
    fn with_token(token: &str, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            access_token: Some(token.to_string()),
            expires_at,
        }
    }
}
