use reqwest::Url;

use super::transport::{ApiError, ApiRequest, Transport};
use crate::types::TokenResponse;

/// Scopes requested when the user authorizes the remote.
pub const AUTH_SCOPES: [&str; 10] = [
    "user-read-playback-state",
    "user-modify-playback-state",
    "user-read-currently-playing",
    "streaming",
    "app-remote-control",
    "playlist-read-collaborative",
    "playlist-read-private",
    "user-library-read",
    "user-top-read",
    "user-read-playback-position",
];

const TOKEN_PATH: &str = "/api/token";

/// Builds the URL the user has to visit to grant the remote access.
///
/// The user is redirected to `redirect_uri` with a one-time `code` query
/// parameter afterwards. That code goes into the config (or is captured by
/// the local callback server) and is exchanged by
/// [`authorization_code_grant`].
///
/// # Arguments
///
/// * `accounts_url` - Base URL of the accounts service
/// * `client_id` - Client id of the registered Spotify app
/// * `redirect_uri` - Must match one registered for the app
/// * `scopes` - Permissions to request, joined with spaces
/// * `state` - Optional opaque value echoed back to the redirect
///
/// # Errors
///
/// Fails only when `accounts_url` is not a valid base URL.
pub fn authorize_url(
    accounts_url: &str,
    client_id: &str,
    redirect_uri: &str,
    scopes: &[&str],
    state: Option<&str>,
) -> Result<String, String> {
    let scope = scopes.join(" ");
    let mut params = vec![
        ("client_id", client_id),
        ("response_type", "code"),
        ("redirect_uri", redirect_uri),
        ("scope", scope.as_str()),
    ];
    if let Some(state) = state.filter(|s| !s.is_empty()) {
        params.push(("state", state));
    }

    let base = format!("{}/authorize", accounts_url.trim_end_matches('/'));
    Url::parse_with_params(&base, &params)
        .map(String::from)
        .map_err(|e| e.to_string())
}

/// Exchanges a refresh token for a fresh access token.
///
/// Uses the `refresh_token` grant with the client credentials as Basic
/// authorization. Spotify may answer with a rotated refresh token, which
/// then replaces the stored one.
///
/// # Errors
///
/// Any transport failure, including `400 invalid_grant` for a revoked or
/// unknown refresh token.
pub async fn refresh_access_token<T: Transport + ?Sized>(
    transport: &T,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenResponse, ApiError> {
    let request = ApiRequest::accounts_form(
        TOKEN_PATH,
        client_id,
        client_secret,
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ],
    );

    token_response(transport, request).await
}

/// Exchanges a one-time authorization code for an access and refresh token.
///
/// The code is single use: a second exchange of the same code fails with
/// `400 invalid_grant`, so callers discard it before calling this.
pub async fn authorization_code_grant<T: Transport + ?Sized>(
    transport: &T,
    client_id: &str,
    client_secret: &str,
    redirect_uri: &str,
    code: &str,
) -> Result<TokenResponse, ApiError> {
    let request = ApiRequest::accounts_form(
        TOKEN_PATH,
        client_id,
        client_secret,
        &[
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ],
    );

    token_response(transport, request).await
}

async fn token_response<T: Transport + ?Sized>(
    transport: &T,
    request: ApiRequest,
) -> Result<TokenResponse, ApiError> {
    let response = transport.send(request).await?;
    response
        .json::<TokenResponse>()?
        .ok_or_else(|| ApiError::new(response.status_code, "empty token response"))
}
