//! Player endpoints of the Spotify Web API.
//!
//! One function per endpoint, each a single transport call. Retrying and
//! deciding whether a write is needed happens in [`crate::commands`].

use serde_json::json;

use super::transport::{ApiError, ApiRequest, Method, Transport};
use crate::{
    state::RepeatState,
    types::{CurrentPlaybackResponse, DevicesResponse, StartPlaybackRequest, TransferPlaybackRequest},
};

const PLAYER: &str = "/v1/me/player";

/// `GET /v1/me/player`. `Ok(None)` when there is no active session (204).
pub async fn get_playback_state<T: Transport + ?Sized>(
    transport: &T,
    access_token: &str,
) -> Result<Option<CurrentPlaybackResponse>, ApiError> {
    let response = transport
        .send(ApiRequest::api(Method::Get, PLAYER, access_token))
        .await?;
    response.json()
}

/// `GET /v1/me/player/devices`.
pub async fn get_devices<T: Transport + ?Sized>(
    transport: &T,
    access_token: &str,
) -> Result<DevicesResponse, ApiError> {
    let response = transport
        .send(ApiRequest::api(
            Method::Get,
            "/v1/me/player/devices",
            access_token,
        ))
        .await?;
    Ok(response.json()?.unwrap_or_default())
}

/// `PUT /v1/me/player/play`. An empty request resumes the current context.
pub async fn play<T: Transport + ?Sized>(
    transport: &T,
    access_token: &str,
    device_id: Option<&str>,
    request: &StartPlaybackRequest,
) -> Result<(), ApiError> {
    let body = serde_json::to_value(request).map_err(|e| ApiError::new(400, e.to_string()))?;
    transport
        .send(
            ApiRequest::api(Method::Put, "/v1/me/player/play", access_token)
                .device(device_id)
                .json(body),
        )
        .await
        .map(drop)
}

/// `PUT /v1/me/player/pause`.
pub async fn pause<T: Transport + ?Sized>(
    transport: &T,
    access_token: &str,
    device_id: Option<&str>,
) -> Result<(), ApiError> {
    transport
        .send(ApiRequest::api(Method::Put, "/v1/me/player/pause", access_token).device(device_id))
        .await
        .map(drop)
}

/// `PUT /v1/me/player/volume?volume_percent=`.
pub async fn set_volume<T: Transport + ?Sized>(
    transport: &T,
    access_token: &str,
    device_id: Option<&str>,
    volume_percent: u8,
) -> Result<(), ApiError> {
    transport
        .send(
            ApiRequest::api(Method::Put, "/v1/me/player/volume", access_token)
                .query("volume_percent", volume_percent)
                .device(device_id),
        )
        .await
        .map(drop)
}

/// `PUT /v1/me/player/shuffle?state=`.
pub async fn set_shuffle<T: Transport + ?Sized>(
    transport: &T,
    access_token: &str,
    device_id: Option<&str>,
    state: bool,
) -> Result<(), ApiError> {
    transport
        .send(
            ApiRequest::api(Method::Put, "/v1/me/player/shuffle", access_token)
                .query("state", state)
                .device(device_id),
        )
        .await
        .map(drop)
}

/// `PUT /v1/me/player/repeat?state=`.
pub async fn set_repeat<T: Transport + ?Sized>(
    transport: &T,
    access_token: &str,
    device_id: Option<&str>,
    state: RepeatState,
) -> Result<(), ApiError> {
    transport
        .send(
            ApiRequest::api(Method::Put, "/v1/me/player/repeat", access_token)
                .query("state", state.as_str())
                .device(device_id),
        )
        .await
        .map(drop)
}

/// `PUT /v1/me/player/seek?position_ms=`.
pub async fn seek<T: Transport + ?Sized>(
    transport: &T,
    access_token: &str,
    device_id: Option<&str>,
    position_ms: u64,
) -> Result<(), ApiError> {
    transport
        .send(
            ApiRequest::api(Method::Put, "/v1/me/player/seek", access_token)
                .query("position_ms", position_ms)
                .device(device_id),
        )
        .await
        .map(drop)
}

/// `POST /v1/me/player/next`.
pub async fn skip_to_next<T: Transport + ?Sized>(
    transport: &T,
    access_token: &str,
    device_id: Option<&str>,
) -> Result<(), ApiError> {
    transport
        .send(ApiRequest::api(Method::Post, "/v1/me/player/next", access_token).device(device_id))
        .await
        .map(drop)
}

/// `POST /v1/me/player/previous`.
pub async fn skip_to_previous<T: Transport + ?Sized>(
    transport: &T,
    access_token: &str,
    device_id: Option<&str>,
) -> Result<(), ApiError> {
    transport
        .send(
            ApiRequest::api(Method::Post, "/v1/me/player/previous", access_token)
                .device(device_id),
        )
        .await
        .map(drop)
}

/// `PUT /v1/me/player`: moves playback to `device_id` and starts playing.
pub async fn transfer_playback<T: Transport + ?Sized>(
    transport: &T,
    access_token: &str,
    device_id: &str,
) -> Result<(), ApiError> {
    let request = TransferPlaybackRequest {
        device_ids: vec![device_id.to_string()],
        play: true,
    };
    transport
        .send(ApiRequest::api(Method::Put, PLAYER, access_token).json(json!(request)))
        .await
        .map(drop)
}
