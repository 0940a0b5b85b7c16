//! Retry-wrapped playback commands.
//!
//! Every command has the same shape: optionally read the current player
//! state, decide whether a write is needed at all, issue the write. The
//! whole sequence runs inside [`with_retry`], so a 401 at any step refreshes
//! the token and restarts the sequence from the read.

use std::{future::Future, str::FromStr};

use tracing::{debug, info};

use crate::{
    host::Host,
    session::Session,
    spotify::{
        player,
        transport::{ApiError, Transport},
    },
    state::RepeatState,
    types::StartPlaybackRequest,
};

/// Upper bound on attempts per command, the first one included.
pub const MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("not authorized: no access token available")]
    NotAuthorized,
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayAction {
    Play,
    Pause,
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShuffleAction {
    On,
    Off,
    Toggle,
}

/// What `play_specific_list` does when the requested context is already
/// the current one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListBehavior {
    /// Do nothing.
    #[default]
    Return,
    /// Resume if paused.
    Resume,
    /// Restart the context from the beginning.
    Force,
}

impl FromStr for ListBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "return" => Ok(ListBehavior::Return),
            "resume" => Ok(ListBehavior::Resume),
            "force" => Ok(ListBehavior::Force),
            other => Err(format!("invalid list behavior: {other}")),
        }
    }
}

/// Runs `op` with the current access token, retrying while the session
/// reports that the failure was recoverable.
///
/// At most [`MAX_ATTEMPTS`] attempts are made. Each retry picks up the
/// token the session holds at that point, so a refresh triggered by the
/// failed attempt is used by the next one.
///
/// # Errors
///
/// - [`CommandError::NotAuthorized`] when there is no access token
/// - [`CommandError::Api`] with the last failure once retrying stops
pub async fn with_retry<H, T, R, F, Fut>(
    session: &Session<H, T>,
    label: &'static str,
    mut op: F,
) -> Result<R, CommandError>
where
    H: Host,
    T: Transport,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<R, ApiError>>,
{
    let mut attempt = 1;
    loop {
        let token = session
            .access_token()
            .await
            .ok_or(CommandError::NotAuthorized)?;

        match op(token).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt < MAX_ATTEMPTS && session.should_retry(&err).await {
                    debug!(command = label, attempt, "retrying after token refresh");
                    attempt += 1;
                    continue;
                }
                return Err(err.into());
            }
        }
    }
}

pub async fn change_play_state<H: Host, T: Transport>(
    session: &Session<H, T>,
    device_id: &str,
    action: PlayAction,
) -> Result<(), CommandError> {
    with_retry(session, "change play state", |token| async move {
        let transport = session.transport();
        let playing = player::get_playback_state(transport, &token)
            .await?
            .and_then(|state| state.is_playing)
            .unwrap_or(false);

        match action {
            PlayAction::Pause | PlayAction::Toggle if playing => {
                player::pause(transport, &token, Some(device_id)).await
            }
            PlayAction::Play | PlayAction::Toggle if !playing => {
                player::play(
                    transport,
                    &token,
                    Some(device_id),
                    &StartPlaybackRequest::default(),
                )
                .await
            }
            _ => Ok(()),
        }
    })
    .await
}

pub async fn change_shuffle_state<H: Host, T: Transport>(
    session: &Session<H, T>,
    device_id: &str,
    action: ShuffleAction,
) -> Result<(), CommandError> {
    with_retry(session, "change shuffle state", |token| async move {
        let transport = session.transport();
        let shuffle = player::get_playback_state(transport, &token)
            .await?
            .and_then(|state| state.shuffle_state)
            .unwrap_or(false);

        let target = match action {
            ShuffleAction::On => true,
            ShuffleAction::Off => false,
            ShuffleAction::Toggle => !shuffle,
        };
        if target == shuffle {
            return Ok(());
        }

        player::set_shuffle(transport, &token, Some(device_id), target).await
    })
    .await
}

pub async fn change_repeat_state<H: Host, T: Transport>(
    session: &Session<H, T>,
    device_id: &str,
    target: RepeatState,
) -> Result<(), CommandError> {
    with_retry(session, "change repeat state", |token| async move {
        let transport = session.transport();
        let current = player::get_playback_state(transport, &token)
            .await?
            .and_then(|state| state.repeat_state)
            .and_then(|state| state.parse::<RepeatState>().ok())
            .unwrap_or_default();
        if current == target {
            return Ok(());
        }

        player::set_repeat(transport, &token, Some(device_id), target).await
    })
    .await
}

/// Sets the device volume to `value` (absolute) or shifts it by `value`.
///
/// The result is rounded and clamped to `0..=100`. A `NaN` input is ignored
/// without touching the network, as is a device that is unknown or does not
/// report a volume.
pub async fn change_volume<H: Host, T: Transport>(
    session: &Session<H, T>,
    device_id: &str,
    absolute: bool,
    value: f64,
) -> Result<(), CommandError> {
    if value.is_nan() {
        debug!(value, absolute, "invalid volume change");
        return Ok(());
    }

    with_retry(session, "change volume", |token| async move {
        let transport = session.transport();
        let devices = player::get_devices(transport, &token).await?;
        let Some(current) = devices
            .devices
            .iter()
            .find(|device| device.id.as_deref() == Some(device_id))
            .and_then(|device| device.volume_percent)
        else {
            debug!(device_id, "device not found or without volume control");
            return Ok(());
        };

        let target = if absolute {
            value
        } else {
            f64::from(current) + value
        };
        let volume = target.round().clamp(0.0, 100.0) as u8;

        player::set_volume(transport, &token, Some(device_id), volume).await
    })
    .await
}

/// Seeks within the current track. Spotify offers no way to validate the
/// position beforehand, so it is sent as is.
pub async fn seek_position<H: Host, T: Transport>(
    session: &Session<H, T>,
    device_id: &str,
    position_ms: u64,
) -> Result<(), CommandError> {
    with_retry(session, "seek position", |token| async move {
        player::seek(session.transport(), &token, Some(device_id), position_ms).await
    })
    .await
}

pub async fn skip_song<H: Host, T: Transport>(
    session: &Session<H, T>,
    device_id: &str,
) -> Result<(), CommandError> {
    with_retry(session, "skip song", |token| async move {
        player::skip_to_next(session.transport(), &token, Some(device_id)).await
    })
    .await
}

pub async fn previous_song<H: Host, T: Transport>(
    session: &Session<H, T>,
    device_id: &str,
) -> Result<(), CommandError> {
    with_retry(session, "previous song", |token| async move {
        player::skip_to_previous(session.transport(), &token, Some(device_id)).await
    })
    .await
}

pub async fn transfer_playback<H: Host, T: Transport>(
    session: &Session<H, T>,
    device_id: &str,
) -> Result<(), CommandError> {
    with_retry(session, "transfer playback", |token| async move {
        player::transfer_playback(session.transport(), &token, device_id).await
    })
    .await
}

/// Starts an album, artist or playlist by URI.
///
/// A different context is always started. When `context_uri` is already
/// playing, `behavior` decides: see [`ListBehavior`].
pub async fn play_specific_list<H: Host, T: Transport>(
    session: &Session<H, T>,
    device_id: &str,
    context_uri: &str,
    behavior: ListBehavior,
) -> Result<(), CommandError> {
    with_retry(session, "play specific list", |token| async move {
        let transport = session.transport();
        let state = player::get_playback_state(transport, &token)
            .await?
            .unwrap_or_default();

        let current = state.context.as_ref().map(|context| context.uri.as_str());
        if current == Some(context_uri) {
            let playing = state.is_playing.unwrap_or(false);
            match behavior {
                ListBehavior::Return => {
                    info!(context_uri, "already playing requested context");
                    return Ok(());
                }
                ListBehavior::Resume if playing => {
                    info!(context_uri, "already playing requested context");
                    return Ok(());
                }
                ListBehavior::Resume => {
                    return player::play(
                        transport,
                        &token,
                        Some(device_id),
                        &StartPlaybackRequest::default(),
                    )
                    .await;
                }
                ListBehavior::Force => {}
            }
        }

        let request = StartPlaybackRequest {
            context_uri: Some(context_uri.to_string()),
            ..Default::default()
        };
        player::play(transport, &token, Some(device_id), &request).await
    })
    .await
}

pub async fn play_specific_tracks<H: Host, T: Transport>(
    session: &Session<H, T>,
    device_id: &str,
    uris: &[String],
    position_ms: u64,
) -> Result<(), CommandError> {
    let request = StartPlaybackRequest {
        uris: Some(uris.to_vec()),
        position_ms: Some(position_ms),
        ..Default::default()
    };

    with_retry(session, "play specific tracks", |token| {
        let request = &request;
        async move { player::play(session.transport(), &token, Some(device_id), request).await }
    })
    .await
}

/// Id of the device Spotify currently reports as active.
pub async fn active_device_id<H: Host, T: Transport>(
    session: &Session<H, T>,
) -> Result<Option<String>, CommandError> {
    with_retry(session, "active device", |token| async move {
        let devices = player::get_devices(session.transport(), &token).await?;
        Ok(devices
            .devices
            .into_iter()
            .find(|device| device.is_active)
            .and_then(|device| device.id))
    })
    .await
}
