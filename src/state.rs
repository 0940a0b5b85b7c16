//! Normalized playback snapshot.
//!
//! The raw `GET /v1/me/player` payload is reduced to the handful of fields
//! the remote exposes. A new [`PlaybackState`] is built for every poll and
//! replaces the previous one wholesale.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{types::CurrentPlaybackResponse, utils};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatState {
    #[default]
    Off,
    Track,
    Context,
}

impl RepeatState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatState::Off => "off",
            RepeatState::Track => "track",
            RepeatState::Context => "context",
        }
    }
}

impl fmt::Display for RepeatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepeatState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(RepeatState::Off),
            "track" => Ok(RepeatState::Track),
            "context" => Ok(RepeatState::Context),
            other => Err(format!("invalid repeat state: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub duration_ms: u64,
    pub name: Option<String>,
    pub artist_name: Option<String>,
    pub album_name: Option<String>,
    pub album_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: Option<String>,
    pub name: String,
    pub volume_percent: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_shuffle: bool,
    pub repeat_state: RepeatState,
    /// Bare id of the playing album/artist/playlist, or of the track itself
    /// when a single track plays outside any context.
    pub current_context: Option<String>,
    /// Not clamped to the duration; upstream data may overshoot briefly.
    pub track_progress_ms: u64,
    pub track_info: Option<TrackInfo>,
    pub device_info: Option<DeviceInfo>,
}

impl PlaybackState {
    /// Reduces a raw playback payload to the tracked fields.
    pub fn from_response(body: &CurrentPlaybackResponse) -> Self {
        let mut current_context = body
            .context
            .as_ref()
            .and_then(|context| utils::id_from_uri(&context.uri));

        // A bare track has no context; use its own id so track-level
        // context feedbacks still match.
        if current_context.is_none() && body.currently_playing_type.as_deref() == Some("track") {
            current_context = body
                .item
                .as_ref()
                .and_then(|item| utils::id_from_uri(&item.uri));
        }

        let track_info = body.item.as_ref().map(|item| TrackInfo {
            duration_ms: item.duration_ms,
            name: item.name.clone(),
            artist_name: item.artists.as_ref().map(|artists| {
                artists
                    .iter()
                    .map(|a| a.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }),
            album_name: item.album.as_ref().map(|album| album.name.clone()),
            album_image_url: item
                .album
                .as_ref()
                .and_then(|album| album.images.first())
                .map(|image| image.url.clone()),
        });

        let device_info = body.device.as_ref().map(|device| DeviceInfo {
            id: device.id.clone(),
            name: device.name.clone(),
            volume_percent: device.volume_percent,
        });

        Self {
            is_playing: body.is_playing.unwrap_or(false),
            is_shuffle: body.shuffle_state.unwrap_or(false),
            repeat_state: body
                .repeat_state
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            current_context,
            track_progress_ms: body.progress_ms.unwrap_or(0),
            track_info,
            device_info,
        }
    }
}
