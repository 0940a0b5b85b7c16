//! Boolean feedbacks evaluated against the live playback state.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::{
    host::OptionField,
    state::{PlaybackState, RepeatState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeedbackId {
    IsPlaying,
    IsShuffle,
    IsRepeat,
    ActiveDevice,
    CurrentContext,
}

impl FeedbackId {
    pub const ALL: [FeedbackId; 5] = [
        FeedbackId::IsPlaying,
        FeedbackId::IsShuffle,
        FeedbackId::IsRepeat,
        FeedbackId::ActiveDevice,
        FeedbackId::CurrentContext,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackId::IsPlaying => "is-playing",
            FeedbackId::IsShuffle => "is-shuffle",
            FeedbackId::IsRepeat => "is-repeat",
            FeedbackId::ActiveDevice => "active-device",
            FeedbackId::CurrentContext => "current-context",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FeedbackId::IsPlaying => "Change button style if music is playing",
            FeedbackId::IsShuffle => "Change button style if shuffle is turned on",
            FeedbackId::IsRepeat => "Change button style based on repeat state",
            FeedbackId::ActiveDevice => "Change button style if active device name matches value",
            FeedbackId::CurrentContext => {
                "Change button style if current album/artist/playlist/track id matches value"
            }
        }
    }

    pub fn options(&self) -> Vec<OptionField> {
        match self {
            FeedbackId::IsPlaying | FeedbackId::IsShuffle => Vec::new(),
            FeedbackId::IsRepeat => vec![OptionField::dropdown(
                "type",
                "Repeat state to match",
                RepeatState::Track.as_str(),
                &[("off", "off"), ("context", "context"), ("track", "track")],
            )],
            FeedbackId::ActiveDevice => {
                vec![OptionField::text("device", "Device Name (case insensitive)")]
            }
            FeedbackId::CurrentContext => vec![OptionField::text("id", "Item ID")],
        }
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A feedback instance with its options resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    IsPlaying,
    IsShuffle,
    IsRepeat { state: RepeatState },
    /// Matched case-insensitively against the device name.
    ActiveDevice { device: String },
    CurrentContext { id: String },
}

impl Feedback {
    /// Resolves a feedback from the host's id and option bag.
    ///
    /// Missing options fall back to the defaults the host shows: repeat
    /// state `track`, empty device name and context id.
    pub fn from_options(id: FeedbackId, options: &Value) -> Self {
        let text = |key: &str| options[key].as_str().unwrap_or_default().to_string();
        match id {
            FeedbackId::IsPlaying => Feedback::IsPlaying,
            FeedbackId::IsShuffle => Feedback::IsShuffle,
            FeedbackId::IsRepeat => Feedback::IsRepeat {
                state: options["type"]
                    .as_str()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(RepeatState::Track),
            },
            FeedbackId::ActiveDevice => Feedback::ActiveDevice {
                device: text("device"),
            },
            FeedbackId::CurrentContext => Feedback::CurrentContext { id: text("id") },
        }
    }

    /// Whether the feedback is active. An unknown state never matches.
    pub fn evaluate(&self, state: Option<&PlaybackState>) -> bool {
        let Some(state) = state else {
            return false;
        };

        match self {
            Feedback::IsPlaying => state.is_playing,
            Feedback::IsShuffle => state.is_shuffle,
            Feedback::IsRepeat { state: target } => state.repeat_state == *target,
            Feedback::ActiveDevice { device } => state
                .device_info
                .as_ref()
                .is_some_and(|info| info.name.to_lowercase() == device.to_lowercase()),
            Feedback::CurrentContext { id } => state.current_context.as_deref() == Some(id.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackDefinition {
    pub feedback_id: &'static str,
    pub name: &'static str,
    pub options: Vec<OptionField>,
}

pub fn feedback_definitions() -> Vec<FeedbackDefinition> {
    FeedbackId::ALL
        .iter()
        .map(|id| FeedbackDefinition {
            feedback_id: id.as_str(),
            name: id.name(),
            options: id.options(),
        })
        .collect()
}
