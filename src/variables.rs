//! Variables the remote publishes to the host.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VariableId {
    SongName,
    AlbumName,
    ArtistName,
    IsPlaying,
    IsPlayingIcon,
    IsShuffle,
    Repeat,
    CurrentContext,
    SongPercentage,
    SongProgressSeconds,
    SongDurationSeconds,
    SongTimeRemaining,
    SongTimeRemainingHours,
    SongTimeRemainingMinutes,
    SongTimeRemainingSeconds,
    Volume,
    CurrentAlbumArt,
    DeviceName,
    DeviceId,
}

impl VariableId {
    pub const ALL: [VariableId; 19] = [
        VariableId::SongName,
        VariableId::AlbumName,
        VariableId::ArtistName,
        VariableId::IsPlaying,
        VariableId::IsPlayingIcon,
        VariableId::IsShuffle,
        VariableId::Repeat,
        VariableId::CurrentContext,
        VariableId::SongPercentage,
        VariableId::SongProgressSeconds,
        VariableId::SongDurationSeconds,
        VariableId::SongTimeRemaining,
        VariableId::SongTimeRemainingHours,
        VariableId::SongTimeRemainingMinutes,
        VariableId::SongTimeRemainingSeconds,
        VariableId::Volume,
        VariableId::CurrentAlbumArt,
        VariableId::DeviceName,
        VariableId::DeviceId,
    ];

    /// Id the host knows the variable by.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableId::SongName => "songName",
            VariableId::AlbumName => "albumName",
            VariableId::ArtistName => "artistName",
            VariableId::IsPlaying => "isPlaying",
            VariableId::IsPlayingIcon => "isPlayingIcon",
            VariableId::IsShuffle => "isShuffle",
            VariableId::Repeat => "repeat",
            VariableId::CurrentContext => "currentContext",
            VariableId::SongPercentage => "songPercentage",
            VariableId::SongProgressSeconds => "songProgressSeconds",
            VariableId::SongDurationSeconds => "songDurationSeconds",
            VariableId::SongTimeRemaining => "songTimeRemaining",
            VariableId::SongTimeRemainingHours => "songTimeRemainingHours",
            VariableId::SongTimeRemainingMinutes => "songTimeRemainingMinutes",
            VariableId::SongTimeRemainingSeconds => "songTimeRemainingSeconds",
            VariableId::Volume => "volume",
            VariableId::CurrentAlbumArt => "currentAlbumArt",
            VariableId::DeviceName => "deviceName",
            VariableId::DeviceId => "deviceId",
        }
    }

    /// Label shown next to the variable in the host.
    pub fn label(&self) -> &'static str {
        match self {
            VariableId::SongName => "Current Song Name",
            VariableId::AlbumName => "Current Album Name",
            VariableId::ArtistName => "Current Artist Name",
            VariableId::IsPlaying => "Is Playback Active",
            VariableId::IsPlayingIcon => "Playback Icon",
            VariableId::IsShuffle => "Is Shuffle Enabled",
            VariableId::Repeat => "Is Repeat Enabled",
            VariableId::CurrentContext => "Current Context ID",
            VariableId::SongPercentage => "Percentage of the current song completed",
            VariableId::SongProgressSeconds => "Progress of the current song in seconds",
            VariableId::SongDurationSeconds => "Duration of the current song in seconds",
            VariableId::SongTimeRemaining => "Time remaining in song (pretty formatted HH:MM:SS)",
            VariableId::SongTimeRemainingHours => "Hours remaining in song (zero padded)",
            VariableId::SongTimeRemainingMinutes => "Minutes remaining in song (zero padded)",
            VariableId::SongTimeRemainingSeconds => "Seconds remaining in song (zero padded)",
            VariableId::Volume => "Current Volume",
            VariableId::CurrentAlbumArt => {
                "Currently playing album artwork. Use the generic http module to display this on a button"
            }
            VariableId::DeviceName => "Current device name",
            VariableId::DeviceId => "Current device id",
        }
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VariableValue {
    Text(String),
    Number(i64),
    Bool(bool),
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Text(text) => f.write_str(text),
            VariableValue::Number(n) => write!(f, "{n}"),
            VariableValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::Text(value.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        VariableValue::Text(value)
    }
}

impl From<bool> for VariableValue {
    fn from(value: bool) -> Self {
        VariableValue::Bool(value)
    }
}

impl From<i64> for VariableValue {
    fn from(value: i64) -> Self {
        VariableValue::Number(value)
    }
}

/// One batch of variable updates, ordered by id.
pub type VariableValues = BTreeMap<VariableId, VariableValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableDefinition {
    pub variable_id: &'static str,
    pub name: &'static str,
}

pub fn variable_definitions() -> Vec<VariableDefinition> {
    VariableId::ALL
        .iter()
        .map(|id| VariableDefinition {
            variable_id: id.as_str(),
            name: id.label(),
        })
        .collect()
}
