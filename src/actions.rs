//! Host-invocable actions.
//!
//! The host calls an action by id with a JSON bag of options. [`Action::parse`]
//! turns that pair into a typed descriptor once, and [`Action::run`]
//! dispatches it to the matching command in [`crate::commands`].

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    commands::{self, CommandError, ListBehavior, PlayAction, ShuffleAction},
    feedbacks::FeedbackId,
    host::{Host, OptionField},
    session::Session,
    spotify::transport::Transport,
    state::RepeatState,
    utils,
};

const DEFAULT_VOLUME_STEP: f64 = 5.0;
const DEFAULT_VOLUME: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionId {
    PlayPause,
    Play,
    Pause,
    PlaySpecificList,
    PlaySpecificTracks,
    VolumeUp,
    VolumeDown,
    VolumeSpecific,
    SeekPosition,
    Skip,
    Previous,
    ShuffleToggle,
    ShuffleOn,
    ShuffleOff,
    RepeatState,
    ActiveDeviceToConfig,
    SwitchActiveDevice,
}

impl ActionId {
    pub const ALL: [ActionId; 17] = [
        ActionId::PlayPause,
        ActionId::Play,
        ActionId::Pause,
        ActionId::PlaySpecificList,
        ActionId::PlaySpecificTracks,
        ActionId::VolumeUp,
        ActionId::VolumeDown,
        ActionId::VolumeSpecific,
        ActionId::SeekPosition,
        ActionId::Skip,
        ActionId::Previous,
        ActionId::ShuffleToggle,
        ActionId::ShuffleOn,
        ActionId::ShuffleOff,
        ActionId::RepeatState,
        ActionId::ActiveDeviceToConfig,
        ActionId::SwitchActiveDevice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionId::PlayPause => "play/pause",
            ActionId::Play => "play",
            ActionId::Pause => "pause",
            ActionId::PlaySpecificList => "playSpecificList",
            ActionId::PlaySpecificTracks => "playSpecificTracks",
            ActionId::VolumeUp => "volumeUp",
            ActionId::VolumeDown => "volumeDown",
            ActionId::VolumeSpecific => "volumeSpecific",
            ActionId::SeekPosition => "seekPosition",
            ActionId::Skip => "skip",
            ActionId::Previous => "previous",
            ActionId::ShuffleToggle => "shuffleToggle",
            ActionId::ShuffleOn => "shuffleOn",
            ActionId::ShuffleOff => "shuffleOff",
            ActionId::RepeatState => "repeatState",
            ActionId::ActiveDeviceToConfig => "activeDeviceToConfig",
            ActionId::SwitchActiveDevice => "switchActiveDevice",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActionId::PlayPause => "Toggle Play/Pause",
            ActionId::Play => "Play",
            ActionId::Pause => "Pause Playback",
            ActionId::PlaySpecificList => "Start Specific Album / Artist / Playlist",
            ActionId::PlaySpecificTracks => "Start Specific Track(s)",
            ActionId::VolumeUp => "Volume Up",
            ActionId::VolumeDown => "Volume Down",
            ActionId::VolumeSpecific => "Set Volume to Specific Value",
            ActionId::SeekPosition => "Seek To Position In Currently Playing Track",
            ActionId::Skip => "Skip Track",
            ActionId::Previous => "Previous Track",
            ActionId::ShuffleToggle => "Toggle Shuffle",
            ActionId::ShuffleOn => "Turn Shuffle On",
            ActionId::ShuffleOff => "Turn Shuffle Off",
            ActionId::RepeatState => "Set Repeat State",
            ActionId::ActiveDeviceToConfig => "Write the ID of the current Active Device to config",
            ActionId::SwitchActiveDevice => "Change Active Device",
        }
    }

    /// Inputs the host shows for this action. Defaults match what
    /// [`Action::parse`] falls back on.
    pub fn options(&self) -> Vec<OptionField> {
        match self {
            ActionId::PlaySpecificList => vec![
                OptionField::dropdown(
                    "type",
                    "Type",
                    ContextKind::Album.as_str(),
                    &[("album", "Album"), ("artist", "Artist"), ("playlist", "Playlist")],
                ),
                OptionField::text("context_uri", "Item ID")
                    .with_tooltip("Provide the ID for the item"),
                OptionField::dropdown(
                    "behavior",
                    "Action Behavior if Provided Item is Currently Playing",
                    "return",
                    &[
                        ("return", "Do Nothing"),
                        ("resume", "Play (if paused)"),
                        ("force", "Force Play (from start)"),
                    ],
                ),
            ],
            ActionId::PlaySpecificTracks => vec![
                OptionField::text("tracks", "Input Specific Track IDs").with_tooltip(
                    "IDs should be comma separated (ie. 4ByEFOBuLXpCqvO1kw8Wdm,7BaEFOBuLXpDqvO1kw8Wem)",
                ),
                OptionField::number(
                    "positionMs",
                    "Start Position of First Track in Milliseconds",
                    0.0,
                    0.0,
                    1_000_000.0,
                ),
            ],
            ActionId::VolumeUp => vec![OptionField::number(
                "volumeUpAmount",
                "Volume",
                DEFAULT_VOLUME_STEP,
                0.0,
                100.0,
            )],
            ActionId::VolumeDown => vec![OptionField::number(
                "volumeDownAmount",
                "Volume",
                DEFAULT_VOLUME_STEP,
                0.0,
                100.0,
            )],
            ActionId::VolumeSpecific => vec![OptionField::number(
                "value",
                "Volume",
                DEFAULT_VOLUME,
                0.0,
                100.0,
            )],
            ActionId::SeekPosition => vec![OptionField::text("position", "Position (milliseconds)")],
            ActionId::RepeatState => vec![OptionField::dropdown(
                "state",
                "State",
                RepeatState::Off.as_str(),
                &[("off", "off"), ("context", "context"), ("track", "track")],
            )],
            ActionId::SwitchActiveDevice => vec![OptionField::text("deviceId", "Device ID")],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDefinition {
    pub action_id: &'static str,
    pub name: &'static str,
    pub options: Vec<OptionField>,
}

pub fn action_definitions() -> Vec<ActionDefinition> {
    ActionId::ALL
        .iter()
        .map(|id| ActionDefinition {
            action_id: id.as_str(),
            name: id.name(),
            options: id.options(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionParseError {
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("action {action} requires option `{option}`")]
    MissingOption {
        action: ActionId,
        option: &'static str,
    },
    #[error("invalid value {value} for option `{option}` of action {action}")]
    InvalidOption {
        action: ActionId,
        option: &'static str,
        value: String,
    },
}

/// Kind of context a `playSpecificList` action starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Album,
    Artist,
    Playlist,
}

impl ContextKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKind::Album => "album",
            ContextKind::Artist => "artist",
            ContextKind::Playlist => "playlist",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "album" => Some(ContextKind::Album),
            "artist" => Some(ContextKind::Artist),
            "playlist" => Some(ContextKind::Playlist),
            _ => None,
        }
    }
}

/// One action invocation with its options resolved.
///
/// Volume amounts stay `f64` so an unparsable value can travel to the
/// command as `NaN`, where it is logged and ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    PlayPause,
    Play,
    Pause,
    PlaySpecificList {
        kind: ContextKind,
        id: String,
        behavior: ListBehavior,
    },
    PlaySpecificTracks {
        uris: Vec<String>,
        position_ms: u64,
    },
    VolumeUp {
        amount: f64,
    },
    VolumeDown {
        amount: f64,
    },
    VolumeSpecific {
        value: f64,
    },
    SeekPosition {
        position_ms: u64,
    },
    Skip,
    Previous,
    ShuffleToggle,
    ShuffleOn,
    ShuffleOff,
    RepeatState {
        state: RepeatState,
    },
    ActiveDeviceToConfig,
    SwitchActiveDevice {
        device_id: String,
    },
}

impl Action {
    /// Resolves an action from the host's id and option bag.
    ///
    /// Numeric options accept both JSON numbers and numeric strings, since
    /// text inputs in the host deliver strings.
    pub fn parse(action_id: &str, options: &Value) -> Result<Self, ActionParseError> {
        let id = ActionId::from_id(action_id)
            .ok_or_else(|| ActionParseError::UnknownAction(action_id.to_string()))?;

        let action = match id {
            ActionId::PlayPause => Action::PlayPause,
            ActionId::Play => Action::Play,
            ActionId::Pause => Action::Pause,
            ActionId::PlaySpecificList => {
                let kind = match options["type"].as_str() {
                    None => ContextKind::Album,
                    Some(value) => ContextKind::parse(value).ok_or(ActionParseError::InvalidOption {
                        action: id,
                        option: "type",
                        value: value.to_string(),
                    })?,
                };
                let behavior = match options["behavior"].as_str() {
                    None => ListBehavior::default(),
                    Some(value) => value.parse().map_err(|_| ActionParseError::InvalidOption {
                        action: id,
                        option: "behavior",
                        value: value.to_string(),
                    })?,
                };

                Action::PlaySpecificList {
                    kind,
                    id: required_text(id, options, "context_uri")?,
                    behavior,
                }
            }
            ActionId::PlaySpecificTracks => {
                let tracks = required_text(id, options, "tracks")?;
                let position_ms = number(&options["positionMs"])
                    .filter(|n| n.is_finite() && *n >= 0.0)
                    .map_or(0, |n| n as u64);

                Action::PlaySpecificTracks {
                    uris: utils::track_uris(&tracks),
                    position_ms,
                }
            }
            ActionId::VolumeUp => Action::VolumeUp {
                amount: number_or(&options["volumeUpAmount"], DEFAULT_VOLUME_STEP),
            },
            ActionId::VolumeDown => Action::VolumeDown {
                amount: number_or(&options["volumeDownAmount"], DEFAULT_VOLUME_STEP),
            },
            ActionId::VolumeSpecific => Action::VolumeSpecific {
                value: number_or(&options["value"], DEFAULT_VOLUME),
            },
            ActionId::SeekPosition => {
                let raw = &options["position"];
                let position = number(raw).filter(|n| n.is_finite() && *n >= 0.0);
                match position {
                    Some(position) => Action::SeekPosition {
                        position_ms: position as u64,
                    },
                    None if raw.is_null() => {
                        return Err(ActionParseError::MissingOption {
                            action: id,
                            option: "position",
                        });
                    }
                    None => {
                        return Err(ActionParseError::InvalidOption {
                            action: id,
                            option: "position",
                            value: raw.to_string(),
                        });
                    }
                }
            }
            ActionId::Skip => Action::Skip,
            ActionId::Previous => Action::Previous,
            ActionId::ShuffleToggle => Action::ShuffleToggle,
            ActionId::ShuffleOn => Action::ShuffleOn,
            ActionId::ShuffleOff => Action::ShuffleOff,
            ActionId::RepeatState => {
                let state = match options["state"].as_str() {
                    None => RepeatState::Off,
                    Some(value) => value.parse().map_err(|_| ActionParseError::InvalidOption {
                        action: id,
                        option: "state",
                        value: value.to_string(),
                    })?,
                };
                Action::RepeatState { state }
            }
            ActionId::ActiveDeviceToConfig => Action::ActiveDeviceToConfig,
            ActionId::SwitchActiveDevice => Action::SwitchActiveDevice {
                device_id: required_text(id, options, "deviceId")?,
            },
        };

        Ok(action)
    }

    pub fn id(&self) -> ActionId {
        match self {
            Action::PlayPause => ActionId::PlayPause,
            Action::Play => ActionId::Play,
            Action::Pause => ActionId::Pause,
            Action::PlaySpecificList { .. } => ActionId::PlaySpecificList,
            Action::PlaySpecificTracks { .. } => ActionId::PlaySpecificTracks,
            Action::VolumeUp { .. } => ActionId::VolumeUp,
            Action::VolumeDown { .. } => ActionId::VolumeDown,
            Action::VolumeSpecific { .. } => ActionId::VolumeSpecific,
            Action::SeekPosition { .. } => ActionId::SeekPosition,
            Action::Skip => ActionId::Skip,
            Action::Previous => ActionId::Previous,
            Action::ShuffleToggle => ActionId::ShuffleToggle,
            Action::ShuffleOn => ActionId::ShuffleOn,
            Action::ShuffleOff => ActionId::ShuffleOff,
            Action::RepeatState { .. } => ActionId::RepeatState,
            Action::ActiveDeviceToConfig => ActionId::ActiveDeviceToConfig,
            Action::SwitchActiveDevice { .. } => ActionId::SwitchActiveDevice,
        }
    }

    /// Whether the action targets the configured playback device.
    pub fn requires_device(&self) -> bool {
        !matches!(
            self,
            Action::ActiveDeviceToConfig | Action::SwitchActiveDevice { .. }
        )
    }

    /// Executes the action.
    ///
    /// Device-bound actions are skipped when `device_id` is `None`. Device
    /// selection actions store the new id in the config, save it and ask
    /// the host to re-check every feedback.
    pub async fn run<H: Host, T: Transport>(
        &self,
        session: &Session<H, T>,
        device_id: Option<&str>,
    ) -> Result<(), CommandError> {
        let device_id = match (self.requires_device(), device_id) {
            (true, None) => {
                debug!(action = %self.id(), "no playback device configured, skipping action");
                return Ok(());
            }
            (_, device_id) => device_id.unwrap_or_default(),
        };

        match self {
            Action::PlayPause => {
                commands::change_play_state(session, device_id, PlayAction::Toggle).await
            }
            Action::Play => commands::change_play_state(session, device_id, PlayAction::Play).await,
            Action::Pause => {
                commands::change_play_state(session, device_id, PlayAction::Pause).await
            }
            Action::PlaySpecificList { kind, id, behavior } => {
                let context_uri = format!("spotify:{}:{}", kind.as_str(), id);
                commands::play_specific_list(session, device_id, &context_uri, *behavior).await
            }
            Action::PlaySpecificTracks { uris, position_ms } => {
                commands::play_specific_tracks(session, device_id, uris, *position_ms).await
            }
            Action::VolumeUp { amount } => {
                commands::change_volume(session, device_id, false, *amount).await
            }
            Action::VolumeDown { amount } => {
                commands::change_volume(session, device_id, false, -*amount).await
            }
            Action::VolumeSpecific { value } => {
                commands::change_volume(session, device_id, true, *value).await
            }
            Action::SeekPosition { position_ms } => {
                commands::seek_position(session, device_id, *position_ms).await
            }
            Action::Skip => commands::skip_song(session, device_id).await,
            Action::Previous => commands::previous_song(session, device_id).await,
            Action::ShuffleToggle => {
                commands::change_shuffle_state(session, device_id, ShuffleAction::Toggle).await
            }
            Action::ShuffleOn => {
                commands::change_shuffle_state(session, device_id, ShuffleAction::On).await
            }
            Action::ShuffleOff => {
                commands::change_shuffle_state(session, device_id, ShuffleAction::Off).await
            }
            Action::RepeatState { state } => {
                commands::change_repeat_state(session, device_id, *state).await
            }
            Action::ActiveDeviceToConfig => {
                if let Some(active) = commands::active_device_id(session).await? {
                    select_device(session, active).await;
                }
                Ok(())
            }
            Action::SwitchActiveDevice { device_id } => {
                select_device(session, device_id.clone()).await;
                commands::transfer_playback(session, device_id).await
            }
        }
    }
}

async fn select_device<H: Host, T: Transport>(session: &Session<H, T>, device_id: String) {
    session
        .update_config(|config| config.device_id = Some(device_id))
        .await;
    session.host().check_feedbacks(FeedbackId::ALL.to_vec()).await;
}

fn required_text(
    action: ActionId,
    options: &Value,
    option: &'static str,
) -> Result<String, ActionParseError> {
    options[option]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(ActionParseError::MissingOption { action, option })
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Missing options take the host's default; present but unparsable values
/// become `NaN`.
fn number_or(value: &Value, default: f64) -> f64 {
    if value.is_null() {
        return default;
    }
    number(value).unwrap_or(f64::NAN)
}
