//! Field-level diff between consecutive playback snapshots.
//!
//! Only variables whose derived value changed are emitted, together with the
//! feedback categories that need re-evaluation. A first snapshot after an
//! unknown state is treated as a full change so the host receives every
//! value at least once.

use std::collections::BTreeSet;

use crate::{
    feedbacks::FeedbackId,
    state::{DeviceInfo, PlaybackState, TrackInfo},
    utils::{self, RemainingTime},
    variables::{VariableId, VariableValue, VariableValues},
};

const PLAYING_ICON: &str = "\u{23F5}";
const STOPPED_ICON: &str = "\u{23F9}";

/// Batched result of one diff: one variable update and one feedback check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDiff {
    pub variables: VariableValues,
    pub feedbacks: BTreeSet<FeedbackId>,
}

impl StateDiff {
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.feedbacks.is_empty()
    }

    fn set(&mut self, id: VariableId, value: impl Into<VariableValue>) {
        self.variables.insert(id, value.into());
    }
}

fn track(state: Option<&PlaybackState>) -> Option<&TrackInfo> {
    state.and_then(|s| s.track_info.as_ref())
}

fn device(state: Option<&PlaybackState>) -> Option<&DeviceInfo> {
    state.and_then(|s| s.device_info.as_ref())
}

fn differs<T: PartialEq>(force: bool, old: T, new: T) -> bool {
    force || old != new
}

fn text(value: Option<&str>, default: &str) -> VariableValue {
    VariableValue::Text(value.unwrap_or(default).to_string())
}

/// Computes the variable updates and feedback invalidations between `old`
/// and `new`.
///
/// Progress and duration are coupled: when either changes, percentage,
/// elapsed seconds and every remaining-time variable are recomputed from
/// the new state together. The duration itself is only sent when it changed.
pub fn diff_playback_state(
    old: Option<&PlaybackState>,
    new: Option<&PlaybackState>,
) -> StateDiff {
    let force = old.is_none() && new.is_some();

    let mut diff = StateDiff::default();

    if differs(force, old.map(|s| s.is_playing), new.map(|s| s.is_playing)) {
        let playing = new.is_some_and(|s| s.is_playing);
        diff.set(VariableId::IsPlaying, playing);
        diff.set(
            VariableId::IsPlayingIcon,
            if playing { PLAYING_ICON } else { STOPPED_ICON },
        );
        diff.feedbacks.insert(FeedbackId::IsPlaying);
    }

    if differs(force, old.map(|s| s.is_shuffle), new.map(|s| s.is_shuffle)) {
        diff.set(VariableId::IsShuffle, new.is_some_and(|s| s.is_shuffle));
        diff.feedbacks.insert(FeedbackId::IsShuffle);
    }

    if differs(force, old.map(|s| s.repeat_state), new.map(|s| s.repeat_state)) {
        let repeat = new.map(|s| s.repeat_state).unwrap_or_default();
        diff.set(VariableId::Repeat, repeat.as_str());
        diff.feedbacks.insert(FeedbackId::IsRepeat);
    }

    let context = new.and_then(|s| s.current_context.as_deref());
    if differs(force, old.and_then(|s| s.current_context.as_deref()), context) {
        diff.variables.insert(VariableId::CurrentContext, text(context, ""));
        diff.feedbacks.insert(FeedbackId::CurrentContext);
    }

    let artist = track(new).and_then(|t| t.artist_name.as_deref());
    if differs(force, track(old).and_then(|t| t.artist_name.as_deref()), artist) {
        diff.variables.insert(VariableId::ArtistName, text(artist, ""));
    }
    let name = track(new).and_then(|t| t.name.as_deref());
    if differs(force, track(old).and_then(|t| t.name.as_deref()), name) {
        diff.variables.insert(VariableId::SongName, text(name, ""));
    }
    let album = track(new).and_then(|t| t.album_name.as_deref());
    if differs(force, track(old).and_then(|t| t.album_name.as_deref()), album) {
        diff.variables.insert(VariableId::AlbumName, text(album, ""));
    }
    let art = track(new).and_then(|t| t.album_image_url.as_deref());
    if differs(force, track(old).and_then(|t| t.album_image_url.as_deref()), art) {
        diff.variables.insert(VariableId::CurrentAlbumArt, text(art, ""));
    }

    let progress_ms = new.map_or(0, |s| s.track_progress_ms);
    let duration_ms = track(new).map_or(0, |t| t.duration_ms);

    let progress_changed = old.map(|s| s.track_progress_ms) != new.map(|s| s.track_progress_ms);
    let duration_changed = track(old).map(|t| t.duration_ms) != track(new).map(|t| t.duration_ms);

    if force || progress_changed || duration_changed {
        let remaining = RemainingTime::from_ms(duration_ms, progress_ms);

        diff.set(VariableId::SongProgressSeconds, utils::ms_to_seconds(progress_ms));
        if force || duration_changed {
            diff.set(VariableId::SongDurationSeconds, utils::ms_to_seconds(duration_ms));
        }
        diff.set(
            VariableId::SongPercentage,
            utils::progress_percentage(progress_ms, duration_ms),
        );
        diff.set(VariableId::SongTimeRemaining, remaining.formatted());
        diff.set(VariableId::SongTimeRemainingHours, format!("{:02}", remaining.hours));
        diff.set(VariableId::SongTimeRemainingMinutes, format!("{:02}", remaining.minutes));
        diff.set(VariableId::SongTimeRemainingSeconds, format!("{:02}", remaining.seconds));
    }

    let old_volume = device(old).map(|d| d.volume_percent);
    if differs(force, old_volume, device(new).map(|d| d.volume_percent)) {
        let volume = match device(new).and_then(|d| d.volume_percent) {
            Some(volume) => VariableValue::Number(i64::from(volume)),
            None => VariableValue::from("-"),
        };
        diff.variables.insert(VariableId::Volume, volume);
    }

    let device_name = device(new).map(|d| d.name.as_str());
    if differs(force, device(old).map(|d| d.name.as_str()), device_name) {
        diff.variables.insert(VariableId::DeviceName, text(device_name, "-"));
        diff.feedbacks.insert(FeedbackId::ActiveDevice);
    }
    let device_id = device(new).and_then(|d| d.id.as_deref());
    if differs(force, device(old).and_then(|d| d.id.as_deref()), device_id) {
        diff.variables.insert(VariableId::DeviceId, text(device_id, "-"));
        diff.feedbacks.insert(FeedbackId::ActiveDevice);
    }

    diff
}
