use rand::{Rng, distr::Alphanumeric};

/// Hours, minutes and seconds left in a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemainingTime {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl RemainingTime {
    /// Splits `max(duration - progress, 0)` into its components.
    pub fn from_ms(duration_ms: u64, progress_ms: u64) -> Self {
        let remaining = duration_ms.saturating_sub(progress_ms);
        Self {
            hours: remaining / 3_600_000,
            minutes: (remaining / 60_000) % 60,
            seconds: (remaining / 1000) % 60,
        }
    }

    /// `HH:MM:SS`, zero padded.
    pub fn formatted(&self) -> String {
        format!(
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

/// Bare id portion of a `spotify:<type>:<id>` URI.
pub fn id_from_uri(uri: &str) -> Option<String> {
    uri.split(':')
        .nth(2)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Completion of the current track as a rounded percentage, `"-"` when the
/// duration is unknown.
pub fn progress_percentage(progress_ms: u64, duration_ms: u64) -> String {
    if duration_ms == 0 {
        return "-".to_string();
    }
    let percentage = (progress_ms as f64 / duration_ms as f64 * 100.0).round();
    format!("{}", percentage as i64)
}

/// Whole seconds of a millisecond value, rounded.
pub fn ms_to_seconds(ms: u64) -> String {
    format!("{}", (ms as f64 / 1000.0).round() as u64)
}

/// Turns a comma separated list of track ids into track URIs.
pub fn track_uris(ids: &str) -> Vec<String> {
    ids.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| format!("spotify:track:{id}"))
        .collect()
}

/// Random nonce for the OAuth `state` parameter.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}
