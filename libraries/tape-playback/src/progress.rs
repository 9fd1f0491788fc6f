//! Elapsed time, duration and the progress derived from them

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};

/// Time state of the selected track
///
/// `duration` is `None` until the device reports it. The percentage is
/// always derived, never stored, so it cannot drift from the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Progress {
    current_time: f64,
    duration: Option<f64>,
}

impl Progress {
    /// Zeroed progress with unknown duration
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to zero with unknown duration
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record the device-reported position
    ///
    /// Negative or non-finite values are treated as 0.
    pub fn set_time(&mut self, elapsed: f64) {
        self.current_time = sanitize(elapsed);
    }

    /// Record the device-reported duration
    ///
    /// Non-finite values (live or broken sources) leave the duration unknown.
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration.is_finite().then_some(duration.max(0.0));
    }

    /// Elapsed seconds
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Track length in seconds, if known
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Duration, or `UnknownDuration` while not loaded or zero-length
    pub fn known_duration(&self) -> Result<f64> {
        self.duration
            .filter(|d| *d > 0.0)
            .ok_or(PlaybackError::UnknownDuration)
    }

    /// Percentage elapsed in [0, 100]; 0 while the duration is unknown or 0
    pub fn percent(&self) -> f64 {
        match self.known_duration() {
            Ok(duration) => (self.current_time / duration * 100.0).clamp(0.0, 100.0),
            Err(_) => 0.0,
        }
    }
}

/// Format seconds as "M:SS"
///
/// Minutes are not padded and not wrapped into hours. NaN, infinite and
/// negative input formats as "0:00".
pub fn format_time(seconds: f64) -> String {
    let total = sanitize(seconds).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

fn sanitize(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}
