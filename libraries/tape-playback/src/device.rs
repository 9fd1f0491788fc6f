//! Playback device capability
//!
//! The device is whatever actually decodes and outputs audio: a media
//! element, a platform player, or a test fake. The controller only issues
//! commands; outcomes come back later as [`DeviceEvent`]s.

use crate::source::SourceHandle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one `load` call
///
/// The controller issues a fresh token for every load. Devices must tag
/// every event with the token of the load it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadToken(u64);

impl LoadToken {
    /// Token before any load was issued
    pub const INITIAL: LoadToken = LoadToken(0);

    /// The token following this one
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Media output driven by the controller
///
/// All commands are fire-and-forget.
pub trait PlaybackDevice {
    /// Replace the loaded source and rewind to the start
    ///
    /// Events produced for this source must carry `token`.
    fn load(&mut self, token: LoadToken, source: &SourceHandle);

    /// Start or resume producing audio from the loaded source
    fn play(&mut self);

    /// Stop producing audio, keeping the position
    fn pause(&mut self);

    /// Elapsed seconds in the loaded source
    fn current_time(&self) -> f64;

    /// Drop the loaded source
    fn unload(&mut self) {}
}

/// Asynchronous signal from the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeviceEvent {
    /// Playback position advanced
    TimeUpdate {
        token: LoadToken,
        /// Elapsed seconds
        elapsed: f64,
    },

    /// Source metadata loaded
    DurationKnown {
        token: LoadToken,
        /// Track length in seconds
        duration: f64,
    },

    /// Source could not be loaded or decoded
    LoadFailed { token: LoadToken, message: String },

    /// Reached the end of the source
    Ended { token: LoadToken },
}

impl DeviceEvent {
    /// Load this event belongs to
    pub fn token(&self) -> LoadToken {
        match self {
            DeviceEvent::TimeUpdate { token, .. }
            | DeviceEvent::DurationKnown { token, .. }
            | DeviceEvent::LoadFailed { token, .. }
            | DeviceEvent::Ended { token } => *token,
        }
    }
}
