//! Playback Events
//!
//! Event-based communication for presentation synchronization.
//! The controller queues events as it reconciles; the presentation layer
//! drains them with `PlaybackController::drain_events`.

use crate::types::PlaybackState;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Play/pause intent changed
    StateChanged {
        /// The new state
        state: PlaybackState,
    },

    /// A different track was loaded into the device
    TrackChanged {
        /// Playlist index of the new track
        index: usize,
        /// Title of the new track
        title: String,
    },

    /// Tracks were appended to the playlist
    PlaylistChanged {
        /// New playlist length
        length: usize,
    },

    /// Time or duration changed (also emitted with zeros on track change)
    Position {
        /// Elapsed seconds
        current_time: f64,
        /// Track length, if known
        duration: Option<f64>,
        /// Progress in [0, 100]
        percent: f64,
    },

    /// The device could not load a track
    TrackFailed {
        /// Playlist index of the failed track
        index: usize,
        /// Error message
        message: String,
    },
}
