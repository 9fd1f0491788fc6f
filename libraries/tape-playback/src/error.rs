//! Error types for playback control
//!
//! None of these are fatal. The controller recovers from every variant
//! locally and only logs or reports them as events.

use crate::device::LoadToken;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Navigation or play requested with zero tracks
    #[error("Playlist is empty")]
    EmptyPlaylist,

    /// Progress requested before the device reported a duration
    #[error("Duration not known yet")]
    UnknownDuration,

    /// Device event belongs to a source that is no longer selected
    #[error("Stale device event for load {token} (current load is {current})")]
    StaleDeviceEvent {
        /// Token carried by the event
        token: LoadToken,
        /// Token of the latest load
        current: LoadToken,
    },

    /// Device could not load or decode a source
    #[error("Failed to load '{title}': {message}")]
    SourceLoad {
        /// Title of the track that failed
        title: String,
        /// Device-provided reason
        message: String,
    },
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
