//! Core types for playback control

use crate::source::SourceHandle;
use serde::{Deserialize, Serialize};

/// Placeholder artist for tracks without metadata
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// One playable item in the playlist
///
/// The source is fixed at creation; there is no way to swap it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    title: String,
    artist: String,
    source: SourceHandle,
}

impl Track {
    /// Create a track
    pub fn new(title: impl Into<String>, artist: impl Into<String>, source: SourceHandle) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            source,
        }
    }

    /// Track title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Artist name
    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// Handle on the playable bytes
    pub fn source(&self) -> &SourceHandle {
        &self.source
    }
}

/// Play/pause intent
///
/// This is the state the controller drives the device toward, not
/// necessarily what the device is doing at this instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Not producing audio
    #[default]
    Paused,

    /// Producing audio
    Playing,
}

impl PlaybackState {
    /// The other state
    pub fn toggled(self) -> Self {
        match self {
            PlaybackState::Paused => PlaybackState::Playing,
            PlaybackState::Playing => PlaybackState::Paused,
        }
    }

    pub fn is_playing(self) -> bool {
        self == PlaybackState::Playing
    }
}

/// Where the selected track is in its load lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStatus {
    /// Nothing selected
    Idle,

    /// Load issued, no metadata yet
    Loading,

    /// Device reported the duration
    Ready,

    /// Device could not load the source
    Failed,
}

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Artist label for ingested tracks (default: "Unknown Artist")
    pub unknown_artist: String,

    /// Move to the next track when one ends (default: true)
    pub auto_advance: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            unknown_artist: UNKNOWN_ARTIST.to_string(),
            auto_advance: true,
        }
    }
}

/// Everything the presentation layer needs to draw the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlaying {
    /// Index of the selected track
    pub index: Option<usize>,

    pub title: String,

    pub artist: String,

    /// Elapsed time as "M:SS"
    pub elapsed: String,

    /// Track length as "M:SS" ("0:00" while unknown)
    pub duration: String,

    /// Progress in [0, 100]
    pub percent: f64,

    pub is_playing: bool,
}
