//! Tape Player - Playback Control
//!
//! Platform-agnostic playlist and transport control for Tape Player.
//!
//! This crate provides:
//! - Append-only playlist with circular next/previous navigation
//! - Play/pause state machine guarded against empty playlists
//! - Synchronization with an external playback device (load, play, pause)
//! - Progress derivation from device time/duration signals
//! - Stale device event rejection via per-load tokens
//! - `M:SS` time formatting
//!
//! # Architecture
//!
//! `tape-playback` does not decode or output audio. The platform supplies a
//! [`PlaybackDevice`] and feeds its asynchronous signals back through
//! [`PlaybackController::handle_device_event`]. Everything runs on one
//! logical actor: the controller is driven through `&mut self`.
//!
//! # Example: Basic Session
//!
//! ```rust
//! use tape_playback::testing::RecordingDevice;
//! use tape_playback::{ByteSource, IngestItem, PlaybackController, PlaybackState};
//! use std::path::PathBuf;
//!
//! let mut controller = PlaybackController::with_device(RecordingDevice::new());
//!
//! controller.ingest(vec![
//!     IngestItem::new("a.mp3", ByteSource::File(PathBuf::from("/music/a.mp3"))),
//!     IngestItem::new("b.mp3", ByteSource::File(PathBuf::from("/music/b.mp3"))),
//! ]);
//! assert_eq!(controller.current_track().unwrap().title(), "a.mp3");
//!
//! assert_eq!(controller.toggle_play_pause(), PlaybackState::Playing);
//!
//! // Device reports metadata and a time tick for the loaded source
//! let duration = controller.device().duration_known(120.0);
//! controller.handle_device_event(duration);
//! let tick = controller.device().time_update(30.0);
//! controller.handle_device_event(tick);
//!
//! let view = controller.now_playing();
//! assert_eq!(view.elapsed, "0:30");
//! assert_eq!(view.duration, "2:00");
//! assert_eq!(view.percent, 25.0);
//! ```
//!
//! # Example: Platform Integration
//!
//! ```rust,no_run
//! use tape_playback::{LoadToken, PlaybackController, PlaybackDevice, SourceHandle};
//!
//! struct MyMediaElement {
//!     // ... platform-specific player
//! }
//!
//! impl PlaybackDevice for MyMediaElement {
//!     fn load(&mut self, token: LoadToken, source: &SourceHandle) {
//!         // Start loading; report DurationKnown/LoadFailed tagged with `token` later
//!     }
//!
//!     fn play(&mut self) {}
//!
//!     fn pause(&mut self) {}
//!
//!     fn current_time(&self) -> f64 {
//!         0.0
//!     }
//! }
//!
//! let mut controller = PlaybackController::with_device(MyMediaElement {});
//! controller.next();
//! ```

mod controller;
mod device;
mod error;
mod events;
mod playlist;
mod progress;
mod source;
pub mod testing;
pub mod types;

// Public exports
pub use controller::{PlaybackController, NO_TRACK_TITLE};
pub use device::{DeviceEvent, LoadToken, PlaybackDevice};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use playlist::{Playlist, PlaylistChange};
pub use progress::{format_time, Progress};
pub use source::{ByteSource, IngestItem, SourceHandle, SourceId, SourceTracker};
pub use types::{LoadStatus, NowPlaying, PlaybackConfig, PlaybackState, Track, UNKNOWN_ARTIST};
