//! Playback controller - core orchestration
//!
//! Keeps the device's loaded source and play/pause state consistent with
//! the playlist selection and the user's intent, and folds device signals
//! into progress state.
//!
//! Every public operation ends with [`PlaybackController::reconcile`], which
//! runs synchronously:
//! 1. selection reaction - load the newly selected source and zero progress
//! 2. play-intent reaction - issue `play`/`pause` against whatever is loaded
//!
//! Running them in this order guarantees that a play command issued after a
//! track change always targets the new source.

use crate::{
    device::{DeviceEvent, LoadToken, PlaybackDevice},
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    playlist::{Playlist, PlaylistChange},
    progress::{format_time, Progress},
    source::IngestItem,
    types::{LoadStatus, NowPlaying, PlaybackConfig, PlaybackState, Track},
};
use std::collections::BTreeSet;
use tracing::{debug, info, trace, warn};

/// Title shown while nothing is selected
pub const NO_TRACK_TITLE: &str = "No track";

/// Playback controller
///
/// Owns the playlist, the device and all derived playback state. There is
/// exactly one logical actor: callers serialize user commands and device
/// events through `&mut self`.
pub struct PlaybackController<D: PlaybackDevice> {
    // State
    state: PlaybackState,
    load_status: LoadStatus,
    progress: Progress,

    // Playlist
    playlist: Playlist,
    failed_tracks: BTreeSet<usize>,

    // Device
    device: D,
    load_token: LoadToken,

    config: PlaybackConfig,

    // Pending reactions for the next reconcile
    intent_changed: bool,
    reload_requested: bool,

    // Event queue for presentation synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl<D: PlaybackDevice> PlaybackController<D> {
    /// Create a controller with an empty playlist
    pub fn new(device: D, config: PlaybackConfig) -> Self {
        Self {
            state: PlaybackState::Paused,
            load_status: LoadStatus::Idle,
            progress: Progress::new(),
            playlist: Playlist::with_artist_placeholder(config.unknown_artist.clone()),
            failed_tracks: BTreeSet::new(),
            device,
            load_token: LoadToken::INITIAL,
            config,
            intent_changed: false,
            reload_requested: false,
            pending_events: Vec::new(),
        }
    }

    /// Create a controller with default configuration
    pub fn with_device(device: D) -> Self {
        Self::new(device, PlaybackConfig::default())
    }

    // ===== Ingestion =====

    /// Append tracks and reload the current one
    ///
    /// The first ingest selects track 0. Later appends restart the current
    /// track from zero with the play/pause intent re-applied.
    pub fn ingest(&mut self, items: impl IntoIterator<Item = IngestItem>) -> usize {
        let count = self.playlist.ingest(items);
        self.reconcile();
        count
    }

    // ===== Transport =====

    /// Flip play/pause intent
    ///
    /// With no current track the controller stays paused.
    pub fn toggle_play_pause(&mut self) -> PlaybackState {
        if let Err(err) = self.require_track() {
            debug!("Ignoring play/pause: {}", err);
            return self.state;
        }

        self.state = self.state.toggled();
        self.intent_changed = true;

        // Retry a source the device previously rejected
        if self.state.is_playing() && self.load_status == LoadStatus::Failed {
            self.reload_requested = true;
        }

        self.emit_state_changed();
        self.reconcile();
        self.state
    }

    /// Start playback if paused
    pub fn play(&mut self) -> PlaybackState {
        if self.state.is_playing() {
            self.state
        } else {
            self.toggle_play_pause()
        }
    }

    /// Pause playback if playing
    pub fn pause(&mut self) -> PlaybackState {
        if self.state.is_playing() {
            self.toggle_play_pause()
        } else {
            self.state
        }
    }

    /// Select the next track (wrapping)
    ///
    /// Returns the new index, or `None` on an empty playlist.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<usize> {
        let index = self.playlist.select_next();
        if index.is_none() {
            debug!("Ignoring next: {}", PlaybackError::EmptyPlaylist);
        }
        self.reconcile();
        index
    }

    /// Select the previous track (wrapping)
    ///
    /// Returns the new index, or `None` on an empty playlist.
    pub fn previous(&mut self) -> Option<usize> {
        let index = self.playlist.select_previous();
        if index.is_none() {
            debug!("Ignoring previous: {}", PlaybackError::EmptyPlaylist);
        }
        self.reconcile();
        index
    }

    // ===== Device signals =====

    /// Fold a device signal into playback state
    ///
    /// Events from any load other than the latest one are discarded.
    pub fn handle_device_event(&mut self, event: DeviceEvent) {
        if let Err(err) = self.check_token(event.token()) {
            trace!("Discarding device event: {}", err);
            return;
        }

        match event {
            DeviceEvent::TimeUpdate { elapsed, .. } => {
                if self.load_status == LoadStatus::Failed {
                    return;
                }
                self.progress.set_time(elapsed);
                self.emit_position();
            }
            DeviceEvent::DurationKnown { duration, .. } => {
                if self.load_status == LoadStatus::Failed {
                    return;
                }
                self.progress.set_duration(duration);
                self.load_status = LoadStatus::Ready;
                self.emit_position();
            }
            DeviceEvent::LoadFailed { message, .. } => self.fail_current(message),
            DeviceEvent::Ended { .. } => self.finish_current(),
        }
    }

    // ===== Teardown =====

    /// Unload the device and release every ingested source
    ///
    /// Returns the device so platform code can close it.
    pub fn shutdown(self) -> D {
        let Self {
            mut device,
            playlist,
            ..
        } = self;

        device.unload();

        let sources = playlist.source_tracker();
        let tracks = playlist.len();
        drop(playlist);

        info!(
            "Playback session closed: {} tracks, {} sources still referenced",
            tracks,
            sources.live()
        );
        device
    }

    // ===== Queries =====

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn load_status(&self) -> LoadStatus {
        self.load_status
    }

    /// Token of the latest load issued to the device
    pub fn load_token(&self) -> LoadToken {
        self.load_token
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Elapsed seconds in the current track
    pub fn current_time(&self) -> f64 {
        self.progress.current_time()
    }

    /// Length of the current track, once the device reported it
    pub fn duration(&self) -> Option<f64> {
        self.progress.duration()
    }

    /// Progress in [0, 100]
    pub fn progress_percent(&self) -> f64 {
        self.progress.percent()
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.playlist.current_track()
    }

    /// Whether the device rejected the track at `index` on its last load
    pub fn is_track_failed(&self, index: usize) -> bool {
        self.failed_tracks.contains(&index)
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Snapshot for the presentation layer
    pub fn now_playing(&self) -> NowPlaying {
        let (title, artist) = match self.playlist.current_track() {
            Some(track) => (track.title().to_string(), track.artist().to_string()),
            None => (NO_TRACK_TITLE.to_string(), String::new()),
        };

        NowPlaying {
            index: self.playlist.current_index(),
            title,
            artist,
            elapsed: format_time(self.progress.current_time()),
            duration: format_time(self.progress.duration().unwrap_or(0.0)),
            percent: self.progress.percent(),
            is_playing: self.state.is_playing(),
        }
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Reconciliation =====

    /// Apply pending playlist changes and intent to the device
    ///
    /// Appends count as selection changes: the current track is reloaded
    /// and progress starts over, even when the index did not move.
    fn reconcile(&mut self) {
        let mut selection_changed = false;

        for change in self.playlist.take_changes() {
            match change {
                PlaylistChange::Appended { length, .. } => {
                    self.pending_events
                        .push(PlaybackEvent::PlaylistChanged { length });
                    selection_changed = true;
                }
                PlaylistChange::Selected { .. } => selection_changed = true,
            }
        }

        if selection_changed || self.reload_requested {
            self.reload_requested = false;
            self.load_current();
            // The new source needs the current intent applied to it
            self.intent_changed = true;
        }

        if self.intent_changed {
            self.intent_changed = false;
            self.apply_intent();
        }
    }

    /// Selection reaction: load the current track and zero progress
    fn load_current(&mut self) {
        self.progress.reset();

        let Some(index) = self.playlist.current_index() else {
            self.load_status = LoadStatus::Idle;
            return;
        };
        let Some(track) = self.playlist.get(index) else {
            self.load_status = LoadStatus::Idle;
            return;
        };

        self.load_token = self.load_token.next();
        self.load_status = LoadStatus::Loading;
        self.failed_tracks.remove(&index);

        debug!(
            "Loading track {} '{}' with load {}",
            index,
            track.title(),
            self.load_token
        );
        self.device.load(self.load_token, track.source());

        let title = track.title().to_string();
        self.pending_events
            .push(PlaybackEvent::TrackChanged { index, title });
        self.emit_position();
    }

    /// Play-intent reaction
    fn apply_intent(&mut self) {
        if self.playlist.current_track().is_none() {
            return;
        }

        match self.state {
            PlaybackState::Playing => self.device.play(),
            PlaybackState::Paused => self.device.pause(),
        }
    }

    fn fail_current(&mut self, message: String) {
        let index = self.playlist.current_index();
        let title = self
            .playlist
            .current_track()
            .map(|track| track.title().to_string())
            .unwrap_or_default();
        let err = PlaybackError::SourceLoad { title, message };
        warn!("{}", err);

        self.load_status = LoadStatus::Failed;
        self.progress.reset();

        if self.state.is_playing() {
            self.state = PlaybackState::Paused;
            self.emit_state_changed();
        }
        self.device.pause();

        if let Some(index) = index {
            self.failed_tracks.insert(index);
            self.pending_events.push(PlaybackEvent::TrackFailed {
                index,
                message: err.to_string(),
            });
        }
        self.emit_position();
    }

    fn finish_current(&mut self) {
        let end = self
            .progress
            .duration()
            .unwrap_or_else(|| self.device.current_time());
        self.progress.set_time(end);
        self.emit_position();

        if !self.state.is_playing() {
            return;
        }

        if self.config.auto_advance {
            let before = self.playlist.current_index();
            let after = self.playlist.select_next();
            debug!("Track ended, advancing to {:?}", after);

            // Single-track playlist: selection does not move, replay it
            if after.is_some() && after == before {
                self.reload_requested = true;
            }
            self.reconcile();
        } else {
            debug!("Track ended, pausing");
            self.state = PlaybackState::Paused;
            self.emit_state_changed();
            self.device.pause();
        }
    }

    fn require_track(&self) -> Result<&Track> {
        self.playlist
            .current_track()
            .ok_or(PlaybackError::EmptyPlaylist)
    }

    fn check_token(&self, token: LoadToken) -> Result<()> {
        if self.load_status != LoadStatus::Idle && token == self.load_token {
            Ok(())
        } else {
            Err(PlaybackError::StaleDeviceEvent {
                token,
                current: self.load_token,
            })
        }
    }

    fn emit_state_changed(&mut self) {
        self.pending_events
            .push(PlaybackEvent::StateChanged { state: self.state });
    }

    fn emit_position(&mut self) {
        self.pending_events.push(PlaybackEvent::Position {
            current_time: self.progress.current_time(),
            duration: self.progress.duration(),
            percent: self.progress.percent(),
        });
    }
}
