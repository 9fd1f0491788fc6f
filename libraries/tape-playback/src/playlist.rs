//! Playlist store
//!
//! Ordered, append-only track list with a circular selection cursor:
//!
//! ```text
//! tracks:   [ a.mp3 | b.mp3 | c.mp3 ]
//!                      ^
//! current:             1        next -> 2, next -> 0 (wraps)
//! ```
//!
//! Mutations record [`PlaylistChange`] notifications which the controller
//! drains after every operation to decide what to reconcile.

use crate::source::{IngestItem, SourceTracker};
use crate::types::{Track, UNKNOWN_ARTIST};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Change notification recorded by the playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaylistChange {
    /// Tracks were appended
    Appended {
        /// Number of tracks added
        count: usize,
        /// Playlist length afterwards
        length: usize,
    },

    /// A different track became the current one
    Selected { index: usize },
}

/// Ordered tracks plus the current selection
#[derive(Debug)]
pub struct Playlist {
    tracks: Vec<Track>,

    /// `Some` exactly when `tracks` is non-empty
    current: Option<usize>,

    unknown_artist: String,

    sources: SourceTracker,

    changes: Vec<PlaylistChange>,
}

impl Playlist {
    /// Create an empty playlist
    pub fn new() -> Self {
        Self::with_artist_placeholder(UNKNOWN_ARTIST)
    }

    /// Create an empty playlist labelling ingested tracks with `unknown_artist`
    pub fn with_artist_placeholder(unknown_artist: impl Into<String>) -> Self {
        Self {
            tracks: Vec::new(),
            current: None,
            unknown_artist: unknown_artist.into(),
            sources: SourceTracker::new(),
            changes: Vec::new(),
        }
    }

    /// Append one track per item
    ///
    /// The first ingest into an empty playlist selects index 0.
    /// Returns the number of tracks appended.
    pub fn ingest(&mut self, items: impl IntoIterator<Item = IngestItem>) -> usize {
        let before = self.tracks.len();

        for item in items {
            let source = self.sources.register(item.filename.clone(), item.source);
            self.tracks
                .push(Track::new(item.filename, self.unknown_artist.clone(), source));
        }

        let count = self.tracks.len() - before;
        if count == 0 {
            return 0;
        }

        debug!(count, length = self.tracks.len(), "Ingested tracks");
        self.changes.push(PlaylistChange::Appended {
            count,
            length: self.tracks.len(),
        });

        if self.current.is_none() {
            self.select(0);
        }

        count
    }

    /// Move to the next track, wrapping to the first
    ///
    /// Returns the new index, or `None` (state untouched) when empty.
    pub fn select_next(&mut self) -> Option<usize> {
        let current = self.current?;
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }

        self.select((current + 1) % len);
        self.current
    }

    /// Move to the previous track, wrapping to the last
    ///
    /// Returns the new index, or `None` (state untouched) when empty.
    pub fn select_previous(&mut self) -> Option<usize> {
        let current = self.current?;
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }

        let index = if current == 0 { len - 1 } else { current - 1 };
        self.select(index);
        self.current
    }

    /// Currently selected track
    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|index| self.tracks.get(index))
    }

    /// Index of the currently selected track
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Track at index
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// All tracks in insertion order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Tracker counting this playlist's live source handles
    pub fn source_tracker(&self) -> SourceTracker {
        self.sources.clone()
    }

    /// Drain change notifications recorded since the last call
    pub fn take_changes(&mut self) -> Vec<PlaylistChange> {
        std::mem::take(&mut self.changes)
    }

    /// Only records a change when the selection actually moves
    fn select(&mut self, index: usize) {
        if self.current != Some(index) {
            self.current = Some(index);
            self.changes.push(PlaylistChange::Selected { index });
        }
    }
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ByteSource;
    use std::path::PathBuf;

    fn items(names: &[&str]) -> Vec<IngestItem> {
        names
            .iter()
            .map(|name| IngestItem::new(*name, ByteSource::File(PathBuf::from(name))))
            .collect()
    }

    #[test]
    fn create_empty_playlist() {
        let playlist = Playlist::new();
        assert!(playlist.is_empty());
        assert_eq!(playlist.current_index(), None);
        assert!(playlist.current_track().is_none());
    }

    #[test]
    fn first_ingest_selects_first_track() {
        let mut playlist = Playlist::new();
        assert_eq!(playlist.ingest(items(&["a.mp3", "b.mp3"])), 2);

        assert_eq!(playlist.current_index(), Some(0));
        let track = playlist.current_track().unwrap();
        assert_eq!(track.title(), "a.mp3");
        assert_eq!(track.artist(), "Unknown Artist");
    }

    #[test]
    fn later_ingest_keeps_selection() {
        let mut playlist = Playlist::new();
        playlist.ingest(items(&["a.mp3", "b.mp3"]));
        playlist.select_next();
        playlist.take_changes();

        playlist.ingest(items(&["c.mp3"]));
        assert_eq!(playlist.current_index(), Some(1));
        assert_eq!(
            playlist.take_changes(),
            vec![PlaylistChange::Appended { count: 1, length: 3 }]
        );
    }

    #[test]
    fn empty_ingest_records_nothing() {
        let mut playlist = Playlist::new();
        assert_eq!(playlist.ingest(Vec::new()), 0);
        assert!(playlist.take_changes().is_empty());
        assert_eq!(playlist.current_index(), None);
    }

    #[test]
    fn ingest_records_append_then_selection() {
        let mut playlist = Playlist::new();
        playlist.ingest(items(&["a.mp3"]));

        assert_eq!(
            playlist.take_changes(),
            vec![
                PlaylistChange::Appended { count: 1, length: 1 },
                PlaylistChange::Selected { index: 0 },
            ]
        );
    }

    #[test]
    fn next_wraps_to_first() {
        let mut playlist = Playlist::new();
        playlist.ingest(items(&["a", "b", "c"]));

        assert_eq!(playlist.select_next(), Some(1));
        assert_eq!(playlist.select_next(), Some(2));
        assert_eq!(playlist.select_next(), Some(0));
    }

    #[test]
    fn previous_wraps_to_last() {
        let mut playlist = Playlist::new();
        playlist.ingest(items(&["a", "b", "c"]));

        assert_eq!(playlist.select_previous(), Some(2));
        assert_eq!(playlist.current_track().unwrap().title(), "c");
    }

    #[test]
    fn navigation_on_empty_is_noop() {
        let mut playlist = Playlist::new();
        assert_eq!(playlist.select_next(), None);
        assert_eq!(playlist.select_previous(), None);
        assert_eq!(playlist.current_index(), None);
        assert!(playlist.take_changes().is_empty());
    }

    #[test]
    fn single_track_navigation_does_not_reselect() {
        let mut playlist = Playlist::new();
        playlist.ingest(items(&["only.mp3"]));
        playlist.take_changes();

        assert_eq!(playlist.select_next(), Some(0));
        assert_eq!(playlist.select_previous(), Some(0));
        assert!(playlist.take_changes().is_empty());
    }

    #[test]
    fn custom_artist_placeholder() {
        let mut playlist = Playlist::with_artist_placeholder("Various");
        playlist.ingest(items(&["a.mp3"]));
        assert_eq!(playlist.current_track().unwrap().artist(), "Various");
    }

    #[test]
    fn dropping_playlist_releases_sources() {
        let mut playlist = Playlist::new();
        playlist.ingest(items(&["a.mp3", "b.mp3"]));
        let tracker = playlist.source_tracker();
        assert_eq!(tracker.live(), 2);

        drop(playlist);
        assert_eq!(tracker.live(), 0);
    }
}
