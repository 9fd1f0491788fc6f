//! Playable byte sources and the handles tracks hold on them
//!
//! A [`SourceHandle`] is created once per ingested file and owned by its
//! track. Handles are reference counted so the device can keep the loaded
//! one alive; every playlist carries a [`SourceTracker`] that counts the
//! handles still alive, which makes teardown observable.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Raw byte data a track plays from
#[derive(Debug, Clone)]
pub enum ByteSource {
    /// File on local disk
    File(PathBuf),

    /// Data already in memory (e.g. an upload)
    Memory(Bytes),
}

/// One unit handed over by the ingestion collaborator
#[derive(Debug, Clone)]
pub struct IngestItem {
    /// Name shown as the track title
    pub filename: String,

    /// Where the audio data lives
    pub source: ByteSource,
}

impl IngestItem {
    /// Create an item from a filename and byte source
    pub fn new(filename: impl Into<String>, source: ByteSource) -> Self {
        Self {
            filename: filename.into(),
            source,
        }
    }

    /// Create an item for a file on disk, named after its last path component
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self::new(filename, ByteSource::File(path.to_path_buf()))
    }
}

/// Source identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(Uuid);

impl SourceId {
    /// Generate a new random source ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Counts live source handles created through it
#[derive(Debug, Clone, Default)]
pub struct SourceTracker {
    live: Arc<AtomicUsize>,
}

impl SourceTracker {
    /// Create a tracker with no live handles
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a byte source in a new handle counted by this tracker
    pub fn register(&self, name: impl Into<String>, data: ByteSource) -> SourceHandle {
        self.live.fetch_add(1, Ordering::SeqCst);
        SourceHandle {
            inner: Arc::new(SourceInner {
                id: SourceId::generate(),
                name: name.into(),
                data,
                live: Arc::clone(&self.live),
            }),
        }
    }

    /// Number of handles not yet released
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// Opaque, immutable reference to playable bytes
///
/// Cloning shares the same underlying source; the source is released when
/// the last clone is dropped.
#[derive(Debug, Clone)]
pub struct SourceHandle {
    inner: Arc<SourceInner>,
}

#[derive(Debug)]
struct SourceInner {
    id: SourceId,
    name: String,
    data: ByteSource,
    live: Arc<AtomicUsize>,
}

impl Drop for SourceInner {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SourceHandle {
    /// Unique identity of this source
    pub fn id(&self) -> SourceId {
        self.inner.id
    }

    /// Filename the source was ingested under
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The bytes behind the handle
    pub fn data(&self) -> &ByteSource {
        &self.inner.data
    }

    /// File extension of the ingested name, used as a format hint
    pub fn extension(&self) -> Option<&str> {
        Path::new(self.name()).extension().and_then(|ext| ext.to_str())
    }
}

impl PartialEq for SourceHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for SourceHandle {}
