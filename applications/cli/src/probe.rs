//! Duration probing with Symphonia
//!
//! The clock device never decodes audio. It only needs to know that a source
//! is a playable stream and how long it runs.

use crate::error::{CliError, Result};
use std::io::Cursor;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tape_playback::{ByteSource, SourceHandle};

/// Probe a source and return its duration in seconds
///
/// Returns `Ok(None)` when the container is readable but does not declare a
/// frame count. Fails when the bytes are not a supported audio stream or no
/// decoder exists for its codec.
pub fn probe_duration(source: &SourceHandle) -> Result<Option<f64>> {
    let media: Box<dyn MediaSource> = match source.data() {
        ByteSource::File(path) => Box::new(std::fs::File::open(path)?),
        ByteSource::Memory(bytes) => Box::new(Cursor::new(bytes.clone())),
    };
    let mss = MediaSourceStream::new(media, Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = source.extension() {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| CliError::Probe(format!("Failed to probe '{}': {}", source.name(), e)))?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| CliError::Probe(format!("No audio tracks found in '{}'", source.name())))?;

    symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| CliError::Probe(format!("Unsupported codec in '{}': {}", source.name(), e)))?;

    let params = &track.codec_params;
    let duration = match (params.n_frames, params.sample_rate) {
        (Some(frames), Some(rate)) if rate > 0 => Some(frames as f64 / f64::from(rate)),
        _ => None,
    };

    Ok(duration)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use bytes::Bytes;
    use tape_playback::SourceTracker;

    /// Silent 16-bit mono PCM WAV
    pub(crate) fn wav_bytes(sample_rate: u32, frames: u32) -> Bytes {
        let data_len = frames * 2;
        let mut wav = Vec::with_capacity(44 + data_len as usize);
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_len).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&1u16.to_le_bytes()); // mono
        wav.extend_from_slice(&sample_rate.to_le_bytes());
        wav.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        wav.extend_from_slice(&2u16.to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_len.to_le_bytes());
        wav.resize(44 + data_len as usize, 0);
        Bytes::from(wav)
    }

    #[test]
    fn test_probe_memory_wav() {
        let tracker = SourceTracker::new();
        let source = tracker.register("tone.wav", ByteSource::Memory(wav_bytes(8000, 16_000)));

        let duration = probe_duration(&source).unwrap();
        assert_eq!(duration, Some(2.0));
    }

    #[test]
    fn test_probe_file_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.wav");
        std::fs::write(&path, wav_bytes(4000, 1000)).unwrap();

        let tracker = SourceTracker::new();
        let source = tracker.register("short.wav", ByteSource::File(path));

        assert_eq!(probe_duration(&source).unwrap(), Some(0.25));
    }

    #[test]
    fn test_probe_garbage_fails() {
        let tracker = SourceTracker::new();
        let source = tracker.register(
            "notes.txt",
            ByteSource::Memory(Bytes::from_static(b"definitely not audio")),
        );

        assert!(matches!(probe_duration(&source), Err(CliError::Probe(_))));
    }

    #[test]
    fn test_probe_missing_file_is_io_error() {
        let tracker = SourceTracker::new();
        let source = tracker.register(
            "gone.mp3",
            ByteSource::File("/nonexistent/tape/gone.mp3".into()),
        );

        assert!(matches!(probe_duration(&source), Err(CliError::Io(_))));
    }
}
