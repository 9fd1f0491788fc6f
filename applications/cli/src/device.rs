//! Wall-clock playback device
//!
//! `ClockDevice` plays nothing. It probes each source for its duration and
//! advances a position from the system clock while playing, which is enough
//! to drive the controller headlessly.

use crate::probe;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tape_playback::{DeviceEvent, LoadToken, PlaybackDevice, SourceHandle};
use tokio::sync::mpsc;
use tracing::{debug, warn};

type Durations = Arc<Mutex<HashMap<LoadToken, f64>>>;

/// Source currently held by the device
#[derive(Debug)]
struct Loaded {
    token: LoadToken,
    /// Position accumulated before the current play stretch
    offset: f64,
    /// Start of the current play stretch, `None` while paused
    started: Option<Instant>,
    ended: bool,
}

impl Loaded {
    fn new(token: LoadToken) -> Self {
        Self {
            token,
            offset: 0.0,
            started: None,
            ended: false,
        }
    }

    fn position(&self, now: Instant) -> f64 {
        let running = self
            .started
            .map_or(0.0, |started| now.duration_since(started).as_secs_f64());
        self.offset + running
    }
}

pub struct ClockDevice {
    events: mpsc::UnboundedSender<DeviceEvent>,
    durations: Durations,
    loaded: Option<Loaded>,
}

impl ClockDevice {
    /// Create a device and the receiver its signals arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DeviceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let device = Self {
            events: tx,
            durations: Arc::new(Mutex::new(HashMap::new())),
            loaded: None,
        };
        (device, rx)
    }

    /// Report the position of a playing source
    ///
    /// Emits `TimeUpdate`, followed by `Ended` once the probed duration is
    /// reached. Does nothing while paused or before the first load.
    pub fn tick(&mut self) {
        let duration = self
            .loaded
            .as_ref()
            .and_then(|loaded| self.duration_of(loaded.token));

        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        if loaded.started.is_none() {
            return;
        }

        let position = loaded.position(Instant::now());
        let (elapsed, finished) = match duration {
            Some(duration) if position >= duration => (duration, true),
            _ => (position, false),
        };

        let token = loaded.token;
        self.send(DeviceEvent::TimeUpdate { token, elapsed });

        if finished {
            if let Some(loaded) = self.loaded.as_mut() {
                loaded.offset = elapsed;
                loaded.started = None;
                loaded.ended = true;
            }
            debug!("Source {} reached its end at {:.2}s", token, elapsed);
            self.send(DeviceEvent::Ended { token });
        }
    }

    fn duration_of(&self, token: LoadToken) -> Option<f64> {
        match self.durations.lock() {
            Ok(durations) => durations.get(&token).copied(),
            Err(_) => None,
        }
    }

    fn send(&self, event: DeviceEvent) {
        if self.events.send(event).is_err() {
            debug!("Device event dropped, receiver closed");
        }
    }
}

impl PlaybackDevice for ClockDevice {
    fn load(&mut self, token: LoadToken, source: &SourceHandle) {
        self.loaded = Some(Loaded::new(token));

        if let Ok(mut durations) = self.durations.lock() {
            durations.retain(|known, _| *known >= token);
        }

        let events = self.events.clone();
        let durations = Arc::clone(&self.durations);
        let source = source.clone();

        tokio::task::spawn_blocking(move || {
            let event = match probe::probe_duration(&source) {
                Ok(Some(duration)) => {
                    if let Ok(mut durations) = durations.lock() {
                        durations.insert(token, duration);
                    }
                    DeviceEvent::DurationKnown { token, duration }
                }
                Ok(None) => {
                    debug!("No duration declared for '{}'", source.name());
                    return;
                }
                Err(e) => {
                    warn!("Cannot load '{}': {}", source.name(), e);
                    DeviceEvent::LoadFailed {
                        token,
                        message: e.to_string(),
                    }
                }
            };

            if events.send(event).is_err() {
                debug!("Probe result for {} dropped, receiver closed", token);
            }
        });
    }

    fn play(&mut self) {
        if let Some(loaded) = self.loaded.as_mut() {
            if loaded.ended {
                loaded.offset = 0.0;
                loaded.ended = false;
            }
            if loaded.started.is_none() {
                loaded.started = Some(Instant::now());
            }
        }
    }

    fn pause(&mut self) {
        if let Some(loaded) = self.loaded.as_mut() {
            if let Some(started) = loaded.started.take() {
                loaded.offset += started.elapsed().as_secs_f64();
            }
        }
    }

    fn current_time(&self) -> f64 {
        self.loaded
            .as_ref()
            .map_or(0.0, |loaded| loaded.position(Instant::now()))
    }

    fn unload(&mut self) {
        self.loaded = None;
        if let Ok(mut durations) = self.durations.lock() {
            durations.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::tests::wav_bytes;
    use bytes::Bytes;
    use std::time::Duration;
    use tape_playback::{ByteSource, SourceTracker};

    fn wav_source(tracker: &SourceTracker, seconds_at_1khz: u32) -> SourceHandle {
        tracker.register("clip.wav", ByteSource::Memory(wav_bytes(1000, seconds_at_1khz)))
    }

    #[tokio::test]
    async fn test_load_reports_duration() {
        let tracker = SourceTracker::new();
        let (mut device, mut events) = ClockDevice::new();
        let token = LoadToken::INITIAL.next();

        device.load(token, &wav_source(&tracker, 3000));

        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            DeviceEvent::DurationKnown {
                token,
                duration: 3.0
            }
        );
    }

    #[tokio::test]
    async fn test_load_failure_reported() {
        let tracker = SourceTracker::new();
        let (mut device, mut events) = ClockDevice::new();
        let token = LoadToken::INITIAL.next();
        let source = tracker.register("junk.mp3", ByteSource::Memory(Bytes::from_static(b"junk")));

        device.load(token, &source);

        let event = events.recv().await.unwrap();
        assert!(matches!(event, DeviceEvent::LoadFailed { token: t, .. } if t == token));
    }

    #[tokio::test]
    async fn test_tick_while_paused_is_silent() {
        let tracker = SourceTracker::new();
        let (mut device, mut events) = ClockDevice::new();
        let token = LoadToken::INITIAL.next();
        device.load(token, &wav_source(&tracker, 3000));
        events.recv().await.unwrap();

        device.tick();
        assert!(events.try_recv().is_err());
        assert_eq!(device.current_time(), 0.0);
    }

    #[tokio::test]
    async fn test_tick_while_playing_reports_position() {
        let tracker = SourceTracker::new();
        let (mut device, mut events) = ClockDevice::new();
        let token = LoadToken::INITIAL.next();
        device.load(token, &wav_source(&tracker, 60_000));
        events.recv().await.unwrap();

        device.play();
        tokio::time::sleep(Duration::from_millis(20)).await;
        device.tick();

        match events.try_recv().unwrap() {
            DeviceEvent::TimeUpdate { token: t, elapsed } => {
                assert_eq!(t, token);
                assert!(elapsed > 0.0 && elapsed < 60.0);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reaching_duration_emits_ended() {
        let tracker = SourceTracker::new();
        let (mut device, mut events) = ClockDevice::new();
        let token = LoadToken::INITIAL.next();
        device.load(token, &wav_source(&tracker, 10));
        events.recv().await.unwrap();

        device.play();
        tokio::time::sleep(Duration::from_millis(30)).await;
        device.tick();

        assert_eq!(
            events.try_recv().unwrap(),
            DeviceEvent::TimeUpdate {
                token,
                elapsed: 0.01
            }
        );
        assert_eq!(events.try_recv().unwrap(), DeviceEvent::Ended { token });

        // Stopped at the end until played again
        device.tick();
        assert!(events.try_recv().is_err());
        assert_eq!(device.current_time(), 0.01);

        device.play();
        assert!(device.current_time() < 0.01);
    }

    #[tokio::test]
    async fn test_pause_freezes_position() {
        let tracker = SourceTracker::new();
        let (mut device, mut events) = ClockDevice::new();
        device.load(LoadToken::INITIAL.next(), &wav_source(&tracker, 60_000));
        events.recv().await.unwrap();

        device.play();
        tokio::time::sleep(Duration::from_millis(10)).await;
        device.pause();
        let frozen = device.current_time();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(frozen > 0.0);
        assert_eq!(device.current_time(), frozen);
    }

    #[tokio::test]
    async fn test_unload_resets() {
        let tracker = SourceTracker::new();
        let (mut device, mut events) = ClockDevice::new();
        device.load(LoadToken::INITIAL.next(), &wav_source(&tracker, 1000));
        events.recv().await.unwrap();
        device.play();

        device.unload();
        device.tick();

        assert!(events.try_recv().is_err());
        assert_eq!(device.current_time(), 0.0);
    }
}
