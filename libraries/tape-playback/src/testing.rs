//! Fake playback device for tests
//!
//! Records every command it receives and builds device events tagged with
//! the token of the latest load, so tests can drive the controller
//! deterministically.

use crate::device::{DeviceEvent, LoadToken, PlaybackDevice};
use crate::source::{SourceHandle, SourceId};

/// Command received by [`RecordingDevice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    Load { token: LoadToken, source: SourceId },
    Play,
    Pause,
    Unload,
}

/// Device that records commands instead of playing audio
#[derive(Debug, Default)]
pub struct RecordingDevice {
    commands: Vec<DeviceCommand>,
    loaded: Option<(LoadToken, SourceHandle)>,
    playing: bool,
    position: f64,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands in the order they were issued
    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Token of the source currently loaded
    pub fn loaded_token(&self) -> Option<LoadToken> {
        self.loaded.as_ref().map(|(token, _)| *token)
    }

    /// Source currently loaded
    pub fn loaded_source(&self) -> Option<&SourceHandle> {
        self.loaded.as_ref().map(|(_, source)| source)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Set what `current_time` reports
    pub fn set_position(&mut self, seconds: f64) {
        self.position = seconds;
    }

    // ===== Event builders =====

    pub fn time_update(&self, elapsed: f64) -> DeviceEvent {
        DeviceEvent::TimeUpdate {
            token: self.token(),
            elapsed,
        }
    }

    pub fn duration_known(&self, duration: f64) -> DeviceEvent {
        DeviceEvent::DurationKnown {
            token: self.token(),
            duration,
        }
    }

    pub fn load_failed(&self, message: impl Into<String>) -> DeviceEvent {
        DeviceEvent::LoadFailed {
            token: self.token(),
            message: message.into(),
        }
    }

    pub fn ended(&self) -> DeviceEvent {
        DeviceEvent::Ended {
            token: self.token(),
        }
    }

    fn token(&self) -> LoadToken {
        self.loaded_token().unwrap_or(LoadToken::INITIAL)
    }
}

impl PlaybackDevice for RecordingDevice {
    fn load(&mut self, token: LoadToken, source: &SourceHandle) {
        self.commands.push(DeviceCommand::Load {
            token,
            source: source.id(),
        });
        self.loaded = Some((token, source.clone()));
        self.position = 0.0;
    }

    fn play(&mut self) {
        self.commands.push(DeviceCommand::Play);
        self.playing = true;
    }

    fn pause(&mut self) {
        self.commands.push(DeviceCommand::Pause);
        self.playing = false;
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn unload(&mut self) {
        self.commands.push(DeviceCommand::Unload);
        self.loaded = None;
        self.playing = false;
        self.position = 0.0;
    }
}
