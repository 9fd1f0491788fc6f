/// CLI configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tape_playback::PlaybackConfig;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "tape.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TapeConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub device: DeviceSettings,

    #[serde(default)]
    pub logging: LogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceSettings {
    /// How often the clock device reports its position while playing
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogSettings {
    /// Default `EnvFilter` directives, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl TapeConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist. Without one, `tape.toml` in the working
    /// directory is used when present. `TAPE_`-prefixed variables override
    /// file values, with `__` between nested keys
    /// (`TAPE_PLAYBACK__AUTO_ADVANCE=false`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("TAPE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.device.tick_interval_ms == 0 {
            return Err(CliError::Config(
                "device.tick_interval_ms must be greater than zero".to_string(),
            ));
        }

        if self.playback.unknown_artist.trim().is_empty() {
            return Err(CliError::Config(
                "playback.unknown_artist must not be empty".to_string(),
            ));
        }

        if let Err(e) = tracing_subscriber::EnvFilter::try_new(&self.logging.filter) {
            return Err(CliError::Config(format!(
                "Invalid logging.filter '{}': {}",
                self.logging.filter, e
            )));
        }

        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.device.tick_interval_ms)
    }
}

// Default values
fn default_tick_interval_ms() -> u64 {
    250
}

fn default_log_filter() -> String {
    "tape_cli=info,tape_playback=info".to_string()
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}
