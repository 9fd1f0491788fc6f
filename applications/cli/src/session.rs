//! Interactive playback session
//!
//! Reads commands from stdin, feeds device signals back into the controller
//! and prints what changed. One task owns the controller, so every input is
//! applied in arrival order.

use crate::config::TapeConfig;
use crate::device::ClockDevice;
use crate::error::{CliError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use tape_playback::{
    IngestItem, NowPlaying, PlaybackController, PlaybackDevice, PlaybackEvent, PlaybackState,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

const HELP: &str = "\
Commands:
  add <path>...   append audio files to the playlist
  play | pause    start or stop playback
  toggle          switch between playing and paused
  next | prev     move through the playlist (wraps around)
  status          show the current track and position
  list            show the playlist
  help            show this message
  quit            leave the session";

const BAR_WIDTH: usize = 24;

/// A line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(Vec<PathBuf>),
    Play,
    Pause,
    Toggle,
    Next,
    Previous,
    Status,
    List,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = CliError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Err(CliError::Command("(empty)".to_string()));
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "add" | "a" => {
                let paths: Vec<PathBuf> = words.map(PathBuf::from).collect();
                if paths.is_empty() {
                    return Err(CliError::Usage("add <path>...".to_string()));
                }
                return Ok(Command::Add(paths));
            }
            "play" => Command::Play,
            "pause" => Command::Pause,
            "toggle" | "t" => Command::Toggle,
            "next" | "n" => Command::Next,
            "prev" | "previous" | "p" => Command::Previous,
            "status" | "s" => Command::Status,
            "list" | "ls" | "l" => Command::List,
            "help" | "h" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(CliError::Command(other.to_string())),
        };

        if words.next().is_some() {
            return Err(CliError::Usage(format!("{} takes no arguments", word)));
        }

        Ok(command)
    }
}

/// Run a session until `quit` or end of input
pub async fn run(config: TapeConfig, files: Vec<PathBuf>) -> Result<()> {
    let (device, mut device_events) = ClockDevice::new();
    let mut controller = PlaybackController::new(device, config.playback.clone());

    let mut ticker = tokio::time::interval(config.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Tape Player - type 'help' for commands");
    if !files.is_empty() {
        print_output(&execute(&mut controller, Command::Add(files)));
    }
    print_events(&mut controller);

    info!(
        "Session started (tick {}ms, auto-advance {})",
        config.device.tick_interval_ms, config.playback.auto_advance
    );

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => print_output(&execute(&mut controller, command)),
                    Err(e) => println!("{} (try 'help')", e),
                }
            }
            Some(event) = device_events.recv() => {
                controller.handle_device_event(event);
            }
            _ = ticker.tick() => {
                controller.device_mut().tick();
            }
        }

        print_events(&mut controller);
    }

    let tracks = controller.playlist().len();
    controller.shutdown();
    info!("Session ended with {} tracks", tracks);
    Ok(())
}

/// Apply a command and return the lines to show
pub fn execute<D: PlaybackDevice>(
    controller: &mut PlaybackController<D>,
    command: Command,
) -> Vec<String> {
    match command {
        Command::Add(paths) => {
            let mut output = Vec::new();
            let mut items = Vec::new();
            for path in paths {
                if path.is_file() {
                    items.push(IngestItem::from_path(&path));
                } else {
                    warn!("Skipping {}: not a file", path.display());
                    output.push(format!("Skipped {}: not a file", path.display()));
                }
            }
            let added = controller.ingest(items);
            output.push(format!("Added {} track(s)", added));
            output
        }
        Command::Play => {
            controller.play();
            Vec::new()
        }
        Command::Pause => {
            controller.pause();
            Vec::new()
        }
        Command::Toggle => {
            controller.toggle_play_pause();
            Vec::new()
        }
        Command::Next => {
            if controller.next().is_none() {
                return vec!["Playlist is empty".to_string()];
            }
            Vec::new()
        }
        Command::Previous => {
            if controller.previous().is_none() {
                return vec!["Playlist is empty".to_string()];
            }
            Vec::new()
        }
        Command::Status => vec![status_line(&controller.now_playing())],
        Command::List => playlist_lines(controller),
        Command::Help => HELP.lines().map(str::to_string).collect(),
        Command::Quit => Vec::new(),
    }
}

/// Render a presentation event, `None` for events shown only on request
pub fn describe(event: &PlaybackEvent) -> Option<String> {
    match event {
        PlaybackEvent::StateChanged { state } => Some(match state {
            PlaybackState::Playing => "▶ Playing".to_string(),
            PlaybackState::Paused => "⏸ Paused".to_string(),
        }),
        PlaybackEvent::TrackChanged { index, title } => {
            Some(format!("Track {}: {}", index + 1, title))
        }
        PlaybackEvent::PlaylistChanged { length } => Some(format!("Playlist: {} track(s)", length)),
        PlaybackEvent::TrackFailed { index, message } => {
            Some(format!("Cannot play track {}: {}", index + 1, message))
        }
        PlaybackEvent::Position { .. } => None,
    }
}

/// One-line summary of the player
pub fn status_line(view: &NowPlaying) -> String {
    let icon = if view.is_playing { "▶" } else { "⏸" };
    let filled = ((view.percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled));

    let heading = if view.artist.is_empty() {
        view.title.clone()
    } else {
        format!("{} - {}", view.title, view.artist)
    };

    format!(
        "{} {}  {} / {}  [{}] {:.0}%",
        icon, heading, view.elapsed, view.duration, bar, view.percent
    )
}

fn playlist_lines<D: PlaybackDevice>(controller: &PlaybackController<D>) -> Vec<String> {
    let playlist = controller.playlist();
    if playlist.is_empty() {
        return vec!["Playlist is empty".to_string()];
    }

    playlist
        .tracks()
        .iter()
        .enumerate()
        .map(|(index, track)| {
            let marker = if playlist.current_index() == Some(index) {
                '>'
            } else {
                ' '
            };
            let failed = if controller.is_track_failed(index) {
                " (failed)"
            } else {
                ""
            };
            format!(
                "{} {:>3}. {} - {}{}",
                marker,
                index + 1,
                track.title(),
                track.artist(),
                failed
            )
        })
        .collect()
}

fn print_events<D: PlaybackDevice>(controller: &mut PlaybackController<D>) {
    for event in controller.drain_events() {
        if let Some(line) = describe(&event) {
            println!("{}", line);
        }
    }
}

fn print_output(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tape_playback::testing::RecordingDevice;
    use tape_playback::PlaybackConfig;

    fn controller_with_files(names: &[&str]) -> (tempfile::TempDir, PlaybackController<RecordingDevice>) {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = names
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                std::fs::write(&path, b"").unwrap();
                path
            })
            .collect();

        let mut controller = PlaybackController::new(RecordingDevice::new(), PlaybackConfig::default());
        execute(&mut controller, Command::Add(paths));
        (dir, controller)
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("play".parse::<Command>().unwrap(), Command::Play);
        assert_eq!("  PAUSE ".parse::<Command>().unwrap(), Command::Pause);
        assert_eq!("toggle".parse::<Command>().unwrap(), Command::Toggle);
        assert_eq!("n".parse::<Command>().unwrap(), Command::Next);
        assert_eq!("prev".parse::<Command>().unwrap(), Command::Previous);
        assert_eq!("status".parse::<Command>().unwrap(), Command::Status);
        assert_eq!("list".parse::<Command>().unwrap(), Command::List);
        assert_eq!("q".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_add() {
        assert_eq!(
            "add a.mp3 /music/b.flac".parse::<Command>().unwrap(),
            Command::Add(vec![PathBuf::from("a.mp3"), PathBuf::from("/music/b.flac")])
        );
        assert!("add".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_command() {
        assert!(matches!("rewind".parse::<Command>(), Err(CliError::Command(_))));
        assert!("".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_argument_errors_are_usage_errors() {
        let err = "play now".parse::<Command>().unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
        assert_eq!(err.to_string(), "Usage: play takes no arguments");

        let err = "add".parse::<Command>().unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
        assert_eq!(err.to_string(), "Usage: add <path>...");
    }

    #[test]
    fn test_add_skips_missing_files() {
        let (dir, mut controller) = controller_with_files(&["a.mp3"]);

        let output = execute(
            &mut controller,
            Command::Add(vec![dir.path().join("b.mp3"), dir.path().to_path_buf()]),
        );

        assert_eq!(controller.playlist().len(), 1);
        assert_eq!(output.len(), 3);
        assert_eq!(output[2], "Added 0 track(s)");
    }

    #[test]
    fn test_add_then_navigate() {
        let (_dir, mut controller) = controller_with_files(&["a.mp3", "b.mp3"]);
        assert_eq!(controller.current_track().unwrap().title(), "a.mp3");

        execute(&mut controller, Command::Previous);
        assert_eq!(controller.current_track().unwrap().title(), "b.mp3");

        execute(&mut controller, Command::Toggle);
        assert!(controller.is_playing());

        execute(&mut controller, Command::Pause);
        assert!(!controller.is_playing());
    }

    #[test]
    fn test_navigation_on_empty_playlist_reports() {
        let mut controller = PlaybackController::with_device(RecordingDevice::new());

        assert_eq!(execute(&mut controller, Command::Next), vec!["Playlist is empty"]);
        assert_eq!(execute(&mut controller, Command::List), vec!["Playlist is empty"]);
    }

    #[test]
    fn test_list_marks_current_and_failed() {
        let (_dir, mut controller) = controller_with_files(&["a.mp3", "b.mp3"]);
        let failed = controller.device().load_failed("bad header");
        controller.handle_device_event(failed);
        execute(&mut controller, Command::Next);

        let lines = execute(&mut controller, Command::List);
        assert_eq!(lines[0], "    1. a.mp3 - Unknown Artist (failed)");
        assert_eq!(lines[1], ">   2. b.mp3 - Unknown Artist");
    }

    #[test]
    fn test_status_line() {
        let view = NowPlaying {
            index: Some(0),
            title: "a.mp3".to_string(),
            artist: "Unknown Artist".to_string(),
            elapsed: "0:30".to_string(),
            duration: "2:00".to_string(),
            percent: 25.0,
            is_playing: true,
        };

        assert_eq!(
            status_line(&view),
            "▶ a.mp3 - Unknown Artist  0:30 / 2:00  [######------------------] 25%"
        );
    }

    #[test]
    fn test_status_line_without_track() {
        let controller = PlaybackController::with_device(RecordingDevice::new());
        let line = status_line(&controller.now_playing());

        assert!(line.starts_with("⏸ No track  0:00 / 0:00"));
        assert!(line.ends_with("0%"));
    }

    #[test]
    fn test_describe_events() {
        assert_eq!(
            describe(&PlaybackEvent::TrackChanged {
                index: 0,
                title: "a.mp3".to_string()
            }),
            Some("Track 1: a.mp3".to_string())
        );
        assert_eq!(
            describe(&PlaybackEvent::StateChanged {
                state: PlaybackState::Paused
            }),
            Some("⏸ Paused".to_string())
        );
        assert_eq!(
            describe(&PlaybackEvent::Position {
                current_time: 1.0,
                duration: None,
                percent: 0.0
            }),
            None
        );
    }
}
