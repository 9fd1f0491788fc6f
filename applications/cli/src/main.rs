/// Tape Player - headless playlist player
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tape_playback::format_time;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod device;
mod error;
mod probe;
mod session;

use config::TapeConfig;

#[derive(Parser)]
#[command(name = "tape")]
#[command(about = "Tape Player headless playlist player", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./tape.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session, optionally with an initial playlist
    Play {
        /// Audio files to add before the session starts
        files: Vec<PathBuf>,
    },
    /// Print a number of seconds as M:SS
    Format {
        /// Seconds to format
        #[arg(allow_negative_numbers = true)]
        seconds: f64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = TapeConfig::load(cli.config.as_deref())?;
    config.validate()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Play { files } => {
            session::run(config, files).await?;
        }
        Commands::Format { seconds } => {
            println!("{}", format_time(seconds));
        }
    }

    Ok(())
}
