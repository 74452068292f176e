//! `safeview` CLI - analyze surgical video and replay live safety alerts

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use safeview::{Config, Seek};

#[derive(Parser)]
#[command(name = "safeview")]
#[command(about = "Live safety overlays for analyzed surgical video")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (default: ~/.config/safeview/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a video to the analysis service and show the result
    Analyze {
        /// Video file to analyze
        video: PathBuf,

        /// Analysis service base URL (overrides config and SAFEVIEW_SERVER)
        #[arg(long)]
        server: Option<String>,

        /// Request timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Save the raw analysis response to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replay the alerts against a simulated clock once analysis completes
        #[arg(long)]
        play: bool,

        #[command(flatten)]
        playback: PlaybackArgs,
    },

    /// Replay a saved analysis response against a simulated playback clock
    Replay {
        /// Analysis response JSON file
        response: PathBuf,

        #[command(flatten)]
        playback: PlaybackArgs,
    },

    /// Print the run summary of a saved analysis response
    Summary {
        /// Analysis response JSON file
        response: PathBuf,

        /// Print the report block as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Simulated playback options
#[derive(Args, Debug, Clone)]
pub struct PlaybackArgs {
    /// Start position in seconds
    #[arg(long, default_value = "0")]
    from: f64,

    /// End position in seconds (default: report duration, else last event + 1s)
    #[arg(long)]
    to: Option<f64>,

    /// Seconds between time updates
    #[arg(long, default_value = "0.25")]
    step: f64,

    /// Seek when playback reaches AT, to position TO (repeatable)
    #[arg(long, value_name = "AT:TO")]
    seek: Vec<Seek>,

    /// Overlay surface width in pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Overlay surface height in pixels
    #[arg(long, default_value = "720")]
    height: u32,

    /// Active-event window in seconds (overrides config)
    #[arg(long, value_name = "SECS")]
    tolerance: Option<f64>,

    /// Print overlay draw commands for every tick
    #[arg(long)]
    draw: bool,

    /// Pace time updates in real time instead of as fast as possible
    #[arg(long)]
    realtime: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            video,
            server,
            timeout,
            output,
            play,
            playback,
        } => {
            if let Some(server) = server {
                config.server = server;
            }
            if let Some(secs) = timeout {
                config.timeout_secs = secs;
            }
            let playback = play.then_some(&playback);
            cmd::analyze::cmd_analyze(&video, &config, output.as_deref(), playback).await?;
        }
        Commands::Replay { response, playback } => {
            cmd::replay::cmd_replay(&response, &config, &playback).await?;
        }
        Commands::Summary { response, json } => {
            cmd::summary::cmd_summary(&response, json)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
