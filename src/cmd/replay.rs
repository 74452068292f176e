use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use safeview::{
    AnalysisRun, ClockEvent, Config, OverlayRenderer, PlaybackSession, ScriptedClock, Surface,
    Synchronizer,
};

use crate::PlaybackArgs;

pub async fn cmd_replay(response: &Path, config: &Config, args: &PlaybackArgs) -> Result<()> {
    let run = super::load_run(response)?;
    eprintln!("🎬 Replaying: {}", response.display());
    play(run, config, args).await
}

/// Drive a session over `run` with a scripted clock, printing alerts as they fire.
pub async fn play(run: AnalysisRun, config: &Config, args: &PlaybackArgs) -> Result<()> {
    let tolerance = args.tolerance.unwrap_or(config.sync.tolerance_secs);
    let end = args.to.unwrap_or_else(|| default_end(&run));

    let clock = ScriptedClock::new(args.from, end, args.step).with_seeks(args.seek.clone());
    let mut ticker = if args.realtime {
        Some(tokio::time::interval(tick_period(clock.step())?))
    } else {
        None
    };

    let mut session = PlaybackSession::new(
        Synchronizer::new(tolerance),
        OverlayRenderer::new(config.overlay.clone()),
        Surface::new(args.width, args.height),
    );
    session.load_run(run);
    println!("{}", session.status());
    debug!(from = args.from, end, step = clock.step(), "replay started");

    for event in clock {
        if let (Some(ticker), ClockEvent::TimeUpdate(_)) = (ticker.as_mut(), event) {
            ticker.tick().await;
        }
        match event {
            ClockEvent::Seeked(t) => println!("⏩ Seek to {t:.2}s"),
            ClockEvent::Ended => println!("⏹ Playback ended"),
            _ => {}
        }

        let Some(frame) = session.handle(event) else {
            continue;
        };
        for alert in &frame.fired {
            println!("🚨 {alert}");
        }
        if args.draw {
            println!("@ {:.2}s", frame.position);
            for command in &frame.draw {
                println!("   {command}");
            }
        }
    }

    println!(
        "\n🚨 Live Alerts ({} fired, newest first)",
        session.log().len()
    );
    for entry in session.log().newest_first() {
        println!("   {entry}");
    }

    Ok(())
}

/// Wall-clock interval between time updates for `--realtime`.
fn tick_period(step: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(step)
        .ok()
        .filter(|period| !period.is_zero())
        .with_context(|| format!("--step {step} is out of range for --realtime"))
}

/// Report duration when known, otherwise one second past the last event.
fn default_end(run: &AnalysisRun) -> f64 {
    run.summary()
        .map(|s| s.duration_sec)
        .filter(|d| d.is_finite() && *d > 0.0)
        .or_else(|| run.events().last_time().map(|t| t + 1.0))
        .unwrap_or(0.0)
}
