use std::path::Path;

use anyhow::{Context, Result};

use safeview::{AnalysisClient, AnalysisResponse, AnalysisRun, Config, Status};

use crate::PlaybackArgs;

pub async fn cmd_analyze(
    video: &Path,
    config: &Config,
    output: Option<&Path>,
    playback: Option<&PlaybackArgs>,
) -> Result<()> {
    let client = AnalysisClient::from_config(config)?;

    eprintln!("🎬 Analyzing: {}", video.display());
    eprintln!("   Server: {}", client.endpoint());
    eprintln!("   Timeout: {}s", client.timeout().as_secs());
    println!("{}", Status::Analyzing);

    let start = std::time::Instant::now();
    let decoded = match client.upload_file(video).await {
        Ok(body) => AnalysisResponse::from_json(&body)
            .map(|response| (body, response))
            .map_err(safeview::Error::from),
        Err(err) => Err(err),
    };
    let (body, response) = match decoded {
        Ok(decoded) => decoded,
        Err(err) => {
            println!("{}", Status::Failed(err.to_string()));
            return Err(err).context("analysis failed");
        }
    };
    eprintln!("   Completed in {:.1}s", start.elapsed().as_secs_f64());

    if let Some(path) = output {
        std::fs::write(path, &body)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("📄 Saved to: {}", path.display());
    }

    let run = AnalysisRun::from_response(response);
    println!("{}", Status::for_run(&run));
    super::summary::print_summary(&run);

    if let Some(args) = playback {
        println!();
        super::replay::play(run, config, args).await?;
    }

    Ok(())
}
