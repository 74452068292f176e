pub mod analyze;
pub mod replay;
pub mod summary;

use std::path::Path;

use anyhow::{Context, Result};

use safeview::{AnalysisResponse, AnalysisRun};

/// Load a saved analysis response from disk.
pub fn load_run(path: &Path) -> Result<AnalysisRun> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let response = AnalysisResponse::from_json(&body)
        .with_context(|| format!("{} is not a JSON analysis response", path.display()))?;
    Ok(AnalysisRun::from_response(response))
}
