//! Analysis service client
//!
//! Uploads a video as `multipart/form-data` (single field `file`) to
//! `{server}/analyze_video` and decodes the JSON response.
//!
//! - One bounded total timeout per request, reported as [`Error::Timeout`]
//! - No retries: a failed attempt is final
//! - rustls TLS, gzip responses

use std::path::Path;
use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::event::AnalysisResponse;

/// Endpoint path appended to the server URL
pub const ANALYZE_PATH: &str = "analyze_video";

/// HTTP client for the analysis service
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl AnalysisClient {
    /// Client for `server` with default timeouts.
    pub fn new(server: &str) -> Result<Self> {
        let defaults = Config::default();
        Self::with_timeouts(server, defaults.timeout(), defaults.connect_timeout())
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeouts(&config.server, config.timeout(), config.connect_timeout())
    }

    pub fn with_timeouts(server: &str, timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let endpoint = endpoint_for(server)?;

        let client = Client::builder()
            .use_rustls_tls()
            .gzip(true)
            .user_agent(concat!("safeview/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .map_err(Error::Transport)?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Upload a video file and decode the analysis.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn analyze_file(&self, path: &Path) -> Result<AnalysisResponse> {
        let body = self.upload_file(path).await?;
        Ok(AnalysisResponse::from_json(&body)?)
    }

    /// Upload in-memory video bytes and decode the analysis.
    pub async fn analyze_bytes(&self, file_name: &str, bytes: Vec<u8>) -> Result<AnalysisResponse> {
        let body = self.upload(file_name, bytes).await?;
        Ok(AnalysisResponse::from_json(&body)?)
    }

    /// Upload a video file, returning the raw response body.
    pub async fn upload_file(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path).await.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "video".to_string(), |n| n.to_string_lossy().into_owned());
        self.upload(&file_name, bytes).await
    }

    /// POST the multipart body and return the raw response text.
    ///
    /// Non-2xx statuses are errors; the body is not inspected in that case.
    #[instrument(skip(self, bytes), fields(endpoint = %self.endpoint, size = bytes.len()))]
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(video_mime(file_name))
            .map_err(Error::Transport)?;
        let form = Form::new().part("file", part);

        debug!("uploading video for analysis");
        let start = Instant::now();

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status { status });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::from_reqwest(e, self.timeout))?;

        info!(
            %status,
            bytes = body.len(),
            elapsed = ?start.elapsed(),
            "analysis response received"
        );
        Ok(body)
    }
}

/// Resolve `{server}/analyze_video`, keeping any path prefix on `server`.
fn endpoint_for(server: &str) -> Result<Url> {
    let url_err = |source| Error::Url {
        url: server.to_string(),
        source,
    };
    let mut base = Url::parse(server.trim()).map_err(url_err)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(ANALYZE_PATH).map_err(url_err)
}

/// Content type from the file extension; `application/octet-stream` if unknown.
fn video_mime(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("mp4" | "m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("ogv") => "video/ogg",
        _ => "application/octet-stream",
    }
}
