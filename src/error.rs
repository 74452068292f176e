//! Error types for the analysis client and configuration loading.
//!
//! Malformed individual events are not errors: they are dropped while the
//! run is loaded (see [`crate::event::store`]).

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by `safeview`
#[derive(Error, Debug)]
pub enum Error {
    /// Network unreachable, TLS failure, connection reset, ...
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("analysis service returned HTTP {status}")]
    Status { status: reqwest::StatusCode },

    /// The request did not complete within the configured bound
    #[error("analysis request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Response body was not a JSON document
    #[error("invalid analysis response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid server URL {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Error {
    /// Classify a `reqwest` failure, splitting timeouts out as their own kind.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if let Some(status) = err.status() {
            Self::Status { status }
        } else {
            Self::Transport(err)
        }
    }

    /// True for failures of the upload itself (as opposed to local problems).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Status { .. } | Self::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_bound() {
        let err = Error::Timeout(Duration::from_secs(120));
        assert_eq!(err.to_string(), "analysis request timed out after 120s");
        assert!(err.is_transport());
    }

    #[test]
    fn test_status_message() {
        let err = Error::Status {
            status: reqwest::StatusCode::BAD_GATEWAY,
        };
        assert!(err.to_string().contains("502"));
        assert!(err.is_transport());
    }

    #[test]
    fn test_decode_is_not_transport() {
        let err: Error = serde_json::from_str::<serde_json::Value>("not json")
            .unwrap_err()
            .into();
        assert!(!err.is_transport());
    }
}
