//! Configuration loaded from `~/.config/safeview/config.toml`.
//!
//! Precedence, lowest to highest: built-in defaults, the config file,
//! `SAFEVIEW_*` environment variables, command-line flags (applied by the
//! binary).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::overlay::OverlayStyle;
use crate::sync::DEFAULT_TOLERANCE;

/// Default analysis service address
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

/// Environment variable overriding [`Config::server`]
pub const SERVER_ENV: &str = "SAFEVIEW_SERVER";
/// Environment variable overriding [`Config::timeout_secs`]
pub const TIMEOUT_ENV: &str = "SAFEVIEW_TIMEOUT_SECS";

/// Synchronizer settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Active-event window, seconds
    pub tolerance_secs: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tolerance_secs: DEFAULT_TOLERANCE,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the analysis service
    pub server: String,
    /// Bound on the whole upload + analysis request
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub sync: SyncConfig,
    pub overlay: OverlayStyle,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            timeout_secs: 120,
            connect_timeout_secs: 10,
            sync: SyncConfig::default(),
            overlay: OverlayStyle::default(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// With `explicit = Some(path)` the file must exist and parse. Otherwise
    /// the default location is used if present and defaults apply if not.
    /// Environment overrides are applied in both cases.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = default_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    debug!(path = %path.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply `SAFEVIEW_*` overrides read through `lookup`.
    ///
    /// Unparsable values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(server) = lookup(SERVER_ENV).filter(|s| !s.trim().is_empty()) {
            self.server = server.trim().to_string();
        }
        if let Some(secs) = lookup(TIMEOUT_ENV).and_then(|s| s.trim().parse().ok()) {
            self.timeout_secs = secs;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }
}

/// Return the path to the default config file.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("safeview")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::Color;

    #[test]
    fn parse_empty_config() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server, DEFAULT_SERVER);
        assert_eq!(config.sync.tolerance_secs, 0.3);
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r##"
server = "https://analysis.example.org/api/"
timeout_secs = 300

[sync]
tolerance_secs = 0.5

[overlay]
stroke_color = "#FF00FF"
line_height = 28.0
procedure_label = "Cholecystectomy"
"##;
        let config = Config::from_toml(toml_str).unwrap();
        assert_eq!(config.server, "https://analysis.example.org/api/");
        assert_eq!(config.timeout(), Duration::from_secs(300));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.sync.tolerance_secs, 0.5);
        assert_eq!(config.overlay.stroke_color, Color::rgb(0xFF, 0x00, 0xFF));
        assert_eq!(config.overlay.line_height, 28.0);
        assert_eq!(config.overlay.font_size, 24);
    }

    #[test]
    fn parse_rejects_bad_color() {
        assert!(Config::from_toml("[overlay]\nstroke_color = \"blue\"").is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            SERVER_ENV => Some(" http://10.0.0.5:9000 ".to_string()),
            TIMEOUT_ENV => Some("15".to_string()),
            _ => None,
        });
        assert_eq!(config.server, "http://10.0.0.5:9000");
        assert_eq!(config.timeout_secs, 15);
    }

    #[test]
    fn env_ignores_garbage() {
        let mut config = Config::default();
        config.apply_env(|key| (key == TIMEOUT_ENV).then(|| "soon".to_string()));
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let err = Config::load(Some(Path::new("/nonexistent/safeview.toml"))).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
