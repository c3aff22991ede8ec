use crate::poll::StatusLabels;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

pub const CONFIG_PATH_VAR: &str = "HARBORFRAME_CONFIG";
pub const API_BASE_VAR: &str = "HARBORFRAME_API_BASE";
pub const POLL_SECS_VAR: &str = "HARBORFRAME_POLL_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read { path: String, source: std::io::Error },

    #[error("invalid config {path}: {source}")]
    Invalid { path: String, source: serde_yaml::Error },

    #[error("poll interval must be at least 1 second, got {0}")]
    PollInterval(u64),

    #[error("{var} is not a valid value: {value}")]
    Env { var: &'static str, value: String },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub api_base: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: Option<u64>,
    pub map: MapConf,
    pub labels: StatusLabels,
    pub http: HttpConf,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MapConf {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HttpConf {
    pub bind: String, // ex: "127.0.0.1:8090"
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000".into(),
            poll_interval_secs: 3,
            request_timeout_secs: None,
            map: MapConf::default(),
            labels: StatusLabels::default(),
            http: HttpConf::default(),
        }
    }
}

// Duluth canal / Aerial Lift Bridge
impl Default for MapConf {
    fn default() -> Self {
        Self { center_lat: 46.777, center_lon: -92.095, zoom: 14 }
    }
}

impl Default for HttpConf {
    fn default() -> Self {
        Self { bind: "127.0.0.1:8090".into() }
    }
}

impl DisplayConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::PollInterval(self.poll_interval_secs));
        }
        Ok(())
    }

    /// Apply `HARBORFRAME_API_BASE` / `HARBORFRAME_POLL_SECS` on top of the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup(API_BASE_VAR).filter(|v| !v.trim().is_empty()) {
            self.api_base = base.trim().to_string();
        }
        if let Some(raw) = lookup(POLL_SECS_VAR) {
            self.poll_interval_secs = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Env { var: POLL_SECS_VAR, value: raw.clone() })?;
        }
        Ok(())
    }
}

/// Read a config file. A missing or empty file yields the defaults.
pub async fn load_config_from(path: &Path) -> Result<DisplayConfig, ConfigError> {
    let shown = path.display().to_string();
    if !path.exists() {
        info!(path = %shown, "no config file, using defaults");
        return Ok(DisplayConfig::default());
    }
    let txt = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read { path: shown.clone(), source })?;
    if txt.trim().is_empty() {
        warn!(path = %shown, "config file is empty, using defaults");
        return Ok(DisplayConfig::default());
    }
    let cfg: DisplayConfig =
        serde_yaml::from_str(&txt).map_err(|source| ConfigError::Invalid { path: shown, source })?;
    Ok(cfg)
}

/// Resolve the config path from the environment, load it, apply env
/// overrides and validate.
pub async fn load_config() -> Result<DisplayConfig, ConfigError> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "harborframe.yaml".into());
    let mut cfg = load_config_from(Path::new(&path)).await?;
    cfg.apply_env_overrides(|var| std::env::var(var).ok())?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.yaml")).await.unwrap();
        assert_eq!(cfg, DisplayConfig::default());
        assert_eq!(cfg.poll_interval(), Duration::from_secs(3));
        assert_eq!(cfg.request_timeout(), None);
    }

    #[tokio::test]
    async fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_base: http://feed.local:9000\nlabels:\n  live: Live\nmap:\n  zoom: 12").unwrap();

        let cfg = load_config_from(file.path()).await.unwrap();
        assert_eq!(cfg.api_base, "http://feed.local:9000");
        assert_eq!(cfg.labels.live, "Live");
        assert_eq!(cfg.labels.offline, "Offline (dev)");
        assert_eq!(cfg.map.zoom, 12);
        assert_eq!(cfg.map.center_lat, 46.777);
        assert_eq!(cfg.poll_interval_secs, 3);
    }

    #[tokio::test]
    async fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "poll_interval_secs: [not, a, number]").unwrap();
        let err = load_config_from(file.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[tokio::test]
    async fn test_empty_file_gives_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let cfg = load_config_from(file.path()).await.unwrap();
        assert_eq!(cfg, DisplayConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut cfg = DisplayConfig::default();
        cfg.apply_env_overrides(|var| match var {
            API_BASE_VAR => Some(" http://10.0.0.5:8000 ".into()),
            POLL_SECS_VAR => Some("5".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.api_base, "http://10.0.0.5:8000");
        assert_eq!(cfg.poll_interval_secs, 5);

        let err = cfg
            .apply_env_overrides(|var| (var == POLL_SECS_VAR).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: POLL_SECS_VAR, .. }));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let cfg = DisplayConfig { poll_interval_secs: 0, ..DisplayConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::PollInterval(0))));
    }
}
