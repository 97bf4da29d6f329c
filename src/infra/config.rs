use std::time::Duration;

use serde::Deserialize;

use crate::core::error::BridgeError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8085";
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 3;
pub const DEFAULT_FETCH_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub fetch_attempts: u32,
    pub fetch_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
            fetch_delay: Duration::from_millis(DEFAULT_FETCH_DELAY_MS),
        }
    }
}

/// Optional file layer, loaded from `BRIDGE_CONFIG`:
///
/// ```toml
/// [upstream]
/// base_url = "http://tools.internal:8085"
/// fetch_attempts = 5
/// fetch_delay_ms = 250
/// ```
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    upstream: UpstreamSection,
}

#[derive(Debug, Default, Deserialize)]
struct UpstreamSection {
    base_url: Option<String>,
    fetch_attempts: Option<u32>,
    fetch_delay_ms: Option<u64>,
}

impl Config {
    /// Defaults, then the TOML file named by `BRIDGE_CONFIG` (if any), then
    /// `BRIDGE_BASE_URL` / `BRIDGE_FETCH_ATTEMPTS` / `BRIDGE_FETCH_DELAY_MS`.
    pub fn from_env() -> Result<Self, BridgeError> {
        let mut cfg = match std::env::var("BRIDGE_CONFIG") {
            Ok(path) if !path.trim().is_empty() => {
                let raw = std::fs::read_to_string(&path)
                    .map_err(|e| BridgeError::Config(format!("reading {path}: {e}")))?;
                Self::from_toml_str(&raw)?
            }
            _ => Self::default(),
        };

        if let Ok(base) = std::env::var("BRIDGE_BASE_URL") {
            if !base.trim().is_empty() {
                cfg.base_url = base.trim().to_string();
            }
        }
        if let Some(n) = std::env::var("BRIDGE_FETCH_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
        {
            cfg.fetch_attempts = n.max(1);
        }
        if let Some(ms) = std::env::var("BRIDGE_FETCH_DELAY_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            cfg.fetch_delay = Duration::from_millis(ms);
        }
        Ok(cfg)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, BridgeError> {
        let file: FileConfig =
            toml::from_str(raw).map_err(|e| BridgeError::Config(e.to_string()))?;
        let defaults = Self::default();
        Ok(Self {
            base_url: file
                .upstream
                .base_url
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.base_url),
            fetch_attempts: file
                .upstream
                .fetch_attempts
                .map(|n| n.max(1))
                .unwrap_or(defaults.fetch_attempts),
            fetch_delay: file
                .upstream
                .fetch_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.fetch_delay),
        })
    }
}
