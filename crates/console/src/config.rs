use std::path::PathBuf;
use std::time::Duration;

/// Default push-channel endpoint.
const DEFAULT_WS_URL: &str = "ws://127.0.0.1:3000/api/v1/ws";

/// Default alert history file.
const DEFAULT_HISTORY_PATH: &str = "rigel-alerts.json";

/// Default number of alerts kept in the history file.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Default local tick interval in fallback mode.
const DEFAULT_TICK_INTERVAL_MS: u64 = 2000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a valid {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Console configuration loaded from environment variables.
///
/// | Env Var                  | Default                          |
/// |--------------------------|----------------------------------|
/// | `RIGEL_WS_URL`           | `ws://127.0.0.1:3000/api/v1/ws`  |
/// | `RIGEL_HISTORY_PATH`     | `rigel-alerts.json`              |
/// | `RIGEL_HISTORY_CAPACITY` | `50`                             |
/// | `TICK_INTERVAL_MS`       | `2000`                           |
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub ws_url: String,
    pub history_path: PathBuf,
    pub history_capacity: usize,
    /// Local tick interval when running in fallback mode.
    pub tick_interval: Duration,
}

impl ConsoleConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let ws_url = std::env::var("RIGEL_WS_URL").unwrap_or_else(|_| DEFAULT_WS_URL.into());
        let history_path = std::env::var("RIGEL_HISTORY_PATH")
            .unwrap_or_else(|_| DEFAULT_HISTORY_PATH.into())
            .into();

        let history_capacity = positive("RIGEL_HISTORY_CAPACITY", DEFAULT_HISTORY_CAPACITY as u64)?;
        let tick_interval_ms = positive("TICK_INTERVAL_MS", DEFAULT_TICK_INTERVAL_MS)?;

        Ok(Self {
            ws_url,
            history_path,
            history_capacity: history_capacity as usize,
            tick_interval: Duration::from_millis(tick_interval_ms),
        })
    }
}

fn positive(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw,
            expected: "positive integer",
        }),
    }
}
