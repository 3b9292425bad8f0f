use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use rigel_core::config::{EngineConfig, DEFAULT_LOCATION};

/// Default interval between engine ticks.
const DEFAULT_TICK_INTERVAL_MS: u64 = 2000;

/// Default number of recent alerts included in the `init` snapshot.
const DEFAULT_RECENT_ALERTS_ON_INIT: usize = 10;

/// Invalid value supplied through the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a valid {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Interval between engine ticks (default: 2 s).
    pub tick_interval: Duration,
    /// Alerts included in each subscriber's `init` snapshot (default: `10`).
    pub recent_alerts_on_init: usize,
    /// Location label stamped on readings (default: `hab_A`).
    pub location: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `TICK_INTERVAL_MS`      | `2000`                  |
    /// | `RECENT_ALERTS_ON_INIT` | `10`                    |
    /// | `HABITAT_LOCATION`      | `hab_A`                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000, "u16")?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30, "u64")?;

        let tick_interval_ms: u64 =
            env_or("TICK_INTERVAL_MS", DEFAULT_TICK_INTERVAL_MS, "positive u64")?;
        if tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "TICK_INTERVAL_MS",
                value: "0".into(),
                expected: "positive u64",
            });
        }

        let recent_alerts_on_init: usize =
            env_or("RECENT_ALERTS_ON_INIT", DEFAULT_RECENT_ALERTS_ON_INIT, "usize")?;

        let location =
            std::env::var("HABITAT_LOCATION").unwrap_or_else(|_| DEFAULT_LOCATION.into());

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            tick_interval: Duration::from_millis(tick_interval_ms),
            recent_alerts_on_init,
            location,
        })
    }

    /// Parse the bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|_| ConfigError::Invalid {
            key: "HOST",
            value: self.host.clone(),
            expected: "IP address",
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Engine configuration for this deployment.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default().with_location(self.location.clone())
    }
}

/// Parse `key` from the environment, falling back to `default` when unset.
fn env_or<T: FromStr>(
    key: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value: raw,
            expected,
        }),
        Err(_) => Ok(default),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
