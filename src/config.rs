//! Configuration module

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use validator::Validate;

use crate::constants::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TICK_INTERVAL_SECS};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone, Validate)]
pub struct Config {
    /// Bind address
    pub host: IpAddr,

    /// Server port
    #[validate(range(min = 1))]
    pub port: u16,

    /// Seconds between two simulator ticks
    #[validate(range(min = 1, max = 3600))]
    pub tick_interval_secs: u64,

    /// Fixed seed for the metric generator, entropy when unset
    pub rng_seed: Option<u64>,

    /// Log output format
    pub log_format: LogFormat,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.parse().unwrap_or(IpAddr::from([0, 0, 0, 0])),
            port: DEFAULT_PORT,
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            rng_seed: None,
            log_format: LogFormat::Pretty,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(defaults.host),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            tick_interval_secs: env::var("TICK_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.tick_interval_secs),

            rng_seed: env::var("RNG_SEED")
                .ok()
                .and_then(|s| s.parse().ok()),

            log_format: env::var("LOG_FORMAT")
                .map(|s| if s.eq_ignore_ascii_case("json") { LogFormat::Json } else { LogFormat::Pretty })
                .unwrap_or(defaults.log_format),

            environment: env::var("ENVIRONMENT")
                .unwrap_or(defaults.environment),
        }
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
