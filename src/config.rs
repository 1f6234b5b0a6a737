//! Configuration for the control core

use crate::error::{HomeError, Result};
use serde::{Deserialize, Serialize};
use std::{env, time::Duration};
use url::Url;

fn default_history_capacity() -> usize {
    50
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Crestron processor base URL (e.g., "http://192.168.1.50")
    pub controller_url: Url,

    /// Interval between reconciliation polls
    #[serde(with = "duration_secs")]
    pub poll_interval: Duration,

    /// Per-request timeout enforced by the remote-setter collaborator
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,

    /// Maximum number of executed commands retained for undo
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            controller_url: Url::parse("http://localhost").unwrap(),
            poll_interval: Duration::from_secs(3),
            request_timeout: Duration::from_secs(10),
            history_capacity: default_history_capacity(),
        }
    }
}

impl CoreConfig {
    /// Create configuration from environment variables
    ///
    /// Reads `CRESTRON_URL`, `CRESTRON_POLL_INTERVAL` (seconds),
    /// `CRESTRON_REQUEST_TIMEOUT` (seconds) and `CRESTRON_HISTORY_CAPACITY`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var("CRESTRON_URL") {
            config.controller_url = Url::parse(&url)
                .map_err(|e| HomeError::config(format!("Invalid CRESTRON_URL: {e}")))?;
        }

        if let Ok(secs) = env::var("CRESTRON_POLL_INTERVAL") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| HomeError::config("CRESTRON_POLL_INTERVAL must be a number"))?;
            config.poll_interval = Duration::from_secs(secs);
        }

        if let Ok(secs) = env::var("CRESTRON_REQUEST_TIMEOUT") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| HomeError::config("CRESTRON_REQUEST_TIMEOUT must be a number"))?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Ok(cap) = env::var("CRESTRON_HISTORY_CAPACITY") {
            config.history_capacity = cap
                .parse()
                .map_err(|_| HomeError::config("CRESTRON_HISTORY_CAPACITY must be a number"))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match self.controller_url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(HomeError::config(format!(
                    "Unsupported controller URL scheme: {scheme}"
                )))
            }
        }

        if self.poll_interval.is_zero() {
            return Err(HomeError::config("Poll interval must be non-zero"));
        }

        if self.request_timeout.is_zero() {
            return Err(HomeError::config("Request timeout must be non-zero"));
        }

        if self.history_capacity == 0 {
            return Err(HomeError::config("History capacity must be non-zero"));
        }

        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
