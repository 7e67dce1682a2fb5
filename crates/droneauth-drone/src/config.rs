// ============================================
// File: crates/droneauth-drone/src/config.rs
// ============================================
//! # Drone Configuration
//!
//! ## Creation Reason
//! Identity, ground station address and handshake timing for one drone,
//! loaded from TOML.
//!
//! ## Example Configuration
//! ```toml
//! [drone]
//! id = "DRONE_001"
//! password = "secret_001"
//!
//! [network]
//! bind_addr = "0.0.0.0:0"
//! ground_station = "10.0.0.1:5000"
//!
//! [timing]
//! start_delay_ms = 1000
//! auth_timeout_ms = 5000
//! retry_interval_ms = 5000
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - `retry_interval_ms = 0` disables automatic retries; an absent key
//!   means the 5000 ms default
//! - CLI overrides are applied before `validate()`
//!
//! ## Last Modified
//! v0.1.0 - Initial drone configuration

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{DroneError, Result};

// ============================================
// DroneConfig
// ============================================

/// Main drone configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DroneConfig {
    /// Identity and passphrase.
    #[serde(default)]
    pub drone: IdentityConfig,

    /// Local bind and ground station address.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Handshake timing.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DroneConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed or validated.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        info!(path = %path_str, "Loading configuration");

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DroneError::config_load(&path_str, e.to_string()))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| DroneError::config_load(&path_str, e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a string.
    ///
    /// # Errors
    /// Returns error if the string does not parse or validate.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| DroneError::config_load("<string>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    ///
    /// # Errors
    /// `ConfigInvalid` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.drone.validate()?;
        self.network.validate()?;
        self.timing.validate()?;
        Ok(())
    }

    /// Serializes configuration to a TOML string.
    #[must_use]
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

// ============================================
// IdentityConfig
// ============================================

/// `[drone]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Identity presented to the ground station.
    #[serde(default = "default_id")]
    pub id: String,

    /// Passphrase mixed into the secret. Never logged.
    #[serde(default)]
    pub password: String,
}

fn default_id() -> String {
    "DRONE_001".to_string()
}

impl IdentityConfig {
    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(DroneError::config_invalid("drone.id", "must not be empty"));
        }
        Ok(())
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            id: default_id(),
            password: String::new(),
        }
    }
}

// ============================================
// NetworkConfig
// ============================================

/// `[network]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Local UDP address.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// Ground station UDP address.
    #[serde(default = "default_ground_station")]
    pub ground_station: SocketAddr,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 0))
}

fn default_ground_station() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

impl NetworkConfig {
    fn validate(&self) -> Result<()> {
        if self.ground_station.port() == 0 {
            return Err(DroneError::config_invalid(
                "network.ground_station",
                "port cannot be 0",
            ));
        }
        if self.ground_station.ip().is_unspecified() {
            return Err(DroneError::config_invalid(
                "network.ground_station",
                "address cannot be unspecified",
            ));
        }
        Ok(())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            ground_station: default_ground_station(),
        }
    }
}

// ============================================
// TimingConfig
// ============================================

/// `[timing]` section. All values in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Delay before the first attempt.
    #[serde(default = "default_start_delay_ms")]
    pub start_delay_ms: u64,

    /// How long one attempt may wait for an answer.
    #[serde(default = "default_auth_timeout_ms")]
    pub auth_timeout_ms: u64,

    /// Pause between a timeout and the next attempt. `0` disables retries.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
}

fn default_start_delay_ms() -> u64 {
    1000
}

fn default_auth_timeout_ms() -> u64 {
    5000
}

fn default_retry_interval_ms() -> u64 {
    5000
}

impl TimingConfig {
    fn validate(&self) -> Result<()> {
        if self.auth_timeout_ms == 0 {
            return Err(DroneError::config_invalid(
                "timing.auth_timeout_ms",
                "must be > 0",
            ));
        }
        Ok(())
    }

    /// Delay before the first attempt.
    #[must_use]
    pub const fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    /// Per-attempt timeout.
    #[must_use]
    pub const fn auth_timeout(&self) -> Duration {
        Duration::from_millis(self.auth_timeout_ms)
    }

    /// Retry pause, or `None` when retries are disabled.
    #[must_use]
    pub fn retry_interval(&self) -> Option<Duration> {
        (self.retry_interval_ms > 0).then(|| Duration::from_millis(self.retry_interval_ms))
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            start_delay_ms: default_start_delay_ms(),
            auth_timeout_ms: default_auth_timeout_ms(),
            retry_interval_ms: default_retry_interval_ms(),
        }
    }
}

// ============================================
// LoggingConfig
// ============================================

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ============================================
// Tests
// ============================================
