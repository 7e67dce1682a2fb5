// ============================================
// File: crates/droneauth-server/src/config.rs
// ============================================
//! # Ground Station Configuration
//!
//! ## Creation Reason
//! Listen address and the set of drones allowed to authenticate,
//! loaded from TOML.
//!
//! ## Configuration Sections
//! - `network`: UDP listen address
//! - `auth`: Authorized drone identities
//! - `logging`: Log level
//!
//! ## Example Configuration
//! ```toml
//! [network]
//! listen_addr = "0.0.0.0:5000"
//!
//! [auth]
//! authorized_drones = ["DRONE_001", "DRONE_002", "DRONE_003"]
//!
//! [logging]
//! level = "info"
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The authorized set is fixed at startup; config changes need a restart
//! - Identities are compared byte for byte, no case folding
//!
//! ## Last Modified
//! v0.1.0 - Initial configuration implementation

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use droneauth_common::Identity;

use crate::error::{Result, ServerError};

// ============================================
// GroundStationConfig
// ============================================

/// Main ground station configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroundStationConfig {
    /// Network configuration.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Authorization configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GroundStationConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        info!("Loading configuration from: {}", path_str);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ServerError::config_load(&path_str, e.to_string()))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ServerError::config_load(&path_str, e.to_string()))?;

        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Loads configuration from a string (useful for testing).
    ///
    /// # Errors
    /// Returns error if the string does not parse or validate.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ServerError::config_load("<string>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// `ConfigInvalid` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.network.validate()?;
        self.auth.validate()?;
        Ok(())
    }

    /// Serializes configuration to TOML string.
    #[must_use]
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Returns listen address (from network config).
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        self.network.listen_addr
    }

    /// Authorized identities, deduplicated.
    #[must_use]
    pub fn authorized(&self) -> BTreeSet<Identity> {
        self.auth.authorized_drones.iter().cloned().map(Identity::new).collect()
    }
}

// ============================================
// NetworkConfig
// ============================================

/// Network configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// UDP listen address.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

impl NetworkConfig {
    fn validate(&self) -> Result<()> {
        if self.listen_addr.port() == 0 {
            return Err(ServerError::config_invalid(
                "network.listen_addr",
                "port cannot be 0",
            ));
        }
        Ok(())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

// ============================================
// AuthConfig
// ============================================

/// Authorization section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identities allowed to authenticate.
    #[serde(default = "default_authorized_drones")]
    pub authorized_drones: Vec<String>,
}

fn default_authorized_drones() -> Vec<String> {
    (1..=5).map(|n| format!("DRONE_{n:03}")).collect()
}

impl AuthConfig {
    fn validate(&self) -> Result<()> {
        if let Some(pos) = self.authorized_drones.iter().position(|id| id.trim().is_empty()) {
            return Err(ServerError::config_invalid(
                format!("auth.authorized_drones[{pos}]"),
                "identity must not be empty",
            ));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            authorized_drones: default_authorized_drones(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GroundStationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_addr().port(), 5000);

        let authorized = config.authorized();
        assert_eq!(authorized.len(), 5);
        assert!(authorized.contains(&Identity::new("DRONE_001")));
        assert!(authorized.contains(&Identity::new("DRONE_005")));
        assert!(!authorized.contains(&Identity::new("DRONE_999")));
    }

    #[test]
    fn test_custom_config() {
        let toml = r#"
            [network]
            listen_addr = "127.0.0.1:6000"

            [auth]
            authorized_drones = ["ALPHA", "BRAVO", "ALPHA"]

            [logging]
            level = "debug"
        "#;

        let config = GroundStationConfig::from_str(toml).unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:6000".parse().unwrap());
        assert_eq!(config.authorized().len(), 2);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = GroundStationConfig::from_str("").unwrap();
        assert_eq!(config.auth.authorized_drones.len(), 5);
    }

    #[test]
    fn test_rejects_port_zero() {
        let err = GroundStationConfig::from_str("[network]\nlisten_addr = \"0.0.0.0:0\"\n")
            .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_rejects_blank_identity() {
        let err = GroundStationConfig::from_str("[auth]\nauthorized_drones = [\"A\", \"\"]\n")
            .unwrap_err();
        assert!(
            matches!(err, ServerError::ConfigInvalid { ref field, .. } if field == "auth.authorized_drones[1]")
        );
    }

    #[test]
    fn test_toml_round_trip() {
        let config = GroundStationConfig::default();
        let parsed = GroundStationConfig::from_str(&config.to_toml()).unwrap();
        assert_eq!(parsed.auth.authorized_drones, config.auth.authorized_drones);
    }
}
