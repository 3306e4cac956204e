//! Configuration for the SpandaIO daemon
//!
//! Loads configuration from a TOML file with the minimal parameters needed
//! to run the device link server against real or mock hardware.

use crate::error::Result;
use crate::haptics::WaveformPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub haptics: HapticsConfig,
    pub identity: IdentityConfig,
    pub device: DeviceConfig,
    pub logging: LoggingConfig,
}

/// Network configuration for the companion link server
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// TCP bind address for the command/telemetry link
    ///
    /// Examples:
    /// - `0.0.0.0:5577` - Bind to all interfaces on port 5577
    /// - `127.0.0.1:5577` - Localhost only
    pub bind_address: String,
}

/// Haptic feedback configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HapticsConfig {
    /// Waveform mapping policy: `amplitude` or `scaled-duration`
    ///
    /// Selects how the trigger intensity maps onto pulse segments. Applied
    /// uniformly to every trigger for the lifetime of the process.
    pub policy: WaveformPolicy,
}

/// Device name registry stand-in for the link layer
///
/// The identity fields embedded in outbound telemetry are parsed from these
/// two human-readable names once per session.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityConfig {
    /// Host device name, expected format `UserID-<digits>-SmartWatchID-<digits>`
    pub watch_name: String,
    /// Companion device name, expected format `Android-<digits>`
    pub companion_name: String,
}

/// Hardware selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Actuator implementation: `uart` or `mock`
    pub actuator: String,
    /// Serial port for the `uart` actuator (e.g., `/dev/ttyS1`)
    pub serial_port: String,
    /// Heart-rate feed implementation: `simulated`
    pub sensor: String,
    /// Sample interval for the heart-rate feed in milliseconds
    pub sample_interval_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Default configuration
    ///
    /// Suitable for testing and development. Production deployments should
    /// use a proper TOML configuration file.
    pub fn defaults() -> Self {
        Self {
            network: NetworkConfig {
                bind_address: "0.0.0.0:5577".to_string(),
            },
            haptics: HapticsConfig {
                policy: WaveformPolicy::Amplitude,
            },
            identity: IdentityConfig {
                watch_name: "UserID-0-SmartWatchID-0".to_string(),
                companion_name: "Android-0".to_string(),
            },
            device: DeviceConfig {
                actuator: "uart".to_string(),
                serial_port: "/dev/ttyS1".to_string(),
                sensor: "simulated".to_string(),
                sample_interval_ms: 1000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::defaults();
        assert_eq!(config.network.bind_address, "0.0.0.0:5577");
        assert_eq!(config.haptics.policy, WaveformPolicy::Amplitude);
        assert_eq!(config.device.actuator, "uart");
        assert_eq!(config.device.serial_port, "/dev/ttyS1");
        assert_eq!(config.device.sample_interval_ms, 1000);
    }

    #[test]
    fn test_toml_serialization() {
        let config = AppConfig::defaults();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        // Should contain all sections
        assert!(toml_string.contains("[network]"));
        assert!(toml_string.contains("[haptics]"));
        assert!(toml_string.contains("[identity]"));
        assert!(toml_string.contains("[device]"));
        assert!(toml_string.contains("[logging]"));

        // Should contain key values
        assert!(toml_string.contains("policy = \"amplitude\""));
        assert!(toml_string.contains("bind_address = \"0.0.0.0:5577\""));
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[network]
bind_address = "127.0.0.1:5600"

[haptics]
policy = "scaled-duration"

[identity]
watch_name = "UserID-7-SmartWatchID-42"
companion_name = "Android-9"

[device]
actuator = "mock"
serial_port = "/dev/ttyUSB0"
sensor = "simulated"
sample_interval_ms = 250

[logging]
level = "debug"
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.network.bind_address, "127.0.0.1:5600");
        assert_eq!(config.haptics.policy, WaveformPolicy::ScaledDuration);
        assert_eq!(config.identity.watch_name, "UserID-7-SmartWatchID-42");
        assert_eq!(config.device.actuator, "mock");
        assert_eq!(config.logging.level, "debug");
    }
}
