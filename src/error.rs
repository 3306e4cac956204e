//! Error types for SpandaIO

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// SpandaIO error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Listening transport could not be acquired (fatal to server start)
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    /// Missing permission for the listening transport (fatal to server start)
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration parse error
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration write error
    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Unknown device type in configuration
    #[error("Unknown device type: {0}")]
    UnknownDevice(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
