//! SpandaIO - Haptic feedback daemon for smartwatch companion links
//!
//! Pairs a host device with a companion device over a point-to-point link
//! and exchanges two kinds of traffic: mode-selection and feedback-trigger
//! commands inbound, and periodic heart-rate telemetry streamed back on the
//! same connection. Trigger commands are converted into timed pulse-train
//! waveforms and played on a local haptic actuator.

pub mod config;
pub mod core;
pub mod devices;
pub mod error;
pub mod haptics;
pub mod monitoring;
pub mod protocol;
pub mod server;
pub mod transport;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
