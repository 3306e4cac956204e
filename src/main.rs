//! SpandaIO - Haptic feedback daemon for smartwatch companion links
//!
//! ## Protocol
//!
//! One TCP connection carries both directions:
//!
//! - Inbound (companion → host), newline-delimited text frames:
//!   `Monitoring:<mode>` and `Vibrate:<intensity>,<pulses>,<duration>,<interval>`
//! - Outbound (host → companion), while heart-rate mode is active:
//!   `MonitoringType:HeartRate,Value:<bpm>,UserID:<id>,SmartWatchID:<id>,AndroidID:<id>`
//!
//! Trigger commands are expanded into pulse-train waveforms and played on
//! the configured actuator.

use spanda_io::config::AppConfig;
use spanda_io::devices::{create_actuator, create_sensor_feed};
use spanda_io::error::{Error, Result};
use spanda_io::server::LinkServer;
use std::env;

/// Parse config path from command line arguments.
///
/// Supports:
/// - `spanda-io <path>` (positional)
/// - `spanda-io --config <path>` (flag-based)
/// - `spanda-io -c <path>` (short flag)
///
/// Defaults to `/etc/spandaio.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    // Look for --config or -c flag
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    // Fall back to first positional argument (if it doesn't start with -)
    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    // Default path
    "/etc/spandaio.toml".to_string()
}

fn main() -> Result<()> {
    // Load configuration first: the log level comes from it
    let config_path = parse_config_path();
    let config = AppConfig::from_file(&config_path)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.logging.level),
    )
    .init();

    log::info!("SpandaIO v0.3.0 starting...");
    log::info!("Using config: {}", config_path);
    log::info!(
        "Actuator: {} ({}), waveform policy: {:?}",
        config.device.actuator,
        config.device.serial_port,
        config.haptics.policy
    );

    // Create the actuator and the heart-rate feed
    let actuator = create_actuator(&config)?;
    let sensor = create_sensor_feed(&config)?;

    // Bind the companion link server
    let server = LinkServer::bind(&config, actuator, sensor)?;

    // Set up shutdown signal handler
    let handle = server.handle();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        handle.stop();
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    log::info!("SpandaIO running. Press Ctrl-C to stop.");
    server.run()?;

    log::info!("SpandaIO stopped");
    Ok(())
}
