//! Actuator and sensor feed implementations

pub mod mock;
pub mod uart_haptic;

use crate::config::AppConfig;
use crate::core::{Actuator, SensorFeed};
use crate::error::{Error, Result};
use crate::transport::SerialTransport;
use uart_haptic::UartHaptic;

/// Baud rate for the haptic controller UART
const HAPTIC_BAUD_RATE: u32 = 115200;

/// Create the actuator selected by configuration
pub fn create_actuator(config: &AppConfig) -> Result<Box<dyn Actuator>> {
    match config.device.actuator.as_str() {
        "uart" => {
            let transport = SerialTransport::open(&config.device.serial_port, HAPTIC_BAUD_RATE)?;
            let driver = UartHaptic::new(transport)?;
            Ok(Box::new(driver))
        }
        "mock" => Ok(Box::new(mock::MockActuator::new())),
        other => Err(Error::UnknownDevice(other.to_string())),
    }
}

/// Create the heart-rate feed selected by configuration
pub fn create_sensor_feed(config: &AppConfig) -> Result<Box<dyn SensorFeed>> {
    match config.device.sensor.as_str() {
        "simulated" => Ok(Box::new(mock::SimulatedHeartRate::new(
            config.device.sample_interval_ms,
        ))),
        other => Err(Error::UnknownDevice(other.to_string())),
    }
}
