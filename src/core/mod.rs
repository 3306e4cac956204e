//! Core traits for the actuator and sensor seams

mod actuator;
mod sensor;

pub use actuator::Actuator;
pub use sensor::{HeartRateSample, SensorFeed};
