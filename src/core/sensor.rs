//! Heart-rate sensor feed abstraction

use crate::error::Result;
use crossbeam_channel::Receiver;

/// One heart-rate reading in beats per minute
pub type HeartRateSample = i32;

/// Heart-rate sensor feed
///
/// The push-based sensor subscription is modeled as a channel the telemetry
/// producer owns and drains. At most one subscription is active per process.
pub trait SensorFeed: Send {
    /// Start the feed and return its sample channel
    ///
    /// Subscribing while the feed is already active returns the existing
    /// channel without restarting anything (idempotent start).
    fn subscribe(&mut self) -> Result<Receiver<HeartRateSample>>;

    /// Stop the feed and release the sensor. No-op when not active.
    fn unsubscribe(&mut self);
}
