//! Actuator trait definition

use crate::error::Result;
use crate::haptics::Waveform;

/// Haptic actuator abstraction
///
/// Implementations drive a physical motor (or record the waveform in tests).
pub trait Actuator: Send {
    /// Queue a waveform for playback
    ///
    /// Returns once the waveform has been handed to the device; it does not
    /// wait for the pattern to finish. A new waveform replaces a pattern
    /// still in progress.
    fn play(&mut self, waveform: &Waveform) -> Result<()>;
}
