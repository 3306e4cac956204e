//! Process-global feedback mode state machine
//!
//! The mode selects which trigger semantics a `Vibrate` frame maps to. It is
//! set by the most recent well-formed `Monitoring` frame and only moves
//! forward among named modes; there is no transition back to `Unset`.

use std::sync::atomic::{AtomicU8, Ordering};

/// Currently selected feedback mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    /// Initial state; `Vibrate` frames are accepted but produce no waveform
    Unset = 0,
    /// Heart-rate feedback; entering this mode starts telemetry
    HeartRate = 1,
    /// Sun azimuth feedback
    SunAzimuth = 2,
    /// Moon azimuth feedback (same trigger semantics as sun azimuth today,
    /// kept distinct for future divergence)
    MoonAzimuth = 3,
}

impl Mode {
    /// Case-insensitive mode name lookup; None for unrecognized names
    pub fn from_name(name: &str) -> Option<Mode> {
        if name.eq_ignore_ascii_case("HeartRate") {
            Some(Mode::HeartRate)
        } else if name.eq_ignore_ascii_case("SunAzimuth") {
            Some(Mode::SunAzimuth)
        } else if name.eq_ignore_ascii_case("MoonAzimuth") {
            Some(Mode::MoonAzimuth)
        } else {
            None
        }
    }

    fn from_raw(raw: u8) -> Mode {
        match raw {
            1 => Mode::HeartRate,
            2 => Mode::SunAzimuth,
            3 => Mode::MoonAzimuth,
            _ => Mode::Unset,
        }
    }
}

/// Shared mode cell
///
/// Exactly one mode is active per process: the protocol tracks a single
/// companion link, so mode is global rather than per-connection. The value
/// is stored atomically so command dispatch and the telemetry trigger can
/// read it from different threads without a lock. A multi-session
/// extension would need a per-connection mode plus a routing table.
#[derive(Debug)]
pub struct ModeCell {
    raw: AtomicU8,
}

impl ModeCell {
    /// New cell in the `Unset` state
    pub fn new() -> Self {
        Self {
            raw: AtomicU8::new(Mode::Unset as u8),
        }
    }

    /// Currently active mode
    pub fn get(&self) -> Mode {
        Mode::from_raw(self.raw.load(Ordering::Relaxed))
    }

    /// Apply a `Monitoring` payload
    ///
    /// Returns the selected mode, or None when the name is unrecognized
    /// (the state is left unchanged).
    pub fn select(&self, name: &str) -> Option<Mode> {
        let mode = Mode::from_name(name)?;
        self.raw.store(mode as u8, Ordering::Relaxed);
        Some(mode)
    }
}

impl Default for ModeCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names_case_insensitive() {
        assert_eq!(Mode::from_name("HeartRate"), Some(Mode::HeartRate));
        assert_eq!(Mode::from_name("heartrate"), Some(Mode::HeartRate));
        assert_eq!(Mode::from_name("SUNAZIMUTH"), Some(Mode::SunAzimuth));
        assert_eq!(Mode::from_name("moonazimuth"), Some(Mode::MoonAzimuth));
        assert_eq!(Mode::from_name("StarAzimuth"), None);
        assert_eq!(Mode::from_name(""), None);
    }

    #[test]
    fn test_cell_starts_unset() {
        let cell = ModeCell::new();
        assert_eq!(cell.get(), Mode::Unset);
    }

    #[test]
    fn test_select_transitions() {
        let cell = ModeCell::new();
        assert_eq!(cell.select("HeartRate"), Some(Mode::HeartRate));
        assert_eq!(cell.get(), Mode::HeartRate);
        assert_eq!(cell.select("sunazimuth"), Some(Mode::SunAzimuth));
        assert_eq!(cell.get(), Mode::SunAzimuth);
    }

    #[test]
    fn test_unknown_name_leaves_state_unchanged() {
        let cell = ModeCell::new();
        cell.select("HeartRate");
        assert_eq!(cell.select("Altitude"), None);
        assert_eq!(cell.get(), Mode::HeartRate);
    }

    #[test]
    fn test_reselect_same_mode_is_stable() {
        let cell = ModeCell::new();
        cell.select("HeartRate");
        cell.select("HeartRate");
        assert_eq!(cell.get(), Mode::HeartRate);
    }
}
