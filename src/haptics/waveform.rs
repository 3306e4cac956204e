//! Pulse-train construction for the haptic actuator
//!
//! A trigger command carries four integers (intensity, pulses, duration,
//! interval) which are expanded into an ordered segment sequence:
//!
//! ```text
//! [ (0, off), (pulse), (interval, off), (pulse), ..., (pulse), (interval, off) ]
//! ```
//!
//! The sequence always has `2 * pulses + 1` segments: a zero-length leading
//! segment so playback starts immediately, then alternating pulse and pause
//! segments. How intensity maps onto the pulse segments is a build-level
//! configuration choice, see [`WaveformPolicy`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Maximum actuator amplitude
pub const MAX_AMPLITUDE: u8 = 255;

/// Upper bound on pulses per trigger
///
/// The pulse count sizes the segment buffer, so it must be bounded before
/// allocation; anything above this is a protocol error, not a pattern any
/// actuator would play.
pub const MAX_PULSES: u32 = 1024;

/// Trigger parameters from a `Vibrate` frame
///
/// Constructed fresh from each well-formed payload; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerParams {
    /// Strength factor; interpretation depends on the waveform policy
    pub intensity: u32,
    /// Number of pulses
    pub pulses: u32,
    /// Duration of one pulse in milliseconds
    pub duration_ms: u32,
    /// Pause between pulses in milliseconds (0 = back-to-back pulses)
    pub interval_ms: u32,
}

/// Mapping from trigger intensity to pulse segments
///
/// Both mappings exist in the field; they are mutually exclusive designs, so
/// the choice is a configuration value applied uniformly for a build rather
/// than a per-trigger option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaveformPolicy {
    /// Pulses keep their requested duration; intensity drives the amplitude,
    /// clamped to the actuator range 1-255
    #[default]
    Amplitude,
    /// Pulse duration is scaled by intensity; amplitude is fixed at maximum
    ScaledDuration,
}

/// One waveform segment: hold `amplitude` for `duration_ms`
///
/// Amplitude 0 means the actuator is off (a pause segment).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub duration_ms: u64,
    pub amplitude: u8,
}

impl Segment {
    /// Whether this is a pause (actuator off) segment
    pub fn is_off(&self) -> bool {
        self.amplitude == 0
    }
}

/// Ordered pulse/pause segment sequence driving the actuator
///
/// Produced on demand from trigger parameters and consumed immediately by
/// the actuator; not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waveform {
    segments: Vec<Segment>,
}

impl Waveform {
    /// Segment sequence in playback order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of pulse (non-pause) segments
    pub fn pulse_count(&self) -> usize {
        self.segments.iter().filter(|s| !s.is_off()).count()
    }

    /// Total playback time in milliseconds
    pub fn total_duration_ms(&self) -> u64 {
        self.segments.iter().map(|s| s.duration_ms).sum()
    }
}

/// Build a pulse-train waveform from trigger parameters
///
/// Pure and deterministic. Preconditions: `pulses`, `intensity` and
/// `duration_ms` must be positive; `interval_ms` may be zero. Violations
/// yield [`Error::InvalidParameter`]; the caller decides whether to
/// log-and-ignore.
pub fn build_waveform(params: &TriggerParams, policy: WaveformPolicy) -> Result<Waveform> {
    if params.pulses == 0 || params.intensity == 0 || params.duration_ms == 0 {
        return Err(Error::InvalidParameter(format!(
            "intensity, pulses and duration must be positive (got {}, {}, {})",
            params.intensity, params.pulses, params.duration_ms
        )));
    }
    if params.pulses > MAX_PULSES {
        return Err(Error::InvalidParameter(format!(
            "pulse count {} exceeds the maximum of {}",
            params.pulses, MAX_PULSES
        )));
    }

    let (pulse_duration, amplitude) = match policy {
        WaveformPolicy::Amplitude => {
            let amplitude = params.intensity.min(u32::from(MAX_AMPLITUDE)) as u8;
            (u64::from(params.duration_ms), amplitude)
        }
        WaveformPolicy::ScaledDuration => {
            let scaled = u64::from(params.duration_ms)
                .checked_mul(u64::from(params.intensity))
                .ok_or_else(|| {
                    Error::InvalidParameter(format!(
                        "scaled pulse duration overflows: {} * {}",
                        params.duration_ms, params.intensity
                    ))
                })?;
            (scaled, MAX_AMPLITUDE)
        }
    };

    let mut segments = Vec::with_capacity(params.pulses as usize * 2 + 1);
    // Zero-length leading segment: playback starts immediately
    segments.push(Segment {
        duration_ms: 0,
        amplitude: 0,
    });
    for i in 1..=params.pulses * 2 {
        if i % 2 == 1 {
            segments.push(Segment {
                duration_ms: pulse_duration,
                amplitude,
            });
        } else {
            segments.push(Segment {
                duration_ms: u64::from(params.interval_ms),
                amplitude: 0,
            });
        }
    }

    Ok(Waveform { segments })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(intensity: u32, pulses: u32, duration_ms: u32, interval_ms: u32) -> TriggerParams {
        TriggerParams {
            intensity,
            pulses,
            duration_ms,
            interval_ms,
        }
    }

    #[test]
    fn test_segment_count_and_shape() {
        for pulses in 1..=8 {
            let waveform = build_waveform(&params(50, pulses, 100, 20), WaveformPolicy::Amplitude)
                .unwrap();
            let segments = waveform.segments();

            assert_eq!(segments.len(), (pulses * 2 + 1) as usize);
            assert_eq!(segments[0].duration_ms, 0);
            assert!(segments[0].is_off());

            for (i, segment) in segments.iter().enumerate().skip(1) {
                if i % 2 == 1 {
                    assert!(!segment.is_off(), "segment {} should be a pulse", i);
                    assert_eq!(segment.duration_ms, 100);
                } else {
                    assert!(segment.is_off(), "segment {} should be a pause", i);
                    assert_eq!(segment.duration_ms, 20);
                }
            }

            assert_eq!(waveform.pulse_count(), pulses as usize);
        }
    }

    #[test]
    fn test_amplitude_policy_example() {
        // Vibrate:100,3,200,50
        let waveform =
            build_waveform(&params(100, 3, 200, 50), WaveformPolicy::Amplitude).unwrap();
        let expected = [
            (0u64, 0u8),
            (200, 100),
            (50, 0),
            (200, 100),
            (50, 0),
            (200, 100),
            (50, 0),
        ];
        let actual: Vec<(u64, u8)> = waveform
            .segments()
            .iter()
            .map(|s| (s.duration_ms, s.amplitude))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_amplitude_clamped_to_actuator_range() {
        let waveform =
            build_waveform(&params(4000, 2, 100, 10), WaveformPolicy::Amplitude).unwrap();
        for segment in waveform.segments().iter().filter(|s| !s.is_off()) {
            assert_eq!(segment.amplitude, MAX_AMPLITUDE);
        }
    }

    #[test]
    fn test_scaled_duration_policy() {
        let waveform =
            build_waveform(&params(5, 2, 100, 10), WaveformPolicy::ScaledDuration).unwrap();
        let segments = waveform.segments();
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[1].duration_ms, 500);
        assert_eq!(segments[1].amplitude, MAX_AMPLITUDE);
        assert_eq!(segments[2].duration_ms, 10);
        assert_eq!(segments[3].duration_ms, 500);
    }

    #[test]
    fn test_zero_interval_is_legal() {
        let waveform = build_waveform(&params(10, 3, 50, 0), WaveformPolicy::Amplitude).unwrap();
        assert_eq!(waveform.segments().len(), 7);
        for segment in waveform.segments().iter().filter(|s| s.is_off()) {
            assert_eq!(segment.duration_ms, 0);
        }
        assert_eq!(waveform.total_duration_ms(), 150);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(build_waveform(&params(0, 3, 100, 10), WaveformPolicy::Amplitude).is_err());
        assert!(build_waveform(&params(10, 0, 100, 10), WaveformPolicy::Amplitude).is_err());
        assert!(build_waveform(&params(10, 3, 0, 10), WaveformPolicy::Amplitude).is_err());
        assert!(build_waveform(&params(10, 3, 0, 10), WaveformPolicy::ScaledDuration).is_err());
    }

    #[test]
    fn test_huge_pulse_count_rejected_without_allocating() {
        // Vibrate:1,3000000000,1,0 is well-formed on the wire but must fail
        // validation, not size a segment buffer
        let result = build_waveform(&params(1, 3_000_000_000, 1, 0), WaveformPolicy::Amplitude);
        assert!(matches!(result, Err(Error::InvalidParameter(_))));

        assert!(build_waveform(&params(1, MAX_PULSES + 1, 1, 0), WaveformPolicy::Amplitude)
            .is_err());
        let at_limit =
            build_waveform(&params(1, MAX_PULSES, 1, 0), WaveformPolicy::Amplitude).unwrap();
        assert_eq!(at_limit.segments().len(), (MAX_PULSES * 2 + 1) as usize);
    }

    #[test]
    fn test_total_duration() {
        let waveform =
            build_waveform(&params(100, 3, 200, 50), WaveformPolicy::Amplitude).unwrap();
        // 3 pulses of 200ms + 3 pauses of 50ms
        assert_eq!(waveform.total_duration_ms(), 750);
    }
}
