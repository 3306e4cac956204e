//! Waveform generation for haptic feedback

mod waveform;

pub use waveform::{
    build_waveform, Segment, TriggerParams, Waveform, WaveformPolicy, MAX_AMPLITUDE, MAX_PULSES,
};
