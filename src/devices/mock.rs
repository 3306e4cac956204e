//! Mock devices for hardware-free operation and testing

use crate::core::{Actuator, HeartRateSample, SensorFeed};
use crate::error::Result;
use crate::haptics::Waveform;
use crossbeam_channel::{Receiver, TrySendError};
use parking_lot::Mutex;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Actuator that records played waveforms instead of driving hardware
///
/// Clones share the same record, so a test can keep a handle while the
/// server owns another.
#[derive(Clone)]
pub struct MockActuator {
    played: Arc<Mutex<Vec<Waveform>>>,
}

impl MockActuator {
    /// Create a new mock actuator
    pub fn new() -> Self {
        Self {
            played: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// All waveforms played so far, in order
    pub fn played(&self) -> Vec<Waveform> {
        self.played.lock().clone()
    }
}

impl Default for MockActuator {
    fn default() -> Self {
        Self::new()
    }
}

impl Actuator for MockActuator {
    fn play(&mut self, waveform: &Waveform) -> Result<()> {
        log::debug!(
            "MockActuator: waveform ({} pulses, {} ms)",
            waveform.pulse_count(),
            waveform.total_duration_ms()
        );
        self.played.lock().push(waveform.clone());
        Ok(())
    }
}

/// Resting rate the simulated feed walks around
const BASE_BPM: HeartRateSample = 72;

/// Simulated heart-rate feed
///
/// Publishes a random-walk bpm value on a channel at a fixed interval.
/// Samples are dropped when the consumer falls behind; telemetry is
/// best-effort.
pub struct SimulatedHeartRate {
    sample_interval: Duration,
    active: Option<ActiveFeed>,
}

struct ActiveFeed {
    rx: Receiver<HeartRateSample>,
    stop: Arc<AtomicBool>,
    worker: JoinHandle<()>,
}

impl SimulatedHeartRate {
    /// Create a feed that samples every `sample_interval_ms` milliseconds
    pub fn new(sample_interval_ms: u64) -> Self {
        Self {
            sample_interval: Duration::from_millis(sample_interval_ms.max(1)),
            active: None,
        }
    }
}

impl SensorFeed for SimulatedHeartRate {
    fn subscribe(&mut self) -> Result<Receiver<HeartRateSample>> {
        if let Some(ref active) = self.active {
            log::debug!("SimulatedHeartRate: feed already active");
            return Ok(active.rx.clone());
        }

        let (tx, rx) = crossbeam_channel::bounded(32);
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);
        let interval = self.sample_interval;

        let worker = thread::Builder::new()
            .name("heart-rate-sim".to_string())
            .spawn(move || {
                let mut rng = rand::thread_rng();
                let mut bpm = BASE_BPM;

                log::info!("SimulatedHeartRate: sampling started");
                while !worker_stop.load(Ordering::Relaxed) {
                    bpm = (bpm + rng.gen_range(-2..=2)).clamp(48, 180);
                    match tx.try_send(bpm) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            log::trace!("SimulatedHeartRate: consumer behind, sample dropped");
                        }
                        Err(TrySendError::Disconnected(_)) => break,
                    }
                    thread::sleep(interval);
                }
                log::info!("SimulatedHeartRate: sampling stopped");
            })?;

        let receiver = rx.clone();
        self.active = Some(ActiveFeed { rx, stop, worker });
        Ok(receiver)
    }

    fn unsubscribe(&mut self) {
        match self.active.take() {
            Some(active) => {
                active.stop.store(true, Ordering::Relaxed);
                drop(active.rx);
                let _ = active.worker.join();
                log::debug!("SimulatedHeartRate: feed released");
            }
            None => {
                log::debug!("SimulatedHeartRate: feed not active");
            }
        }
    }
}

impl Drop for SimulatedHeartRate {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_actuator_records_waveforms() {
        use crate::haptics::{build_waveform, TriggerParams, WaveformPolicy};

        let mut actuator = MockActuator::new();
        let handle = actuator.clone();
        let waveform = build_waveform(
            &TriggerParams {
                intensity: 10,
                pulses: 1,
                duration_ms: 5,
                interval_ms: 0,
            },
            WaveformPolicy::Amplitude,
        )
        .unwrap();

        actuator.play(&waveform).unwrap();
        actuator.play(&waveform).unwrap();

        assert_eq!(handle.played().len(), 2);
        assert_eq!(handle.played()[0], waveform);
    }

    #[test]
    fn test_simulated_feed_produces_samples() {
        let mut feed = SimulatedHeartRate::new(5);
        let rx = feed.subscribe().unwrap();

        let sample = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!((48..=180).contains(&sample));

        feed.unsubscribe();
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let mut feed = SimulatedHeartRate::new(5);
        let first = feed.subscribe().unwrap();
        let second = feed.subscribe().unwrap();

        // Same channel: both receivers drain the same feed
        assert!(first.same_channel(&second));

        feed.unsubscribe();
        // Unsubscribing twice is a no-op
        feed.unsubscribe();
    }
}
