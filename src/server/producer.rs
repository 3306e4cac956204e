//! Telemetry producer: streams heart-rate frames to the companion
//!
//! Runs on its own thread, draining the sensor feed channel and writing one
//! frame per sample to the session's output stream. A write failure stops
//! the producer only; the session's read loop keeps running until the
//! connection itself dies.

use crate::core::HeartRateSample;
use crate::protocol::{format_heart_rate_frame, LinkIdentity};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::io::Write;
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often the stream loop wakes to check the stop flag
const STOP_POLL: Duration = Duration::from_millis(500);

/// Streams telemetry frames for one session
pub struct TelemetryProducer {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl TelemetryProducer {
    /// Spawn the producer thread
    pub fn start(
        writer: TcpStream,
        samples: Receiver<HeartRateSample>,
        identity: LinkIdentity,
        session_id: u64,
    ) -> crate::error::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);

        let worker = thread::Builder::new()
            .name(format!("telemetry-{}", session_id))
            .spawn(move || {
                stream_loop(writer, samples, identity, session_id, worker_stop);
            })?;

        log::info!("Session {}: telemetry producer started", session_id);

        Ok(Self {
            stop,
            worker: Some(worker),
        })
    }

    /// Request the producer to stop; idempotent
    ///
    /// The thread itself is joined on drop.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Drop for TelemetryProducer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn stream_loop(
    mut writer: TcpStream,
    samples: Receiver<HeartRateSample>,
    identity: LinkIdentity,
    session_id: u64,
    stop: Arc<AtomicBool>,
) {
    while !stop.load(Ordering::Relaxed) {
        let bpm = match samples.recv_timeout(STOP_POLL) {
            Ok(bpm) => bpm,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                log::debug!("Session {}: heart-rate feed closed", session_id);
                break;
            }
        };

        let frame = format_heart_rate_frame(bpm, &identity);
        let result = writer
            .write_all(frame.as_bytes())
            .and_then(|_| writer.flush());
        if let Err(e) = result {
            // Write failure terminates the producer only
            log::error!("Session {}: telemetry write failed: {}", session_id, e);
            break;
        }

        log::trace!("Session {}: sent heart rate {}", session_id, bpm);
    }

    log::info!("Session {}: telemetry producer stopped", session_id);
}
