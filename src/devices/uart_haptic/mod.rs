//! UART haptic motor controller driver
//!
//! Drives a haptic motor controller over a serial link. Commands use a small
//! framed packet: sync byte, command id, payload length, payload, XOR
//! checksum. The driver owns a playback thread so queuing a waveform never
//! blocks the session read loop; a waveform queued while another is still
//! playing replaces it between segments.

mod packet;

use crate::core::Actuator;
use crate::error::{Error, Result};
use crate::haptics::Waveform;
use crate::transport::Transport;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use packet::{encode_set_amplitude, encode_stop};

/// Poll interval for the playback thread while idle
const IDLE_POLL: Duration = Duration::from_millis(200);

/// UART haptic motor controller
pub struct UartHaptic {
    tx: Sender<Waveform>,
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl UartHaptic {
    /// Create the driver and start its playback thread
    pub fn new<T: Transport + 'static>(transport: T) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let worker_shutdown = Arc::clone(&shutdown);

        let worker = thread::Builder::new()
            .name("haptic-playback".to_string())
            .spawn(move || {
                playback_loop(Box::new(transport), rx, worker_shutdown);
            })?;

        log::info!("UartHaptic: driver initialized");

        Ok(UartHaptic {
            tx,
            shutdown,
            worker: Some(worker),
        })
    }
}

impl Actuator for UartHaptic {
    fn play(&mut self, waveform: &Waveform) -> Result<()> {
        self.tx
            .send(waveform.clone())
            .map_err(|_| Error::Other("haptic playback thread is gone".to_string()))
    }
}

impl Drop for UartHaptic {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Playback thread main loop
fn playback_loop(
    mut transport: Box<dyn Transport>,
    rx: Receiver<Waveform>,
    shutdown: Arc<AtomicBool>,
) {
    log::info!("UartHaptic: playback thread started");

    while !shutdown.load(Ordering::Relaxed) {
        let waveform = match rx.recv_timeout(IDLE_POLL) {
            Ok(waveform) => waveform,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        log::debug!(
            "UartHaptic: playing waveform ({} pulses, {} ms)",
            waveform.pulse_count(),
            waveform.total_duration_ms()
        );

        if let Err(e) = play_segments(transport.as_mut(), &waveform, &rx, &shutdown) {
            log::error!("UartHaptic: playback failed: {}", e);
        }

        drain_status(transport.as_mut());
    }

    // Leave the motor off on exit
    let _ = transport.write(&encode_stop());
    let _ = transport.flush();

    log::info!("UartHaptic: playback thread stopped");
}

/// Step through the waveform segments in time
///
/// Stops early when a newer waveform is queued or shutdown is requested.
fn play_segments(
    transport: &mut dyn Transport,
    waveform: &Waveform,
    rx: &Receiver<Waveform>,
    shutdown: &AtomicBool,
) -> Result<()> {
    for segment in waveform.segments() {
        if shutdown.load(Ordering::Relaxed) || !rx.is_empty() {
            break;
        }

        let command = if segment.is_off() {
            encode_stop()
        } else {
            encode_set_amplitude(segment.amplitude)
        };
        transport.write(&command)?;
        transport.flush()?;

        if segment.duration_ms > 0 {
            thread::sleep(Duration::from_millis(segment.duration_ms));
        }
    }

    // Motor off at the end of the pattern
    transport.write(&encode_stop())?;
    transport.flush()?;
    Ok(())
}

/// Controllers report fault codes between patterns; log and discard them
fn drain_status(transport: &mut dyn Transport) {
    let available = match transport.available() {
        Ok(n) if n > 0 => n,
        _ => return,
    };

    let mut buffer = vec![0u8; available.min(64)];
    if let Ok(read) = transport.read(&mut buffer) {
        if read > 0 {
            log::debug!("UartHaptic: status bytes: {:02X?}", &buffer[..read]);
        }
    }
}
