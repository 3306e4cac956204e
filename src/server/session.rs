//! Per-connection session handling
//!
//! One session owns one accepted connection for its lifetime: it runs the
//! read loop, reassembles and dispatches frames, starts telemetry when the
//! heart-rate mode is entered, and guarantees cleanup on every exit path.
//! A malformed frame never terminates the session; a transport error
//! terminates this session only.

use crate::core::{Actuator, SensorFeed};
use crate::error::{Error, Result};
use crate::haptics::{build_waveform, TriggerParams, WaveformPolicy};
use crate::monitoring::{Mode, ModeCell};
use crate::protocol::{parse_frame, Command, FrameDecoder, LinkIdentity};
use crate::server::producer::TelemetryProducer;
use parking_lot::Mutex;
use std::io::Read;
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Read timeout so the shutdown flag is observed periodically
const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Interval between liveness log lines
const LIVENESS_INTERVAL: Duration = Duration::from_secs(3);

/// Tick for the liveness thread's exit check
const LIVENESS_TICK: Duration = Duration::from_millis(200);

/// Handles one accepted companion connection
pub struct SessionHandler {
    mode: Arc<ModeCell>,
    actuator: Arc<Mutex<Box<dyn Actuator>>>,
    sensor: Arc<Mutex<Box<dyn SensorFeed>>>,
    policy: WaveformPolicy,
    identity: LinkIdentity,
    running: Arc<AtomicBool>,
    session_id: u64,
    producer: Option<TelemetryProducer>,
    telemetry_started: bool,
}

impl SessionHandler {
    /// Create a handler for a newly accepted connection
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mode: Arc<ModeCell>,
        actuator: Arc<Mutex<Box<dyn Actuator>>>,
        sensor: Arc<Mutex<Box<dyn SensorFeed>>>,
        policy: WaveformPolicy,
        identity: LinkIdentity,
        running: Arc<AtomicBool>,
        session_id: u64,
    ) -> Self {
        Self {
            mode,
            actuator,
            sensor,
            policy,
            identity,
            running,
            session_id,
            producer: None,
            telemetry_started: false,
        }
    }

    /// Run the session until disconnect, error, or daemon shutdown
    pub fn run(mut self, mut stream: TcpStream) -> Result<()> {
        if let Err(e) = stream.set_read_timeout(Some(READ_TIMEOUT)) {
            log::warn!("Session {}: failed to set read timeout: {}", self.session_id, e);
        }

        // Liveness indicator: observability only, never on the wire
        let alive = Arc::new(AtomicBool::new(true));
        let liveness = spawn_liveness_thread(self.session_id, Arc::clone(&alive));

        let mut decoder = FrameDecoder::new();
        let mut buffer = [0u8; 1024];

        let result = loop {
            if !self.running.load(Ordering::Relaxed) {
                log::debug!("Session {}: daemon shutdown, closing", self.session_id);
                break Ok(());
            }

            match stream.read(&mut buffer) {
                Ok(0) => {
                    // Peer closed the stream; a trailing unterminated frame
                    // is still delivered
                    if let Some(frame) = decoder.finish() {
                        self.dispatch(&frame, &stream);
                    }
                    log::info!("Session {}: companion disconnected", self.session_id);
                    break Ok(());
                }
                Ok(read) => {
                    decoder.extend(&buffer[..read]);
                    while let Some(frame) = decoder.next_frame() {
                        self.dispatch(&frame, &stream);
                    }
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::UnexpectedEof
                        || e.kind() == std::io::ErrorKind::ConnectionReset =>
                {
                    log::info!("Session {}: companion disconnected", self.session_id);
                    break Ok(());
                }
                Err(e) => break Err(Error::Io(e)),
            }
        };

        // Cleanup, in order: stop the producer, release the connection
        // exactly once (also unblocks a pending telemetry write), join the
        // producer, release the sensor feed.
        let producer = self.producer.take();
        if let Some(ref producer) = producer {
            producer.stop();
        }
        let _ = stream.shutdown(Shutdown::Both);
        drop(producer);
        self.sensor.lock().unsubscribe();

        alive.store(false, Ordering::Relaxed);
        if let Some(liveness) = liveness {
            let _ = liveness.join();
        }

        result
    }

    /// Decode and dispatch one frame; per-frame errors are logged and skipped
    fn dispatch(&mut self, frame: &str, stream: &TcpStream) {
        log::debug!("Session {}: received: {}", self.session_id, frame);

        match parse_frame(frame) {
            Ok(Command::Monitoring { mode }) => self.handle_monitoring(&mode, stream),
            Ok(Command::Vibrate(params)) => self.handle_vibrate(&params),
            Ok(Command::Unknown { command }) => {
                log::warn!("Session {}: unknown command: {}", self.session_id, command);
            }
            Err(e) => {
                log::error!(
                    "Session {}: dropped frame {:?}: {}",
                    self.session_id,
                    frame,
                    e
                );
            }
        }
    }

    fn handle_monitoring(&mut self, name: &str, stream: &TcpStream) {
        match self.mode.select(name) {
            Some(mode) => {
                log::info!(
                    "Session {}: monitoring mode set to {:?}",
                    self.session_id,
                    mode
                );
                // First entry into heart-rate mode on this connection starts
                // telemetry; re-entering is a no-op
                if mode == Mode::HeartRate && !self.telemetry_started {
                    self.start_telemetry(stream);
                }
            }
            None => {
                log::warn!(
                    "Session {}: unsupported monitoring mode: {}",
                    self.session_id,
                    name
                );
            }
        }
    }

    fn start_telemetry(&mut self, stream: &TcpStream) {
        let samples = match self.sensor.lock().subscribe() {
            Ok(samples) => samples,
            Err(e) => {
                log::error!(
                    "Session {}: heart-rate feed unavailable: {}",
                    self.session_id,
                    e
                );
                return;
            }
        };

        let writer = match stream.try_clone() {
            Ok(writer) => writer,
            Err(e) => {
                log::error!(
                    "Session {}: failed to clone stream for telemetry: {}",
                    self.session_id,
                    e
                );
                return;
            }
        };

        match TelemetryProducer::start(writer, samples, self.identity.clone(), self.session_id) {
            Ok(producer) => {
                self.producer = Some(producer);
                self.telemetry_started = true;
            }
            Err(e) => {
                log::error!(
                    "Session {}: failed to start telemetry: {}",
                    self.session_id,
                    e
                );
            }
        }
    }

    fn handle_vibrate(&mut self, params: &TriggerParams) {
        let profile = match self.mode.get() {
            Mode::HeartRate => "heart-rate",
            Mode::SunAzimuth | Mode::MoonAzimuth => "azimuth",
            Mode::Unset => {
                log::warn!(
                    "Session {}: vibrate received but no monitoring mode is set",
                    self.session_id
                );
                return;
            }
        };

        match build_waveform(params, self.policy) {
            Ok(waveform) => {
                log::debug!(
                    "Session {}: {} trigger: {} pulses, {} ms total",
                    self.session_id,
                    profile,
                    waveform.pulse_count(),
                    waveform.total_duration_ms()
                );
                if let Err(e) = self.actuator.lock().play(&waveform) {
                    log::error!("Session {}: actuator error: {}", self.session_id, e);
                }
            }
            Err(e) => {
                log::error!(
                    "Session {}: invalid vibrate parameters: {}",
                    self.session_id,
                    e
                );
            }
        }
    }
}

/// Periodic "still alive" debug log while the session runs
///
/// Observability only; when the thread cannot be spawned the session runs
/// without it.
fn spawn_liveness_thread(session_id: u64, alive: Arc<AtomicBool>) -> Option<JoinHandle<()>> {
    let spawned = thread::Builder::new()
        .name(format!("liveness-{}", session_id))
        .spawn(move || {
            let mut last_log = Instant::now();
            while alive.load(Ordering::Relaxed) {
                if last_log.elapsed() >= LIVENESS_INTERVAL {
                    log::debug!("Session {}: still alive", session_id);
                    last_log = Instant::now();
                }
                thread::sleep(LIVENESS_TICK);
            }
        });

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!(
                "Session {}: failed to spawn liveness thread: {}",
                session_id,
                e
            );
            None
        }
    }
}
