//! Device link server: accept loop and connection handoff
//!
//! Owns the listening socket, accepts companion connections and spawns one
//! session thread per connection. A slow or stalled companion never blocks
//! acceptance of new connections, though the protocol itself expects a
//! single active session (the mode is process-global, see
//! [`crate::monitoring::ModeCell`]).

mod producer;
mod session;

pub use producer::TelemetryProducer;
pub use session::SessionHandler;

use crate::config::AppConfig;
use crate::core::{Actuator, SensorFeed};
use crate::error::{Error, Result};
use crate::haptics::WaveformPolicy;
use crate::monitoring::ModeCell;
use crate::protocol::LinkIdentity;
use parking_lot::Mutex;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Poll interval for the non-blocking accept loop
const ACCEPT_POLL: Duration = Duration::from_millis(10);

/// Cloneable stop handle for the server
#[derive(Clone)]
pub struct ServerHandle {
    running: Arc<AtomicBool>,
}

impl ServerHandle {
    /// Request the accept loop to exit; safe to call from any thread,
    /// concurrently with `run()`
    pub fn stop(&self) {
        log::info!("Server stop requested");
        self.running.store(false, Ordering::Relaxed);
    }
}

/// Companion device link server
pub struct LinkServer {
    listener: TcpListener,
    running: Arc<AtomicBool>,
    mode: Arc<ModeCell>,
    actuator: Arc<Mutex<Box<dyn Actuator>>>,
    sensor: Arc<Mutex<Box<dyn SensorFeed>>>,
    policy: WaveformPolicy,
    identity: LinkIdentity,
}

impl LinkServer {
    /// Bind the listening socket
    ///
    /// Bind failures are fatal and reported once; retry policy belongs to
    /// whoever supervises the daemon.
    pub fn bind(
        config: &AppConfig,
        actuator: Box<dyn Actuator>,
        sensor: Box<dyn SensorFeed>,
    ) -> Result<Self> {
        let bind_address = &config.network.bind_address;
        let listener = TcpListener::bind(bind_address).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => {
                Error::PermissionDenied(format!("cannot bind {}: {}", bind_address, e))
            }
            _ => Error::TransportUnavailable(format!("cannot bind {}: {}", bind_address, e)),
        })?;

        // Non-blocking accept is what lets stop() unblock the loop
        listener.set_nonblocking(true).map_err(|e| {
            Error::TransportUnavailable(format!("cannot set non-blocking mode: {}", e))
        })?;

        let identity = LinkIdentity::parse(
            &config.identity.watch_name,
            &config.identity.companion_name,
        );

        Ok(Self {
            listener,
            running: Arc::new(AtomicBool::new(true)),
            mode: Arc::new(ModeCell::new()),
            actuator: Arc::new(Mutex::new(actuator)),
            sensor: Arc::new(Mutex::new(sensor)),
            policy: config.haptics.policy,
            identity,
        })
    }

    /// Address the server is actually bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for stopping the server from another thread
    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Process-global mode cell
    pub fn mode_cell(&self) -> Arc<ModeCell> {
        Arc::clone(&self.mode)
    }

    /// Accept connections until stopped; blocks the calling thread
    ///
    /// Nothing from an individual session escalates here: session errors
    /// are logged by the session thread and the loop keeps accepting.
    pub fn run(&self) -> Result<()> {
        log::info!("Device link server listening on {}", self.local_addr()?);

        let mut session_id = 0u64;

        while self.running.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    session_id += 1;
                    log::info!("Companion connected: {} (session {})", addr, session_id);

                    let handler = SessionHandler::new(
                        Arc::clone(&self.mode),
                        Arc::clone(&self.actuator),
                        Arc::clone(&self.sensor),
                        self.policy,
                        self.identity.clone(),
                        Arc::clone(&self.running),
                        session_id,
                    );

                    let id = session_id;
                    let spawn_result = thread::Builder::new()
                        .name(format!("session-{}", id))
                        .spawn(move || {
                            if let Err(e) = handler.run(stream) {
                                log::error!("Session {} error: {}", id, e);
                            }
                        });
                    if let Err(e) = spawn_result {
                        log::error!("Failed to spawn session thread: {}", e);
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    // No connection pending
                    thread::sleep(ACCEPT_POLL);
                }
                Err(e) => {
                    log::error!("Accept error: {}", e);
                }
            }
        }

        log::info!("Device link server stopped");
        Ok(())
    }
}
