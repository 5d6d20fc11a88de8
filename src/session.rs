//! Serial session: the glue between the transport, the receive buffer, and
//! the notifier.
//!
//! A session is `Closed` until [`SerialSession::open`] succeeds and `Closed`
//! again after [`SerialSession::close`]. Inbound bytes flow from the
//! transport into the growable receive buffer on an arrival thread; each
//! non-empty batch triggers one [`SerialEvent::DataAvailable`] notification.
//! Consumers read at their own pace through the session's read surface.
//!
//! One exclusive lock guards the transport handle, the buffer, and the
//! stored line configuration, so an append never interleaves with a
//! growth-triggered reallocation, a read never observes a torn cursor pair,
//! and `close` never races an in-flight arrival. Notifications are delivered
//! after that lock is released, so an observer may call straight back into
//! the read surface from its callback.

use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::buffer::RxBuffer;
use crate::error::SessionError;
use crate::notify::{Notifier, SerialEvent};
use crate::port::{
    DataBits, DataRate, LineConfig, Parity, PortError, SerialTransport, StopBits,
    SyncSerialTransport,
};

/// Idle sleep between polls of the arrival pump when nothing is pending.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

struct Inner {
    config: LineConfig,
    /// `None` while closed. Cleared under the same lock as buffer mutation,
    /// so no arrival path ever dereferences a half-closed handle.
    transport: Option<Box<dyn SerialTransport>>,
    rx: RxBuffer,
    /// Bumped on every open and close; a pump thread exits as soon as the
    /// epoch it was spawned for is no longer current.
    epoch: u64,
}

/// A buffered serial session.
///
/// All methods take `&self`; wrap the session in an `Arc` to share it across
/// threads. Dropping the last handle releases the transport and stops the
/// arrival pump.
///
/// # Example
/// ```no_run
/// use buffered_serial::SerialSession;
///
/// let session = SerialSession::new();
/// session.open("/dev/ttyUSB0")?;
/// session.send_str("AT\r\n")?;
/// # Ok::<(), buffered_serial::SessionError>(())
/// ```
pub struct SerialSession {
    inner: Arc<Mutex<Inner>>,
    notifier: Arc<Mutex<Notifier>>,
}

impl Default for SerialSession {
    fn default() -> Self {
        Self::with_config(LineConfig::default())
    }
}

impl SerialSession {
    /// Create a closed session with the default line configuration
    /// (9600 baud, 8 data bits, 1 stop bit, no parity).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a closed session with the given line configuration.
    pub fn with_config(config: LineConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                config,
                transport: None,
                rx: RxBuffer::new(),
                epoch: 0,
            })),
            notifier: Arc::new(Mutex::new(Notifier::new())),
        }
    }

    // ========== Lifecycle ==========

    /// Open the named port with the stored line configuration and arm the
    /// arrival path.
    ///
    /// Fails with [`SessionError::Connection`] if the port cannot be opened
    /// or the configuration is rejected; the session stays closed. Opening
    /// an already-open session also fails with `Connection`.
    pub fn open(&self, identifier: &str) -> Result<(), SessionError> {
        let config = {
            let inner = self.inner.lock();
            if inner.transport.is_some() {
                return Err(SessionError::Connection(PortError::config(
                    "session is already open",
                )));
            }
            inner.config
        };

        // The transport open can block on the OS; do it outside the lock and
        // re-check occupancy when installing.
        let transport = SyncSerialTransport::open(identifier, &config)
            .map_err(SessionError::Connection)?;
        self.install(Box::new(transport))
    }

    /// Open the session over a caller-supplied transport.
    ///
    /// The stored line configuration is applied to the transport before the
    /// arrival path is armed. This is the seam used by tests (with
    /// [`MockTransport`](crate::MockTransport)) and by custom transports.
    pub fn open_with(&self, mut transport: Box<dyn SerialTransport>) -> Result<(), SessionError> {
        let config = {
            let inner = self.inner.lock();
            if inner.transport.is_some() {
                return Err(SessionError::Connection(PortError::config(
                    "session is already open",
                )));
            }
            inner.config
        };

        transport
            .apply_parameters(&config)
            .map_err(SessionError::Connection)?;
        self.install(transport)
    }

    fn install(&self, transport: Box<dyn SerialTransport>) -> Result<(), SessionError> {
        let epoch = {
            let mut inner = self.inner.lock();
            if inner.transport.is_some() {
                return Err(SessionError::Connection(PortError::config(
                    "session is already open",
                )));
            }
            info!(port = transport.name(), "serial session opened");
            inner.transport = Some(transport);
            inner.epoch += 1;
            inner.epoch
        };

        let inner = Arc::downgrade(&self.inner);
        let notifier = Arc::downgrade(&self.notifier);
        let spawned = thread::Builder::new()
            .name("serial-rx-pump".into())
            .spawn(move || pump(inner, notifier, epoch));
        if let Err(e) = spawned {
            warn!(error = %e, "failed to spawn arrival pump; inbound data will not be buffered");
        }
        Ok(())
    }

    /// Close the session, releasing the transport handle.
    ///
    /// Idempotent: closing an already-closed session is a no-op. Runs under
    /// the same lock as buffer mutation, so it waits for any in-flight
    /// arrival rather than interrupting it. Buffered unread data survives
    /// and can still be read after closing.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        if inner.transport.take().is_some() {
            inner.epoch += 1;
            info!("serial session closed");
        }
    }

    /// Whether the session currently holds an open transport.
    pub fn is_open(&self) -> bool {
        self.inner.lock().transport.is_some()
    }

    // ========== Arrival path ==========

    /// Entry point for newly arrived bytes.
    ///
    /// Appends a non-empty batch to the receive buffer and publishes one
    /// [`SerialEvent::DataAvailable`]. An empty batch is a no-op and
    /// publishes nothing. Safe to call from any thread.
    pub fn on_bytes_arrived(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        {
            let mut inner = self.inner.lock();
            inner.rx.append(bytes);
        }
        debug!(bytes = bytes.len(), "buffered arrival batch");
        self.notifier.lock().publish(SerialEvent::DataAvailable);
    }

    /// Register the observer notified on every non-empty arrival batch.
    ///
    /// Replaces any previous observer. The callback runs synchronously on
    /// the arrival thread and may call back into this session's read
    /// surface.
    pub fn on_data_available<F>(&self, observer: F)
    where
        F: Fn(SerialEvent) + Send + 'static,
    {
        self.notifier.lock().subscribe(observer);
    }

    // ========== Outbound path ==========

    /// Write bytes out on the line.
    ///
    /// Returns the number of bytes written, [`SessionError::NotOpen`] when
    /// closed, or [`SessionError::Transport`] when the underlying write
    /// fails.
    pub fn send(&self, bytes: &[u8]) -> Result<usize, SessionError> {
        let mut inner = self.inner.lock();
        match inner.transport.as_mut() {
            Some(transport) => transport.write_bytes(bytes).map_err(SessionError::Transport),
            None => Err(SessionError::NotOpen),
        }
    }

    /// Write a string out on the line.
    pub fn send_str(&self, text: &str) -> Result<usize, SessionError> {
        self.send(text.as_bytes())
    }

    // ========== Line configuration ==========

    /// Set the baud rate; re-applied immediately when open.
    pub fn set_data_rate(&self, data_rate: DataRate) -> Result<(), SessionError> {
        self.reconfigure(|c| c.data_rate = data_rate)
    }

    /// Set the data bits; re-applied immediately when open.
    pub fn set_data_bits(&self, data_bits: DataBits) -> Result<(), SessionError> {
        self.reconfigure(|c| c.data_bits = data_bits)
    }

    /// Set the stop bits; re-applied immediately when open.
    pub fn set_stop_bits(&self, stop_bits: StopBits) -> Result<(), SessionError> {
        self.reconfigure(|c| c.stop_bits = stop_bits)
    }

    /// Set the parity; re-applied immediately when open.
    pub fn set_parity(&self, parity: Parity) -> Result<(), SessionError> {
        self.reconfigure(|c| c.parity = parity)
    }

    /// Update the stored configuration and, when open, re-apply the full
    /// parameter set to the live connection.
    ///
    /// When the transport rejects the new parameters the stored value is
    /// rolled back, so the stored configuration never disagrees with the
    /// live line, and the session stays open.
    fn reconfigure(&self, mutate: impl FnOnce(&mut LineConfig)) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        let previous = inner.config;
        mutate(&mut inner.config);

        let applied = {
            let config = inner.config;
            match inner.transport.as_mut() {
                Some(transport) => transport.apply_parameters(&config),
                None => Ok(()),
            }
        };
        if let Err(e) = applied {
            inner.config = previous;
            return Err(SessionError::Connection(e));
        }
        Ok(())
    }

    /// Snapshot of the stored line configuration.
    pub fn config(&self) -> LineConfig {
        self.inner.lock().config
    }

    pub fn data_rate(&self) -> DataRate {
        self.inner.lock().config.data_rate
    }

    pub fn data_bits(&self) -> DataBits {
        self.inner.lock().config.data_bits
    }

    pub fn stop_bits(&self) -> StopBits {
        self.inner.lock().config.stop_bits
    }

    pub fn parity(&self) -> Parity {
        self.inner.lock().config.parity
    }

    // ========== Read surface ==========

    /// Number of unread buffered bytes.
    pub fn available(&self) -> usize {
        self.inner.lock().rx.available()
    }

    /// Discard all unread buffered bytes.
    pub fn clear(&self) {
        self.inner.lock().rx.clear();
    }

    /// Next unread byte as `0..=255`, or `-1` when the buffer is empty.
    pub fn read_byte(&self) -> i32 {
        self.inner.lock().rx.read_byte()
    }

    /// Next unread byte as a char, or `'\u{ffff}'` when empty. Legacy
    /// fallback; prefer [`read_byte`](Self::read_byte) or
    /// [`read_all`](Self::read_all).
    pub fn read_char(&self) -> char {
        self.inner.lock().rx.read_char()
    }

    /// Drain everything unread, or `None` when empty.
    pub fn read_all(&self) -> Option<Vec<u8>> {
        self.inner.lock().rx.read_all()
    }

    /// Copy up to `dest.len()` unread bytes into `dest` and return the
    /// count. Leftover bytes stay buffered for the next call.
    pub fn read_into(&self, dest: &mut [u8]) -> usize {
        self.inner.lock().rx.read_into(dest)
    }

    /// Drain everything unread decoded as UTF-8 (lossy), or `None` when
    /// empty.
    pub fn read_string(&self) -> Option<String> {
        self.inner.lock().rx.read_string()
    }
}

impl std::fmt::Debug for SerialSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SerialSession")
            .field("open", &inner.transport.is_some())
            .field("config", &inner.config)
            .field("available", &inner.rx.available())
            .finish()
    }
}

/// Arrival pump: polls the transport for pending bytes, appends them to the
/// buffer under the session lock, and publishes outside it.
///
/// Holds only weak references so a session dropped by its owner is actually
/// released; exits when the handle is gone, the session was closed, or a
/// newer open superseded this epoch. Transient read errors are logged and
/// the session stays open.
fn pump(inner: Weak<Mutex<Inner>>, notifier: Weak<Mutex<Notifier>>, epoch: u64) {
    loop {
        let Some(inner_arc) = inner.upgrade() else {
            return;
        };
        let batch = {
            let mut guard = inner_arc.lock();
            if guard.epoch != epoch {
                return;
            }
            let read = match guard.transport.as_mut() {
                Some(transport) => match transport.bytes_to_read() {
                    Some(n) if n > 0 => Some(transport.read_available(n)),
                    _ => None,
                },
                None => return,
            };
            match read {
                Some(Ok(bytes)) if !bytes.is_empty() => {
                    let len = bytes.len();
                    guard.rx.append(&bytes);
                    Some(len)
                }
                Some(Err(e)) => {
                    // Transient hiccups on a live line are expected; keep
                    // the session open and keep pumping.
                    warn!(error = %e, "transient read error on serial line");
                    None
                }
                _ => None,
            }
        };
        drop(inner_arc);

        match batch {
            Some(len) => {
                debug!(bytes = len, "buffered arrival batch");
                if let Some(notifier) = notifier.upgrade() {
                    notifier.lock().publish(SerialEvent::DataAvailable);
                }
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    }
}
