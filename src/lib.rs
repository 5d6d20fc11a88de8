//! Buffered serial port sessions.
//!
//! This library decouples an asynchronous serial data source (bytes arriving
//! in unpredictable chunks at unpredictable times) from a consumer that reads
//! at its own pace. Arriving bytes are appended to a growable receive buffer
//! and observers get a single `DataAvailable` notification per batch, so
//! nothing is lost under bursty arrival and nobody has to poll.
//!
//! # Modules
//!
//! - `buffer`: the growable receive buffer with read/write cursors
//! - `notify`: the single-subscriber data-available notifier
//! - `session`: the serial session (open/close, send, reconfigure, read)
//! - `port`: the transport boundary (trait, real port, mock, line config)
//! - `error`: session-level error types
//!
//! # Example
//!
//! ```no_run
//! use buffered_serial::{SerialSession, SerialEvent};
//! use std::sync::Arc;
//!
//! let session = Arc::new(SerialSession::new());
//! let reader = Arc::clone(&session);
//! session.on_data_available(move |_| {
//!     if let Some(text) = reader.read_string() {
//!         print!("{text}");
//!     }
//! });
//! session.open("/dev/ttyUSB0")?;
//! session.send_str("Hello World!")?;
//! # Ok::<(), buffered_serial::SessionError>(())
//! ```

pub mod buffer;
pub mod error;
pub mod notify;
pub mod port;
pub mod session;

// Re-export commonly used types for convenience
pub use buffer::RxBuffer;
pub use error::SessionError;
pub use notify::{Notifier, SerialEvent};
pub use port::{
    list_port_identifiers, DataBits, DataRate, LineConfig, MockTransport, Parity, PortError,
    SerialTransport, StopBits, SyncSerialTransport,
};
pub use session::SerialSession;
