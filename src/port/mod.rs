//! Transport boundary for serial communication.
//!
//! Provides the `SerialTransport` trait plus a real implementation over the
//! `serialport` crate and a mock for tests, enabling dependency injection at
//! the session's only external seam.

pub mod error;
pub mod mock;
pub mod sync_port;
pub mod traits;

pub use error::PortError;
pub use mock::MockTransport;
pub use sync_port::{list_port_identifiers, SyncSerialTransport};
pub use traits::*;
