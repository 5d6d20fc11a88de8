//! Session-level error types.

use crate::port::PortError;
use thiserror::Error;

/// Errors surfaced by [`SerialSession`](crate::SerialSession) operations.
///
/// Buffer-empty conditions are never errors; the read surface signals them
/// with sentinel values or `None` instead.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Opening or (re)configuring the transport failed.
    #[error("Connection error: {0}")]
    Connection(#[source] PortError),

    /// An outbound write failed.
    #[error("Transport error: {0}")]
    Transport(#[source] PortError),

    /// The operation requires an open session.
    #[error("Session is not open")]
    NotOpen,
}
