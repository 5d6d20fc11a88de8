//! Mock serial transport for testing.
//!
//! Simulates a serial line without hardware: enqueue bytes to be "received",
//! inspect what was written, and inject parameter or write failures.

use super::error::PortError;
use super::traits::{LineConfig, SerialTransport};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Inner state of the mock, protected by a mutex for interior mutability.
#[derive(Debug, Default)]
struct MockState {
    /// Queue of bytes to be returned by read operations.
    read_queue: VecDeque<u8>,
    /// Log of all byte batches written to the port.
    write_log: Vec<Vec<u8>>,
    /// Every configuration successfully applied, in order.
    applied_configs: Vec<LineConfig>,
    /// Whether `apply_parameters` should be rejected.
    fail_parameters: bool,
    /// Whether the next write should fail.
    fail_next_write: bool,
    /// Whether the next read should fail.
    fail_next_read: bool,
}

/// Mock transport implementation for testing.
///
/// Clones share state, so a test can hold one handle while a session owns
/// the boxed other.
///
/// # Example
/// ```
/// use buffered_serial::{MockTransport, SerialTransport};
///
/// let mut port = MockTransport::new("MOCK0");
/// port.enqueue_read(b"Hello, World!");
///
/// let batch = port.read_available(64).unwrap();
/// assert_eq!(batch, b"Hello, World!");
///
/// port.write_bytes(b"Response").unwrap();
/// assert_eq!(port.write_log(), vec![b"Response".to_vec()]);
/// ```
#[derive(Clone)]
pub struct MockTransport {
    name: String,
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a new mock transport with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Enqueue bytes to be returned by subsequent read operations.
    pub fn enqueue_read(&self, data: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.read_queue.extend(data);
    }

    /// Get a copy of all data written to the port.
    pub fn write_log(&self) -> Vec<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state.write_log.clone()
    }

    /// Every configuration successfully applied via `apply_parameters`.
    pub fn applied_configs(&self) -> Vec<LineConfig> {
        let state = self.state.lock().unwrap();
        state.applied_configs.clone()
    }

    /// Make `apply_parameters` reject until reset.
    pub fn set_fail_parameters(&self, fail: bool) {
        let mut state = self.state.lock().unwrap();
        state.fail_parameters = fail;
    }

    /// Make the next write fail.
    pub fn fail_next_write(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_next_write = true;
    }

    /// Make the next read fail.
    pub fn fail_next_read(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_next_read = true;
    }

    /// Number of bytes still queued for reading.
    pub fn pending(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.read_queue.len()
    }
}

impl SerialTransport for MockTransport {
    fn apply_parameters(&mut self, config: &LineConfig) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_parameters {
            return Err(PortError::config("parameters rejected by mock"));
        }
        state.applied_configs.push(*config);
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_next_write {
            state.fail_next_write = false;
            return Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "write failed",
            )));
        }
        state.write_log.push(data.to_vec());
        Ok(data.len())
    }

    fn read_available(&mut self, hint: usize) -> Result<Vec<u8>, PortError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_next_read {
            state.fail_next_read = false;
            return Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "read failed",
            )));
        }
        let count = state.read_queue.len().min(hint.max(1));
        let batch: Vec<u8> = state.read_queue.drain(..count).collect();
        Ok(batch)
    }

    fn bytes_to_read(&self) -> Option<usize> {
        let state = self.state.lock().unwrap();
        Some(state.read_queue.len())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("name", &self.name)
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_and_read() {
        let mut port = MockTransport::new("MOCK0");
        port.enqueue_read(b"Hello");

        let batch = port.read_available(10).unwrap();
        assert_eq!(batch, b"Hello");
        assert_eq!(port.pending(), 0);
    }

    #[test]
    fn test_read_respects_hint() {
        let mut port = MockTransport::new("MOCK0");
        port.enqueue_read(b"Hello, World!");

        let batch = port.read_available(5).unwrap();
        assert_eq!(batch, b"Hello");
        assert_eq!(port.pending(), 8);
    }

    #[test]
    fn test_empty_read_returns_empty_batch() {
        let mut port = MockTransport::new("MOCK0");
        let batch = port.read_available(16).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_write_logging() {
        let mut port = MockTransport::new("MOCK0");
        port.write_bytes(b"Test1").unwrap();
        port.write_bytes(b"Test2").unwrap();

        let log = port.write_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0], b"Test1");
        assert_eq!(log[1], b"Test2");
    }

    #[test]
    fn test_write_failure_injection() {
        let mut port = MockTransport::new("MOCK0");
        port.fail_next_write();

        assert!(matches!(port.write_bytes(b"x"), Err(PortError::Io(_))));
        // One-shot: the following write succeeds.
        assert_eq!(port.write_bytes(b"y").unwrap(), 1);
    }

    #[test]
    fn test_read_failure_injection() {
        let mut port = MockTransport::new("MOCK0");
        port.enqueue_read(b"data");
        port.fail_next_read();

        assert!(matches!(port.read_available(4), Err(PortError::Io(_))));
        // Data survives the failed attempt.
        assert_eq!(port.read_available(4).unwrap(), b"data");
    }

    #[test]
    fn test_parameter_rejection() {
        let mut port = MockTransport::new("MOCK0");
        port.set_fail_parameters(true);
        let config = LineConfig::default();

        assert!(matches!(
            port.apply_parameters(&config),
            Err(PortError::Config(_))
        ));
        assert!(port.applied_configs().is_empty());

        port.set_fail_parameters(false);
        port.apply_parameters(&config).unwrap();
        assert_eq!(port.applied_configs(), vec![config]);
    }

    #[test]
    fn test_bytes_to_read() {
        let port = MockTransport::new("MOCK0");
        port.enqueue_read(b"Test data");
        assert_eq!(port.bytes_to_read(), Some(9));
    }

    #[test]
    fn test_clones_share_state() {
        let port = MockTransport::new("MOCK0");
        let mut other = port.clone();
        port.enqueue_read(b"shared");
        assert_eq!(other.read_available(16).unwrap(), b"shared");
    }
}
