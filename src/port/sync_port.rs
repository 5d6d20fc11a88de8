//! Real serial transport over the `serialport` crate.
//!
//! Wraps `serialport::SerialPort` behind the `SerialTransport` trait so the
//! session can be tested against a mock and run against real hardware.

use super::error::PortError;
use super::traits::{LineConfig, SerialTransport};
use std::io::{Read, Write};
use std::time::Duration;

/// Read timeout handed to the serial layer. The arrival pump only reads when
/// bytes are already pending, so this is a backstop, not a pacing mechanism.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// List the identifiers of the serial ports present on the system.
pub fn list_port_identifiers() -> Result<Vec<String>, PortError> {
    let ports = serialport::available_ports()?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

/// Synchronous serial transport wrapping `serialport::SerialPort`.
pub struct SyncSerialTransport {
    /// The underlying serial port implementation.
    port: Box<dyn serialport::SerialPort>,
    /// The port name/path for identification.
    name: String,
}

impl SyncSerialTransport {
    /// Open a serial port with the given line configuration.
    ///
    /// DTR is asserted once the port is open so devices gated on it start
    /// transmitting.
    ///
    /// # Example
    /// ```no_run
    /// use buffered_serial::{LineConfig, SyncSerialTransport};
    ///
    /// let config = LineConfig::default();
    /// let port = SyncSerialTransport::open("/dev/ttyUSB0", &config)?;
    /// # Ok::<(), buffered_serial::PortError>(())
    /// ```
    pub fn open(identifier: &str, config: &LineConfig) -> Result<Self, PortError> {
        let stop_bits = serialport::StopBits::try_from(config.stop_bits)?;
        let parity = serialport::Parity::try_from(config.parity)?;

        let mut port = serialport::new(identifier, config.data_rate.as_u32())
            .data_bits(config.data_bits.into())
            .stop_bits(stop_bits)
            .parity(parity)
            .flow_control(serialport::FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => PortError::not_found(identifier),
                serialport::ErrorKind::InvalidInput => PortError::config(e.to_string()),
                _ => PortError::Serial(e),
            })?;

        port.write_data_terminal_ready(true)?;

        Ok(Self {
            port,
            name: identifier.to_string(),
        })
    }
}

impl SerialTransport for SyncSerialTransport {
    fn apply_parameters(&mut self, config: &LineConfig) -> Result<(), PortError> {
        let stop_bits = serialport::StopBits::try_from(config.stop_bits)?;
        let parity = serialport::Parity::try_from(config.parity)?;

        self.port.set_baud_rate(config.data_rate.as_u32())?;
        self.port.set_data_bits(config.data_bits.into())?;
        self.port.set_stop_bits(stop_bits)?;
        self.port.set_parity(parity)?;
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        self.port.write(data).map_err(PortError::Io)
    }

    fn read_available(&mut self, hint: usize) -> Result<Vec<u8>, PortError> {
        let mut buffer = vec![0u8; hint.max(1)];
        let n = self.port.read(&mut buffer).map_err(PortError::Io)?;
        buffer.truncate(n);
        Ok(buffer)
    }

    fn bytes_to_read(&self) -> Option<usize> {
        self.port.bytes_to_read().ok().map(|n| n as usize)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for SyncSerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSerialTransport")
            .field("name", &self.name)
            .field("baud_rate", &self.port.baud_rate())
            .finish()
    }
}
