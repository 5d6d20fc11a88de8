//! Core trait and line-parameter model for the transport boundary.
//!
//! Defines the `SerialTransport` trait that allows both real serial ports
//! and mock implementations to be used interchangeably, plus the line
//! configuration (rate, data bits, stop bits, parity) shared by the session
//! and the transports.

use super::error::PortError;
use serde::{Deserialize, Serialize};

/// Line parameters for a serial connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineConfig {
    /// Baud rate, one of the enumerated standard rates.
    pub data_rate: DataRate,

    /// Number of data bits (5, 6, 7, or 8).
    pub data_bits: DataBits,

    /// Number of stop bits.
    pub stop_bits: StopBits,

    /// Parity checking mode.
    pub parity: Parity,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            data_rate: DataRate::B9600,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
        }
    }
}

/// Standard baud rates accepted by the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataRate {
    B300,
    B1200,
    B4800,
    B9600,
    B14400,
    B19200,
    B38400,
    B57600,
    B115200,
    B256000,
}

impl DataRate {
    /// The rate in bits per second.
    pub fn as_u32(self) -> u32 {
        match self {
            DataRate::B300 => 300,
            DataRate::B1200 => 1200,
            DataRate::B4800 => 4800,
            DataRate::B9600 => 9600,
            DataRate::B14400 => 14400,
            DataRate::B19200 => 19200,
            DataRate::B38400 => 38400,
            DataRate::B57600 => 57600,
            DataRate::B115200 => 115200,
            DataRate::B256000 => 256000,
        }
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl From<DataBits> for serialport::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => serialport::DataBits::Five,
            DataBits::Six => serialport::DataBits::Six,
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        }
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopBits {
    One,
    OnePointFive,
    Two,
}

impl TryFrom<StopBits> for serialport::StopBits {
    type Error = PortError;

    fn try_from(bits: StopBits) -> Result<Self, PortError> {
        match bits {
            StopBits::One => Ok(serialport::StopBits::One),
            StopBits::Two => Ok(serialport::StopBits::Two),
            // The host serial layer has no 1.5-stop-bit mode.
            StopBits::OnePointFive => Err(PortError::config(
                "1.5 stop bits are not supported by the host serial layer",
            )),
        }
    }
}

/// Parity checking modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    None,
    Odd,
    Even,
    Mark,
    Space,
}

impl TryFrom<Parity> for serialport::Parity {
    type Error = PortError;

    fn try_from(parity: Parity) -> Result<Self, PortError> {
        match parity {
            Parity::None => Ok(serialport::Parity::None),
            Parity::Odd => Ok(serialport::Parity::Odd),
            Parity::Even => Ok(serialport::Parity::Even),
            // Mark/space parity is not exposed by the host serial layer.
            Parity::Mark | Parity::Space => Err(PortError::config(
                "mark/space parity is not supported by the host serial layer",
            )),
        }
    }
}

/// Trait for serial transport I/O operations.
///
/// Abstracts the external serial layer so both real hardware ports and mock
/// implementations can back a session.
pub trait SerialTransport: Send + std::fmt::Debug {
    /// Re-apply the full line parameter set to the live connection.
    fn apply_parameters(&mut self, config: &LineConfig) -> Result<(), PortError>;

    /// Write bytes to the line.
    ///
    /// Returns the number of bytes actually written.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// Read whatever bytes are pending, up to `hint`.
    ///
    /// `hint` is the caller's estimate of how many bytes are waiting; the
    /// returned batch may be shorter.
    fn read_available(&mut self, hint: usize) -> Result<Vec<u8>, PortError>;

    /// Number of bytes currently pending, if the transport can tell.
    fn bytes_to_read(&self) -> Option<usize> {
        None
    }

    /// The name/path of this port.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_configuration() {
        let config = LineConfig::default();
        assert_eq!(config.data_rate, DataRate::B9600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.stop_bits, StopBits::One);
        assert_eq!(config.parity, Parity::None);
    }

    #[test]
    fn test_data_rate_values() {
        assert_eq!(DataRate::B300.as_u32(), 300);
        assert_eq!(DataRate::B115200.as_u32(), 115_200);
        assert_eq!(DataRate::B256000.as_u32(), 256_000);
    }

    #[test]
    fn test_data_bits_conversion() {
        let bits = DataBits::Eight;
        let serialport_bits: serialport::DataBits = bits.into();
        assert_eq!(serialport_bits, serialport::DataBits::Eight);
    }

    #[test]
    fn test_stop_bits_conversion() {
        let stop_bits: serialport::StopBits = StopBits::Two.try_into().unwrap();
        assert_eq!(stop_bits, serialport::StopBits::Two);

        let rejected = serialport::StopBits::try_from(StopBits::OnePointFive);
        assert!(matches!(rejected, Err(PortError::Config(_))));
    }

    #[test]
    fn test_parity_conversion() {
        let parity: serialport::Parity = Parity::Even.try_into().unwrap();
        assert_eq!(parity, serialport::Parity::Even);

        assert!(matches!(
            serialport::Parity::try_from(Parity::Mark),
            Err(PortError::Config(_))
        ));
        assert!(matches!(
            serialport::Parity::try_from(Parity::Space),
            Err(PortError::Config(_))
        ));
    }

    #[test]
    fn test_line_config_serde_roundtrip() {
        let config = LineConfig {
            data_rate: DataRate::B115200,
            data_bits: DataBits::Seven,
            stop_bits: StopBits::Two,
            parity: Parity::Odd,
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let roundtrip: LineConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(roundtrip, config);
    }

    #[test]
    fn test_line_config_snake_case_names() {
        let json = r#"{"data_rate":"b9600","data_bits":"eight","stop_bits":"one","parity":"none"}"#;
        let config: LineConfig = serde_json::from_str(json).expect("deserialize");
        assert_eq!(config, LineConfig::default());
    }
}
