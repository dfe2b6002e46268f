use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serialport::{ClearBuffer, SerialPort};
use tracing::{debug, info, warn};

use crate::error::{ChannelError, Result};
use crate::traits::ByteChannel;

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataBits {
    Five,
    Six,
    Seven,
    #[default]
    Eight,
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopBits {
    #[default]
    One,
    Two,
}

/// Handshake (flow control) mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControl {
    #[default]
    None,
    Software,
    Hardware,
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

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }
}

impl From<StopBits> for serialport::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
        }
    }
}

impl From<FlowControl> for serialport::FlowControl {
    fn from(flow: FlowControl) -> Self {
        match flow {
            FlowControl::None => serialport::FlowControl::None,
            FlowControl::Software => serialport::FlowControl::Software,
            FlowControl::Hardware => serialport::FlowControl::Hardware,
        }
    }
}

/// Line settings applied when a [`SerialChannel`] is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerialSettings {
    /// Port path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub port_name: String,
    /// Line speed. Default: 9600.
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
    /// Driver-level I/O timeout in milliseconds. Default: 10.
    pub timeout_ms: u64,
}

impl SerialSettings {
    /// Default settings for the given port.
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            ..Self::default()
        }
    }

    /// Driver-level I/O timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: 9600,
            data_bits: DataBits::default(),
            parity: Parity::default(),
            stop_bits: StopBits::default(),
            flow_control: FlowControl::default(),
            timeout_ms: 10,
        }
    }
}

/// Serial port channel backed by the `serialport` crate.
///
/// Created closed; the port is only acquired by [`ByteChannel::open`] and is
/// released again by [`ByteChannel::close`] or on drop.
pub struct SerialChannel {
    settings: SerialSettings,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialChannel {
    /// Create a closed channel for the given settings.
    pub fn new(settings: SerialSettings) -> Self {
        Self {
            settings,
            port: None,
        }
    }

    /// Settings used for the next open.
    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        let name = &self.settings.port_name;
        self.port
            .as_mut()
            .ok_or_else(|| ChannelError::NotOpen { port: name.clone() })
    }

    /// Drop the port when `result` shows the device is gone, so the channel
    /// reports closed and can be reopened.
    fn release_on_disconnect<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_disconnect() && self.port.take().is_some() {
                warn!(port = %self.settings.port_name, error = %err, "device lost, port released");
            }
        }
        result
    }
}

fn read_port(port: &mut Box<dyn SerialPort>, buf: &mut [u8]) -> Result<usize> {
    loop {
        match port.read(buf) {
            Ok(n) => return Ok(n),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::TimedOut => return Ok(0),
            Err(err) => return Err(ChannelError::Io(err)),
        }
    }
}

impl ByteChannel for SerialChannel {
    fn name(&self) -> &str {
        &self.settings.port_name
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn open(&mut self) -> Result<()> {
        if self.port.is_some() {
            return Ok(());
        }

        let s = &self.settings;
        let port = serialport::new(&s.port_name, s.baud_rate)
            .data_bits(s.data_bits.into())
            .parity(s.parity.into())
            .stop_bits(s.stop_bits.into())
            .flow_control(s.flow_control.into())
            .timeout(s.timeout())
            .open()
            .map_err(|source| ChannelError::Open {
                port: s.port_name.clone(),
                source,
            })?;

        info!(port = %s.port_name, baud = s.baud_rate, "opened serial port");
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.port.take().is_some() {
            debug!(port = %self.settings.port_name, "closed serial port");
        }
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize> {
        let result = self
            .port_mut()
            .and_then(|port| Ok(port.bytes_to_read()? as usize));
        self.release_on_disconnect(result)
    }

    fn read_buffer(&mut self, buf: &mut [u8]) -> Result<usize> {
        let result = self.port_mut().and_then(|port| read_port(port, buf));
        self.release_on_disconnect(result)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let result = self
            .port_mut()
            .and_then(|port| Ok(port.write(buf)?));
        self.release_on_disconnect(result)
    }

    fn flush(&mut self) -> Result<()> {
        let result = self.port_mut().and_then(|port| Ok(port.flush()?));
        self.release_on_disconnect(result)
    }

    fn discard_input(&mut self) -> Result<()> {
        Ok(self.port_mut()?.clear(ClearBuffer::Input)?)
    }

    fn discard_output(&mut self) -> Result<()> {
        Ok(self.port_mut()?.clear(ClearBuffer::Output)?)
    }
}

impl std::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("port", &self.settings.port_name)
            .field("open", &self.port.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_defaults_match_classic_line_setup() {
        let settings = SerialSettings::new("/dev/ttyUSB0");
        assert_eq!(settings.port_name, "/dev/ttyUSB0");
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.data_bits, DataBits::Eight);
        assert_eq!(settings.parity, Parity::None);
        assert_eq!(settings.stop_bits, StopBits::One);
        assert_eq!(settings.flow_control, FlowControl::None);
        assert_eq!(settings.timeout(), Duration::from_millis(10));
    }

    #[test]
    fn settings_deserialize_with_partial_fields() {
        let settings: SerialSettings = serde_json::from_str(
            r#"{"port_name":"COM3","baud_rate":115200,"parity":"even","flow_control":"hardware"}"#,
        )
        .unwrap();

        assert_eq!(settings.port_name, "COM3");
        assert_eq!(settings.baud_rate, 115200);
        assert_eq!(settings.parity, Parity::Even);
        assert_eq!(settings.flow_control, FlowControl::Hardware);
        assert_eq!(settings.stop_bits, StopBits::One);
    }

    #[test]
    fn settings_reject_unknown_fields() {
        let result = serde_json::from_str::<SerialSettings>(r#"{"port":"COM3"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn enum_conversions_map_to_serialport() {
        assert!(matches!(
            serialport::DataBits::from(DataBits::Seven),
            serialport::DataBits::Seven
        ));
        assert!(matches!(
            serialport::Parity::from(Parity::Odd),
            serialport::Parity::Odd
        ));
        assert!(matches!(
            serialport::StopBits::from(StopBits::Two),
            serialport::StopBits::Two
        ));
        assert!(matches!(
            serialport::FlowControl::from(FlowControl::Software),
            serialport::FlowControl::Software
        ));
    }

    #[test]
    fn closed_channel_rejects_io() {
        let mut channel = SerialChannel::new(SerialSettings::new("/dev/serframe-missing"));
        assert!(!channel.is_open());

        let err = channel.bytes_available().unwrap_err();
        assert!(matches!(err, ChannelError::NotOpen { ref port } if port == "/dev/serframe-missing"));

        let mut buf = [0u8; 4];
        assert!(matches!(
            channel.read_buffer(&mut buf),
            Err(ChannelError::NotOpen { .. })
        ));
        assert!(matches!(
            channel.write(b"x"),
            Err(ChannelError::NotOpen { .. })
        ));
    }

    #[test]
    fn close_when_closed_is_ok() {
        let mut channel = SerialChannel::new(SerialSettings::new("/dev/serframe-missing"));
        channel.close().unwrap();
        channel.close().unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn open_missing_port_reports_port_name() {
        let mut channel = SerialChannel::new(SerialSettings::new("/dev/serframe-missing"));
        let err = channel.open().unwrap_err();
        assert!(matches!(err, ChannelError::Open { ref port, .. } if port == "/dev/serframe-missing"));
        assert!(!channel.is_open());
    }
}
