use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use serframe_session::{ChannelSession, SessionConfig};
use serframe_transport::{SerialChannel, SerialSettings};

use crate::config::CliConfig;
use crate::exit::{config_error, session_error, CliError, CliResult, INTERNAL, USAGE};
use crate::output::OutputFormat;

pub mod echo;
pub mod listen;
pub mod read;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write every received frame back to the port.
    Echo(EchoArgs),
    /// Write a single payload.
    Send(SendArgs),
    /// Print frames as they arrive.
    Listen(ListenArgs),
    /// Read one frame and print it.
    Read(ReadArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Echo(args) => echo::run(args),
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Read(args) => read::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Port and reader settings shared by every command that touches a port.
#[derive(Args, Debug, Clone)]
pub struct PortArgs {
    /// Serial port path (e.g. /dev/ttyUSB0, COM3).
    pub port: String,
    /// Line speed. Default: 9600, or the config file value.
    #[arg(long, short = 'b')]
    pub baud: Option<u32>,
    /// Frame terminator as hex text (e.g. "0D 0A").
    #[arg(long, value_name = "HEX")]
    pub terminator: Option<String>,
    /// Maximum read attempts per frame.
    #[arg(long, value_name = "N")]
    pub attempts: Option<u32>,
    /// Delay between read attempts (e.g. 10ms, 1s).
    #[arg(long, value_name = "DURATION")]
    pub delay: Option<String>,
    /// JSON settings file with "serial" and "reader" sections.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl PortArgs {
    /// Merge the config file (if any) with command-line overrides.
    pub fn resolve(&self) -> CliResult<(SerialSettings, SessionConfig)> {
        let file = match &self.config {
            Some(path) => CliConfig::load(path)?,
            None => CliConfig::default(),
        };

        let mut serial = file.serial;
        serial.port_name = self.port.clone();
        if let Some(baud) = self.baud {
            serial.baud_rate = baud;
        }

        let mut reader = file.reader;
        if let Some(terminator) = &self.terminator {
            reader.terminator = Some(terminator.clone());
        }
        if let Some(attempts) = self.attempts {
            reader.max_attempts = attempts;
        }
        if let Some(delay) = &self.delay {
            reader.delay_ms = millis(parse_duration(delay)?);
        }

        let session = SessionConfig::from_options(&reader)
            .map_err(|err| config_error("invalid reader settings", err))?;
        Ok((serial, session))
    }

    /// Build a session for the port and open it.
    pub fn open_session(&self) -> CliResult<Arc<ChannelSession<SerialChannel>>> {
        let session = self.session()?;
        session
            .open()
            .map_err(|err| session_error("open failed", err))?;
        Ok(session)
    }

    /// Build a session for the port without opening it.
    pub fn session(&self) -> CliResult<Arc<ChannelSession<SerialChannel>>> {
        let (serial, config) = self.resolve()?;
        Ok(Arc::new(ChannelSession::with_config(
            SerialChannel::new(serial),
            config,
        )))
    }
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Exit after echoing N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Hex payload (e.g. "01 AA FF").
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
    /// Text payload, sent as UTF-8.
    #[arg(long, conflicts_with_all = ["hex", "file"])]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["hex", "data"])]
    pub file: Option<PathBuf>,
    /// Read one response frame and print it.
    #[arg(long)]
    pub wait: bool,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Exit after receiving N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    #[command(flatten)]
    pub port: PortArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `10ms`, `2s` or a bare number of seconds. Zero is allowed.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

pub(crate) fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serframe_frame::DataFormat;

    fn port_args(port: &str) -> PortArgs {
        PortArgs {
            port: port.to_string(),
            baud: None,
            terminator: None,
            attempts: None,
            delay: None,
            config: None,
        }
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("0ms").unwrap(), Duration::ZERO);
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("-1s").is_err());
    }

    #[test]
    fn resolve_defaults() {
        let (serial, session) = port_args("/dev/ttyUSB0").resolve().unwrap();
        assert_eq!(serial.port_name, "/dev/ttyUSB0");
        assert_eq!(serial.baud_rate, 9600);
        assert!(session.reader.terminator().is_none());
        assert_eq!(session.reader.budget().max_attempts(), 10);
        assert_eq!(session.reader.budget().delay(), Duration::from_millis(10));
        assert_eq!(session.data_format, DataFormat::Hex);
    }

    #[test]
    fn resolve_applies_flags() {
        let args = PortArgs {
            baud: Some(115_200),
            terminator: Some("0d0a".into()),
            attempts: Some(3),
            delay: Some("25ms".into()),
            ..port_args("COM3")
        };
        let (serial, session) = args.resolve().unwrap();
        assert_eq!(serial.baud_rate, 115_200);
        assert_eq!(
            session.reader.terminator().map(|t| t.as_bytes().to_vec()),
            Some(vec![0x0D, 0x0A])
        );
        assert_eq!(session.reader.budget().max_attempts(), 3);
        assert_eq!(session.reader.budget().delay(), Duration::from_millis(25));
    }

    #[test]
    fn resolve_rejects_bad_terminator_as_usage() {
        let args = PortArgs {
            terminator: Some("0".into()),
            ..port_args("COM3")
        };
        let err = args.resolve().unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn resolve_rejects_zero_attempts_as_usage() {
        let args = PortArgs {
            attempts: Some(0),
            ..port_args("COM3")
        };
        assert_eq!(args.resolve().unwrap_err().code, USAGE);
    }
}
