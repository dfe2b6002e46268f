use std::fmt;
use std::io;

use serframe_frame::{ConfigError, FrameError};
use serframe_session::SessionError;
use serframe_transport::ChannelError;

// USAGE follows sysexits EX_USAGE; TIMEOUT and INTERNAL follow timeout(1).
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn channel_error(context: &str, err: ChannelError) -> CliError {
    let code = if err.is_no_device() {
        TRANSPORT_ERROR
    } else {
        match err.io_kind() {
            Some(io::ErrorKind::PermissionDenied) => PERMISSION_DENIED,
            Some(io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => TIMEOUT,
            Some(_) => TRANSPORT_ERROR,
            None if matches!(err, ChannelError::NotOpen { .. }) => FAILURE,
            None => TRANSPORT_ERROR,
        }
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn config_error(context: &str, err: ConfigError) -> CliError {
    CliError::new(USAGE, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Channel(err) => channel_error(context, err),
        FrameError::Config(err) => config_error(context, err),
        FrameError::Hex(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        FrameError::ChannelClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::Channel(err) => channel_error(context, err),
        SessionError::Frame(err) => frame_error(context, err),
        SessionError::Config(err) => config_error(context, err),
        SessionError::ReopenFailed { .. } | SessionError::ReopenIneffective { .. } => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        SessionError::Callback { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
        SessionError::Watcher(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

/// A diagnostic that means the port is gone for good, as seen by a
/// long-running command. Handler failures are not.
pub fn link_lost(err: &SessionError) -> Option<CliError> {
    match err {
        SessionError::Channel(_)
        | SessionError::ReopenFailed { .. }
        | SessionError::ReopenIneffective { .. } => {
            Some(CliError::new(TRANSPORT_ERROR, format!("port lost: {err}")))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serframe_frame::HexError;

    #[test]
    fn permission_denied_maps_to_its_code() {
        let err = channel_error(
            "open failed",
            ChannelError::Io(io::Error::from(io::ErrorKind::PermissionDenied)),
        );
        assert_eq!(err.code, PERMISSION_DENIED);
        assert!(err.message.starts_with("open failed: "));
    }

    #[test]
    fn missing_port_is_transport_error() {
        let err = channel_error(
            "open failed",
            ChannelError::Io(io::Error::from(io::ErrorKind::NotFound)),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn missing_input_file_is_usage() {
        let err = io_error(
            "failed reading payload.bin",
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn broken_link_is_transport_error() {
        let err = channel_error(
            "read failed",
            ChannelError::Io(io::Error::from(io::ErrorKind::BrokenPipe)),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn frame_errors_unwrap_channel_cause() {
        let err = frame_error(
            "read failed",
            FrameError::Channel(ChannelError::NotOpen {
                port: "COM3".into(),
            }),
        );
        assert_eq!(err.code, FAILURE);
        assert_eq!(err.message, "read failed: channel COM3 is not open");
    }

    #[test]
    fn bad_hex_is_data_invalid() {
        let err = frame_error("send failed", FrameError::Hex(HexError::OddLength { len: 3 }));
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn bad_terminator_is_usage() {
        let err = config_error(
            "invalid reader settings",
            ConfigError::InvalidMaxAttempts { value: 0 },
        );
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn reopen_failures_are_transport_errors() {
        let err = session_error(
            "listen failed",
            SessionError::ReopenIneffective {
                port: "/dev/ttyS0".into(),
            },
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn channel_diagnostics_end_listening() {
        let err = link_lost(&SessionError::Channel(ChannelError::Io(io::Error::from(
            io::ErrorKind::BrokenPipe,
        ))))
        .expect("channel faults should end listening");
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert!(err.message.starts_with("port lost: "));

        let callback = SessionError::Callback {
            handler: "frame",
            message: "receiver gone".into(),
        };
        assert!(link_lost(&callback).is_none());
    }
}
