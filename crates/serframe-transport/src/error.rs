/// Errors that can occur in byte-channel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Failed to open the named port.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    /// The serial driver reported a fault.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// An I/O error occurred on the channel.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation requires an open channel.
    #[error("channel {port} is not open")]
    NotOpen { port: String },
}

impl ChannelError {
    /// The I/O error kind behind this error, if there is one.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            ChannelError::Io(err) => Some(err.kind()),
            ChannelError::Open { source, .. } | ChannelError::Serial(source) => {
                match source.kind() {
                    serialport::ErrorKind::Io(kind) => Some(kind),
                    _ => None,
                }
            }
            ChannelError::NotOpen { .. } => None,
        }
    }

    /// Whether the device is missing or has gone away.
    pub fn is_no_device(&self) -> bool {
        match self {
            ChannelError::Open { source, .. } | ChannelError::Serial(source) => {
                matches!(
                    source.kind(),
                    serialport::ErrorKind::NoDevice
                        | serialport::ErrorKind::Io(std::io::ErrorKind::NotFound)
                )
            }
            ChannelError::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            ChannelError::NotOpen { .. } => false,
        }
    }

    /// Whether the error means the device is no longer usable and the port
    /// should be released.
    pub fn is_disconnect(&self) -> bool {
        self.is_no_device()
            || matches!(
                self.io_kind(),
                Some(
                    std::io::ErrorKind::BrokenPipe
                        | std::io::ErrorKind::NotConnected
                        | std::io::ErrorKind::UnexpectedEof
                )
            )
    }
}

pub type Result<T> = std::result::Result<T, ChannelError>;
