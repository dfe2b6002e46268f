use serframe_frame::{ConfigError, FrameError};
use serframe_transport::ChannelError;

/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Channel-level error.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Frame-level error other than a channel fault.
    #[error("frame error: {0}")]
    Frame(FrameError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A data notification found the channel closed and reopening failed.
    #[error("failed to reopen {port}: {source}")]
    ReopenFailed {
        port: String,
        #[source]
        source: ChannelError,
    },

    /// Reopen reported success but the channel is still closed.
    #[error("channel {port} still closed after reopen")]
    ReopenIneffective { port: String },

    /// A registered handler returned an error or panicked.
    #[error("{handler} handler failed: {message}")]
    Callback {
        handler: &'static str,
        message: String,
    },

    /// The notification watcher could not be started.
    #[error("watcher error: {0}")]
    Watcher(String),
}

impl From<FrameError> for SessionError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Channel(err) => Self::Channel(err),
            other => Self::Frame(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
