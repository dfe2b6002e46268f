use serframe_transport::ChannelError;

/// Malformed hexadecimal text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexError {
    /// The digit count (spaces excluded) is odd.
    #[error("odd number of hex digits ({len})")]
    OddLength { len: usize },

    /// A character that is not a hex digit.
    #[error("invalid hex character {ch:?} at position {index}")]
    InvalidCharacter { ch: char, index: usize },
}

/// Rejected reader configuration. The reader is never constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The terminator hex text did not decode.
    #[error("invalid terminator: {0}")]
    InvalidTerminator(#[from] HexError),

    /// The attempt budget must allow at least one attempt.
    #[error("max attempts must be at least 1 (got {value})")]
    InvalidMaxAttempts { value: u32 },

    /// The per-attempt read capacity must be positive.
    #[error("read buffer capacity must be greater than zero")]
    InvalidReadCapacity,
}

/// Errors that can occur while reading or writing frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Invalid reader configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed hex payload.
    #[error("hex error: {0}")]
    Hex(#[from] HexError),

    /// The underlying channel reported a fault.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// The channel stopped accepting bytes mid-write.
    #[error("channel closed (incomplete write)")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
