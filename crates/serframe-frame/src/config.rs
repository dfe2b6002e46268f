use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::codec::DataFormat;
use crate::error::ConfigError;
use crate::hex;

/// Default number of read attempts per frame.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default pause between read attempts.
pub const DEFAULT_ATTEMPT_DELAY: Duration = Duration::from_millis(10);

/// Default upper bound on bytes pulled from the channel per attempt.
pub const DEFAULT_READ_CAPACITY: usize = 4096;

/// Byte pattern that marks the end of a frame when it trails the
/// accumulated bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminator {
    bytes: Bytes,
}

impl Terminator {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Decode a terminator from hex text such as `"0D 0A"`.
    pub fn from_hex(text: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(hex::decode(text)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// An empty terminator never matches; frames end on budget only.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte-for-byte comparison against an extracted trailing slice.
    pub fn matches_tail(&self, tail: &[u8]) -> bool {
        !self.bytes.is_empty() && tail == self.bytes.as_ref()
    }

    /// Canonical hex rendering, `None` when empty.
    pub fn to_hex(&self) -> Option<String> {
        hex::encode_spaced(&self.bytes)
    }
}

/// Bounds on how long one read polls the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    max_attempts: u32,
    delay: Duration,
}

impl RetryBudget {
    /// `max_attempts` must be at least 1.
    pub fn new(max_attempts: u32, delay: Duration) -> Result<Self, ConfigError> {
        if max_attempts < 1 {
            return Err(ConfigError::InvalidMaxAttempts {
                value: max_attempts,
            });
        }
        Ok(Self {
            max_attempts,
            delay,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pause after every attempt.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Upper bound on the time spent sleeping during one read.
    pub fn max_total_delay(&self) -> Duration {
        self.delay.saturating_mul(self.max_attempts)
    }
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_ATTEMPT_DELAY,
        }
    }
}

/// Validated configuration for a [`FrameReader`](crate::FrameReader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    terminator: Option<Terminator>,
    budget: RetryBudget,
    read_buffer_capacity: usize,
}

impl ReaderConfig {
    pub fn new(terminator: Option<Terminator>, budget: RetryBudget) -> Self {
        Self {
            terminator,
            budget,
            read_buffer_capacity: DEFAULT_READ_CAPACITY,
        }
    }

    /// Build a configuration from raw values.
    ///
    /// Fails if the terminator is not valid hex or `max_attempts` is 0.
    pub fn configure(
        terminator_hex: Option<&str>,
        max_attempts: u32,
        delay: Duration,
    ) -> Result<Self, ConfigError> {
        let terminator = terminator_hex.map(Terminator::from_hex).transpose()?;
        let budget = RetryBudget::new(max_attempts, delay)?;
        Ok(Self::new(terminator, budget))
    }

    /// Override how many bytes one attempt may pull from the channel.
    pub fn with_read_buffer_capacity(mut self, capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::InvalidReadCapacity);
        }
        self.read_buffer_capacity = capacity;
        Ok(self)
    }

    pub fn terminator(&self) -> Option<&Terminator> {
        self.terminator.as_ref()
    }

    pub fn budget(&self) -> RetryBudget {
        self.budget
    }

    pub fn read_buffer_capacity(&self) -> usize {
        self.read_buffer_capacity
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self::new(None, RetryBudget::default())
    }
}

/// File/CLI form of the reader settings, validated by [`ReaderOptions::to_config`].
///
/// ```json
/// { "terminator": "0D 0A", "max_attempts": 20, "delay_ms": 5 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderOptions {
    /// Terminator as hex text.
    pub terminator: Option<String>,
    pub max_attempts: u32,
    pub delay_ms: u64,
    pub read_buffer_capacity: usize,
    /// Rendering used by string reads.
    pub data_format: DataFormat,
}

impl ReaderOptions {
    pub fn to_config(&self) -> Result<ReaderConfig, ConfigError> {
        ReaderConfig::configure(
            self.terminator.as_deref(),
            self.max_attempts,
            Duration::from_millis(self.delay_ms),
        )?
        .with_read_buffer_capacity(self.read_buffer_capacity)
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            terminator: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_ms: DEFAULT_ATTEMPT_DELAY.as_millis() as u64,
            read_buffer_capacity: DEFAULT_READ_CAPACITY,
            data_format: DataFormat::default(),
        }
    }
}
