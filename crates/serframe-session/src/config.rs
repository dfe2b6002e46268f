use std::time::Duration;

use serframe_frame::{ConfigError, DataFormat, ReaderConfig, ReaderOptions};

use crate::watcher::DEFAULT_POLL_INTERVAL;

/// Configuration for a [`ChannelSession`](crate::ChannelSession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Terminator, retry budget and read capacity for every read.
    pub reader: ReaderConfig,
    /// Rendering used by [`read_string`](crate::ChannelSession::read_string).
    pub data_format: DataFormat,
    /// How often the watcher polls for pending input.
    pub poll_interval: Duration,
    /// Drop both channel buffers after each notification-driven read.
    pub discard_after_dispatch: bool,
}

impl SessionConfig {
    /// Build from file/CLI reader options, keeping session defaults.
    pub fn from_options(options: &ReaderOptions) -> Result<Self, ConfigError> {
        Ok(Self {
            reader: options.to_config()?,
            data_format: options.data_format,
            ..Self::default()
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reader: ReaderConfig::default(),
            data_format: DataFormat::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            discard_after_dispatch: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(20));
        assert!(!config.discard_after_dispatch);
        assert_eq!(config.data_format, DataFormat::Hex);
        assert!(config.reader.terminator().is_none());
    }

    #[test]
    fn from_options_carries_reader_settings() {
        let options = ReaderOptions {
            terminator: Some("0D 0A".into()),
            max_attempts: 3,
            data_format: DataFormat::Text,
            ..ReaderOptions::default()
        };
        let config = SessionConfig::from_options(&options).unwrap();
        assert_eq!(
            config.reader.terminator().map(|t| t.as_bytes().to_vec()),
            Some(vec![0x0D, 0x0A])
        );
        assert_eq!(config.reader.budget().max_attempts(), 3);
        assert_eq!(config.data_format, DataFormat::Text);
    }

    #[test]
    fn from_options_rejects_bad_terminator() {
        let options = ReaderOptions {
            terminator: Some("0".into()),
            ..ReaderOptions::default()
        };
        assert!(matches!(
            SessionConfig::from_options(&options),
            Err(ConfigError::InvalidTerminator(_))
        ));
    }
}
