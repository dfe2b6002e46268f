use std::fs;
use std::path::Path;

use serde::Deserialize;
use serframe_frame::ReaderOptions;
use serframe_transport::SerialSettings;

use crate::exit::{io_error, CliError, CliResult, USAGE};

/// Settings file accepted by `--config`.
///
/// ```json
/// {
///   "serial": { "baud_rate": 115200, "parity": "even" },
///   "reader": { "terminator": "0D 0A", "max_attempts": 20, "delay_ms": 5 }
/// }
/// ```
///
/// The port itself always comes from the command line, so a `port_name` in
/// the file is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub serial: SerialSettings,
    pub reader: ReaderOptions,
}

impl CliConfig {
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        Self::parse(&text)
            .map_err(|err| CliError::new(USAGE, format!("invalid config {}: {err}", path.display())))
    }

    fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serframe_transport::Parity;

    #[test]
    fn empty_object_gives_defaults() {
        let config = CliConfig::parse("{}").unwrap();
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.reader, ReaderOptions::default());
    }

    #[test]
    fn sections_are_parsed() {
        let config = CliConfig::parse(
            r#"{
                "serial": { "baud_rate": 115200, "parity": "even" },
                "reader": { "terminator": "0D 0A", "max_attempts": 20 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.serial.parity, Parity::Even);
        assert_eq!(config.reader.terminator.as_deref(), Some("0D 0A"));
        assert_eq!(config.reader.max_attempts, 20);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(CliConfig::parse(r#"{ "reader": { "terminater": "0A" } }"#).is_err());
        assert!(CliConfig::parse(r#"{ "extra": 1 }"#).is_err());
    }
}
