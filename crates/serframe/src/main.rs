mod cmd;
mod config;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "serframe", version, about = "Serial port framing CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "serframe",
            "send",
            "/dev/ttyUSB0",
            "--baud",
            "115200",
            "--hex",
            "01 AA FF",
            "--wait",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.port.port, "/dev/ttyUSB0");
                assert_eq!(args.port.baud, Some(115_200));
                assert_eq!(args.hex.as_deref(), Some("01 AA FF"));
                assert!(args.wait);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "serframe",
            "send",
            "/dev/ttyUSB0",
            "--hex",
            "01",
            "--data",
            "hello",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_listen_reader_flags() {
        let cli = Cli::try_parse_from([
            "serframe",
            "--format",
            "json",
            "listen",
            "COM3",
            "--terminator",
            "0D 0A",
            "--attempts",
            "20",
            "--delay",
            "5ms",
            "--count",
            "2",
        ])
        .expect("listen args should parse");

        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        match cli.command {
            Command::Listen(args) => {
                assert_eq!(args.port.terminator.as_deref(), Some("0D 0A"));
                assert_eq!(args.port.attempts, Some(20));
                assert_eq!(args.port.delay.as_deref(), Some("5ms"));
                assert_eq!(args.count, Some(2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_read_subcommand() {
        let cli = Cli::try_parse_from(["serframe", "read", "/dev/ttyS0", "--config", "port.json"])
            .expect("read args should parse");
        assert!(matches!(cli.command, Command::Read(_)));
    }
}
