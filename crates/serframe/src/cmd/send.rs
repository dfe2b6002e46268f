use std::fs;

use serframe_session::ChannelSession;
use serframe_transport::SerialChannel;

use crate::cmd::SendArgs;
use crate::exit::{io_error, session_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_frame, OutputFormat};

#[derive(Debug, PartialEq, Eq)]
enum Payload {
    Hex(String),
    Text(String),
    Bytes(Vec<u8>),
}

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let session = args.port.session()?;

    write_payload(&session, &payload).map_err(|err| session_error("send failed", err))?;
    tracing::info!(port = %session.name(), "payload sent");

    if args.wait {
        match session
            .read()
            .map_err(|err| session_error("receive failed", err))?
        {
            Some(frame) => print_frame(&frame, session.name(), format),
            None => eprintln!("no response from {}", session.name()),
        }
    }

    if let Err(err) = session.close() {
        tracing::warn!(error = %err, "close failed");
    }
    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Payload> {
    if let Some(hex) = &args.hex {
        return Ok(Payload::Hex(hex.clone()));
    }
    if let Some(data) = &args.data {
        return Ok(Payload::Text(data.clone()));
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map(Payload::Bytes)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(
        USAGE,
        "one of --hex, --data or --file is required",
    ))
}

/// Writes open the port on demand; malformed hex fails before it is opened.
fn write_payload(
    session: &ChannelSession<SerialChannel>,
    payload: &Payload,
) -> serframe_session::Result<()> {
    match payload {
        Payload::Hex(text) => session.write_hex(text),
        Payload::Text(text) => session.write_text(text),
        Payload::Bytes(bytes) => session.write(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::PortArgs;

    fn send_args() -> SendArgs {
        SendArgs {
            port: PortArgs {
                port: "/dev/null".into(),
                baud: None,
                terminator: None,
                attempts: None,
                delay: None,
                config: None,
            },
            hex: None,
            data: None,
            file: None,
            wait: false,
        }
    }

    #[test]
    fn hex_payload_is_kept_as_text() {
        let args = SendArgs {
            hex: Some("01 AA".into()),
            ..send_args()
        };
        assert_eq!(
            resolve_payload(&args).unwrap(),
            Payload::Hex("01 AA".into())
        );
    }

    #[test]
    fn data_payload_is_text() {
        let args = SendArgs {
            data: Some("AT\r".into()),
            ..send_args()
        };
        assert_eq!(resolve_payload(&args).unwrap(), Payload::Text("AT\r".into()));
    }

    #[test]
    fn missing_payload_is_usage_error() {
        let err = resolve_payload(&send_args()).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn missing_file_is_usage_error() {
        let args = SendArgs {
            file: Some("/nonexistent/serframe-payload.bin".into()),
            ..send_args()
        };
        assert_eq!(resolve_payload(&args).unwrap_err().code, USAGE);
    }
}
