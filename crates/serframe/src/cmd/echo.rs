use crate::cmd::listen::pump_frames;
use crate::cmd::EchoArgs;
use crate::exit::{session_error, CliResult, SUCCESS};

pub fn run(args: EchoArgs) -> CliResult<i32> {
    let session = args.port.open_session()?;
    let writer = session.clone();

    pump_frames(&session, args.count, |frame| {
        tracing::info!(size = frame.len(), hex = %frame.to_hex(), "echoing frame");
        writer
            .write(frame.as_bytes())
            .map_err(|err| session_error("echo send failed", err))
    })?;

    Ok(SUCCESS)
}
