use crate::cmd::ReadArgs;
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: ReadArgs, format: OutputFormat) -> CliResult<i32> {
    let session = args.port.open_session()?;

    let frame = session
        .read()
        .map_err(|err| session_error("read failed", err))?;
    match frame {
        Some(frame) => print_frame(&frame, session.name(), format),
        None => eprintln!("no data received from {}", session.name()),
    }

    if let Err(err) = session.close() {
        tracing::warn!(error = %err, "close failed");
    }
    Ok(SUCCESS)
}
