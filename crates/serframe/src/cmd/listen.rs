use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use serframe_frame::Frame;
use serframe_session::ChannelSession;
use serframe_transport::SerialChannel;

use crate::cmd::{install_ctrlc_handler, ListenArgs};
use crate::exit::{link_lost, session_error, CliError, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let session = args.port.open_session()?;
    let port = session.name().to_string();

    pump_frames(&session, args.count, |frame| {
        print_frame(frame, &port, format);
        Ok(())
    })?;

    Ok(SUCCESS)
}

enum Delivery {
    Frame(Frame),
    Lost(CliError),
}

/// Run the session watcher and hand each received frame to `handle` on the
/// calling thread. Returns after `count` frames, on Ctrl-C, on the first
/// error from `handle`, or with an error once the port is lost.
pub(crate) fn pump_frames<F>(
    session: &Arc<ChannelSession<SerialChannel>>,
    count: Option<usize>,
    mut handle: F,
) -> CliResult<()>
where
    F: FnMut(&Frame) -> CliResult<()>,
{
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let (tx, rx) = mpsc::channel::<Delivery>();
    let lost_tx = tx.clone();
    session.on_frame(move |frame| {
        if let Some(frame) = frame {
            tx.send(Delivery::Frame(frame))?;
        }
        Ok(())
    });
    session.on_diagnostic(move |err| {
        if let Some(lost) = link_lost(err) {
            let _ = lost_tx.send(Delivery::Lost(lost));
        }
    });
    session
        .start_watcher()
        .map_err(|err| session_error("watcher failed", err))?;
    tracing::info!(port = %session.name(), "listening");

    let mut handled = 0usize;
    let outcome = loop {
        if !running.load(Ordering::SeqCst) {
            break Ok(());
        }
        if count.is_some_and(|count| handled >= count) {
            break Ok(());
        }
        let frame = match rx.recv_timeout(SHUTDOWN_POLL) {
            Ok(Delivery::Frame(frame)) => frame,
            Ok(Delivery::Lost(err)) => break Err(err),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break Ok(()),
        };
        if let Err(err) = handle(&frame) {
            break Err(err);
        }
        handled = handled.saturating_add(1);
    };

    session.stop_watcher();
    session.clear_handlers();
    if let Err(err) = session.close() {
        tracing::warn!(error = %err, "close failed");
    }
    outcome
}
