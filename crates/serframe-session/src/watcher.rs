//! Background thread that turns pending input into data notifications.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serframe_transport::ByteChannel;
use tracing::{debug, trace};

use crate::error::{Result, SessionError};
use crate::event::ChannelEvent;
use crate::session::ChannelSession;

/// Default interval between input polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Handle to a running watcher thread. Stops the thread when dropped.
pub(crate) struct Watcher {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Watcher {
    /// Spawn a watcher for `session`.
    ///
    /// The thread holds only a weak reference, so it never keeps the session
    /// alive and exits once the last strong reference is gone.
    pub(crate) fn spawn<C>(session: Weak<ChannelSession<C>>, interval: Duration) -> Result<Self>
    where
        C: ByteChannel + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("serframe-watcher".into())
            .spawn(move || run_watch_loop(session, interval, flag))
            .map_err(|err| SessionError::Watcher(err.to_string()))?;

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the thread and wait for it, unless called from the thread itself.
    pub(crate) fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        let Some(handle) = self.handle.take() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            // Stopped from a handler running on the watcher; the loop exits on its own.
            return;
        }
        if handle.join().is_err() {
            debug!("watcher thread panicked");
        }
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_watch_loop<C>(session: Weak<ChannelSession<C>>, interval: Duration, running: Arc<AtomicBool>)
where
    C: ByteChannel + 'static,
{
    debug!("watcher started");
    // Set while polls keep failing, so one fault is reported once.
    let mut faulted = false;
    while running.load(Ordering::SeqCst) {
        let Some(session) = session.upgrade() else {
            break;
        };
        match session.poll_input() {
            Ok(pending) => {
                faulted = false;
                if pending {
                    trace!(channel = %session.name(), "input pending");
                    session.notify(ChannelEvent::DataReady);
                }
            }
            Err(err) if faulted => {
                trace!(channel = %session.name(), error = %err, "input poll still failing");
            }
            Err(err) => {
                faulted = true;
                session.report(err);
                if !session.is_open() {
                    // The channel released itself; one data notification runs the bounded reopen.
                    session.notify(ChannelEvent::DataReady);
                }
            }
        }
        drop(session);
        thread::sleep(interval);
    }
    debug!("watcher stopped");
}
