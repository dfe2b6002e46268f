use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use serframe_frame::{hex, write_payload, DataFormat, Frame, FrameError, FrameReader};
use serframe_transport::{ByteChannel, ChannelError};
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::event::{ChannelEvent, ChannelFault, ChannelState, PinChange};
use crate::handler::{invoke_isolated, CallbackResult, Handlers};
use crate::watcher::Watcher;

/// A framed session over one byte channel.
///
/// The session owns the channel's lifecycle and serializes every read and
/// write through a single lock, so at most one read is in flight. Incoming
/// notifications are dispatched to at most one handler per kind.
///
/// Handler failures never escape [`notify`](Self::notify): an error returned
/// by a handler, or a panic inside one, is logged and forwarded to the
/// diagnostic handler, and the next notification is dispatched normally.
pub struct ChannelSession<C> {
    reader: Mutex<FrameReader<C>>,
    handlers: RwLock<Handlers>,
    watcher: Mutex<Option<Watcher>>,
    name: String,
    config: SessionConfig,
}

impl<C: ByteChannel> ChannelSession<C> {
    /// Create a session with default configuration. Does not open the channel.
    pub fn new(channel: C) -> Self {
        Self::with_config(channel, SessionConfig::default())
    }

    pub fn with_config(channel: C, config: SessionConfig) -> Self {
        let name = channel.name().to_owned();
        Self {
            reader: Mutex::new(FrameReader::with_config(channel, config.reader.clone())),
            handlers: RwLock::new(Handlers::default()),
            watcher: Mutex::new(None),
            name,
            config,
        }
    }

    /// Channel name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> ChannelState {
        if self.lock_reader().get_ref().is_open() {
            ChannelState::Open
        } else {
            ChannelState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == ChannelState::Open
    }

    /// Open the channel. Opening an already open channel does nothing.
    pub fn open(&self) -> Result<()> {
        let mut reader = self.lock_reader();
        if reader.get_ref().is_open() {
            debug!(channel = %self.name, "already open");
            return Ok(());
        }
        reader.get_mut().open()?;
        info!(channel = %self.name, "channel opened");
        Ok(())
    }

    /// Close the channel. Closing a closed channel does nothing.
    pub fn close(&self) -> Result<()> {
        let mut reader = self.lock_reader();
        if !reader.get_ref().is_open() {
            debug!(channel = %self.name, "already closed");
            return Ok(());
        }
        reader.get_mut().close()?;
        info!(channel = %self.name, "channel closed");
        Ok(())
    }

    /// Pull one frame. A closed channel is reported as an error, not reopened.
    pub fn read(&self) -> Result<Option<Frame>> {
        Ok(self.lock_reader().read_frame()?)
    }

    /// Pull one frame rendered in the configured [`DataFormat`].
    pub fn read_string(&self) -> Result<Option<String>> {
        self.read_as(self.config.data_format)
    }

    pub fn read_as(&self, format: DataFormat) -> Result<Option<String>> {
        Ok(self.lock_reader().read_string(format)?)
    }

    /// Write raw bytes, opening the channel first if needed.
    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut reader = self.lock_reader();
        if !reader.get_ref().is_open() {
            debug!(channel = %self.name, "opening channel for write");
            reader.get_mut().open()?;
        }
        write_payload(reader.get_mut(), bytes)?;
        debug!(channel = %self.name, bytes = bytes.len(), "payload written");
        Ok(())
    }

    /// Decode hex text and write it. Malformed text fails before the channel is touched.
    pub fn write_hex(&self, text: &str) -> Result<()> {
        let bytes = hex::decode(text).map_err(FrameError::from)?;
        self.write(&bytes)
    }

    pub fn write_text(&self, text: &str) -> Result<()> {
        self.write(text.as_bytes())
    }

    /// Register the handler for frames read on data notifications.
    pub fn on_frame<F>(&self, handler: F)
    where
        F: Fn(Option<Frame>) -> CallbackResult + Send + Sync + 'static,
    {
        self.handlers_mut().frame = Some(Arc::new(handler));
    }

    /// Register the handler for line faults.
    pub fn on_error<F>(&self, handler: F)
    where
        F: Fn(ChannelFault) -> CallbackResult + Send + Sync + 'static,
    {
        self.handlers_mut().error = Some(Arc::new(handler));
    }

    /// Register the handler for control-line changes.
    pub fn on_pin_change<F>(&self, handler: F)
    where
        F: Fn(PinChange) -> CallbackResult + Send + Sync + 'static,
    {
        self.handlers_mut().pin = Some(Arc::new(handler));
    }

    /// Register the handler that receives failures swallowed by [`notify`](Self::notify).
    pub fn on_diagnostic<F>(&self, handler: F)
    where
        F: Fn(&SessionError) + Send + Sync + 'static,
    {
        self.handlers_mut().diagnostic = Some(Arc::new(handler));
    }

    pub fn clear_handlers(&self) {
        *self.handlers_mut() = Handlers::default();
    }

    /// Deliver a channel notification.
    ///
    /// On [`ChannelEvent::DataReady`] a frame is read and passed to the frame
    /// handler. If the channel is closed it is reopened once; a failed or
    /// ineffective reopen is reported and the notification is dropped.
    pub fn notify(&self, event: ChannelEvent) {
        let outcome = match event {
            ChannelEvent::DataReady => self.dispatch_data(),
            ChannelEvent::Error(fault) => self.dispatch_fault(fault),
            ChannelEvent::PinChanged(change) => self.dispatch_pin(change),
        };
        if let Err(err) = outcome {
            self.report(err);
        }
    }

    /// Start polling the channel for input on a background thread.
    ///
    /// Starting an already running watcher does nothing. The watcher stops
    /// with [`stop_watcher`](Self::stop_watcher) or when the session is dropped.
    pub fn start_watcher(self: &Arc<Self>) -> Result<()>
    where
        C: 'static,
    {
        let mut slot = self.lock_watcher();
        if slot.as_ref().is_some_and(Watcher::is_running) {
            debug!(channel = %self.name, "watcher already running");
            return Ok(());
        }
        *slot = Some(Watcher::spawn(
            Arc::downgrade(self),
            self.config.poll_interval,
        )?);
        info!(channel = %self.name, interval = ?self.config.poll_interval, "watcher started");
        Ok(())
    }

    pub fn stop_watcher(&self) {
        let watcher = self.lock_watcher().take();
        if let Some(mut watcher) = watcher {
            watcher.stop();
            info!(channel = %self.name, "watcher stopped");
        }
    }

    pub fn is_watching(&self) -> bool {
        self.lock_watcher().as_ref().is_some_and(Watcher::is_running)
    }

    /// Whether an open channel has unread input. A closed channel has none.
    pub(crate) fn poll_input(&self) -> Result<bool> {
        let mut reader = self.lock_reader();
        if !reader.get_ref().is_open() {
            return Ok(false);
        }
        Ok(reader.get_mut().bytes_available()? > 0)
    }

    fn dispatch_data(&self) -> Result<()> {
        let Some(handler) = self.handlers().frame.clone() else {
            debug!(channel = %self.name, "no frame handler, leaving input unread");
            return Ok(());
        };
        let (frame, discard_failure) = self.read_for_dispatch()?;
        let outcome = invoke_isolated("frame", || handler(frame));
        if let Some(err) = discard_failure {
            self.report(err);
        }
        outcome
    }

    /// Read under the lock, reopening a closed channel at most once.
    ///
    /// A failed discard does not cost the frame already read; it is returned
    /// alongside it and reported once the lock is released.
    fn read_for_dispatch(&self) -> Result<(Option<Frame>, Option<SessionError>)> {
        let mut reader = self.lock_reader();
        let mut reopened = false;
        loop {
            if reader.get_ref().is_open() {
                let frame = reader.read_frame()?;
                let discard_failure = if self.config.discard_after_dispatch {
                    discard_buffers(reader.get_mut()).err().map(SessionError::from)
                } else {
                    None
                };
                return Ok((frame, discard_failure));
            }
            if reopened {
                return Err(SessionError::ReopenIneffective {
                    port: self.name.clone(),
                });
            }
            warn!(channel = %self.name, "data notification on closed channel, reopening");
            reader
                .get_mut()
                .open()
                .map_err(|source| SessionError::ReopenFailed {
                    port: self.name.clone(),
                    source,
                })?;
            reopened = true;
        }
    }

    fn dispatch_fault(&self, fault: ChannelFault) -> Result<()> {
        warn!(channel = %self.name, ?fault, "line fault");
        let handler = self.handlers().error.clone();
        match handler {
            Some(handler) => invoke_isolated("error", || handler(fault)),
            None => Ok(()),
        }
    }

    fn dispatch_pin(&self, change: PinChange) -> Result<()> {
        debug!(channel = %self.name, ?change, "pin changed");
        let handler = self.handlers().pin.clone();
        match handler {
            Some(handler) => invoke_isolated("pin", || handler(change)),
            None => Ok(()),
        }
    }

    /// Log a failure that cannot be returned and pass it to the diagnostic handler.
    pub(crate) fn report(&self, err: SessionError) {
        match &err {
            SessionError::Callback { handler, message } => {
                warn!(channel = %self.name, handler, %message, "handler failed");
            }
            _ => error!(channel = %self.name, error = %err, "channel failure"),
        }
        let Some(diagnostic) = self.handlers().diagnostic.clone() else {
            return;
        };
        let outcome = invoke_isolated("diagnostic", || {
            diagnostic(&err);
            Ok(())
        });
        if let Err(inner) = outcome {
            warn!(channel = %self.name, error = %inner, "diagnostic handler failed");
        }
    }

    fn lock_reader(&self) -> MutexGuard<'_, FrameReader<C>> {
        self.reader.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_watcher(&self) -> MutexGuard<'_, Option<Watcher>> {
        self.watcher.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handlers(&self) -> RwLockReadGuard<'_, Handlers> {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn handlers_mut(&self) -> RwLockWriteGuard<'_, Handlers> {
        self.handlers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clear both directions, attempting the second even if the first fails.
fn discard_buffers<C: ByteChannel>(channel: &mut C) -> std::result::Result<(), ChannelError> {
    let input = channel.discard_input();
    let output = channel.discard_output();
    input.and(output)
}

impl<C> std::fmt::Debug for ChannelSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelSession")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
