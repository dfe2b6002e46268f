use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::error::{ChannelError, Result};
use crate::traits::ByteChannel;

/// In-memory channel that replays scripted input chunks.
///
/// Inbound data is a queue of chunks. [`ByteChannel::bytes_available`]
/// reports the length of the front chunk only, so every poll of a reader
/// sees exactly one chunk. An empty chunk models one idle poll: it reports
/// zero bytes and is consumed by that poll.
///
/// Clones share state, so a test can keep one handle to feed data and
/// inspect writes while another handle is owned by a reader or session.
#[derive(Clone)]
pub struct MemoryChannel {
    name: String,
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    open: bool,
    inbound: VecDeque<Vec<u8>>,
    written: Vec<u8>,
    open_calls: usize,
    polls: usize,
    failing_opens: usize,
    failing_reads: usize,
    failing_polls: usize,
    failing_discards: usize,
    unplugged: bool,
    silent_opens: usize,
}

impl MemoryChannel {
    /// Create a closed channel.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MemoryState::default())),
        }
    }

    /// Create a channel that is already open.
    pub fn opened(name: impl Into<String>) -> Self {
        let channel = Self::new(name);
        channel.state().open = true;
        channel
    }

    /// Queue one inbound chunk.
    pub fn push_chunk(&self, bytes: impl AsRef<[u8]>) {
        self.state().inbound.push_back(bytes.as_ref().to_vec());
    }

    /// Queue one poll that reports no data.
    pub fn push_idle(&self) {
        self.state().inbound.push_back(Vec::new());
    }

    /// Number of queued chunks, idle polls included.
    pub fn pending_chunks(&self) -> usize {
        self.state().inbound.len()
    }

    /// Everything written to the channel so far.
    pub fn written(&self) -> Vec<u8> {
        self.state().written.clone()
    }

    /// How many times `open` was called.
    pub fn open_calls(&self) -> usize {
        self.state().open_calls
    }

    /// How many times `bytes_available` was called.
    pub fn polls(&self) -> usize {
        self.state().polls
    }

    /// Make the next `count` opens fail with an I/O error.
    pub fn fail_next_opens(&self, count: usize) {
        self.state().failing_opens = count;
    }

    /// Make the next `count` opens report success without opening.
    pub fn ignore_next_opens(&self, count: usize) {
        self.state().silent_opens = count;
    }

    /// Make the next `count` reads fail with an I/O error.
    pub fn fail_next_reads(&self, count: usize) {
        self.state().failing_reads = count;
    }

    /// Make the next `count` polls fail with an I/O error. The channel stays open.
    pub fn fail_next_polls(&self, count: usize) {
        self.state().failing_polls = count;
    }

    /// Make the next `count` buffer discards fail with an I/O error.
    pub fn fail_next_discards(&self, count: usize) {
        self.state().failing_discards = count;
    }

    /// Remove the device: the next poll fails and the channel closes itself.
    pub fn unplug(&self) {
        self.state().unplugged = true;
    }

    /// Close the link from the far side without going through `close`.
    pub fn drop_link(&self) {
        self.state().open = false;
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open_state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        let state = self.state();
        if !state.open {
            return Err(ChannelError::NotOpen {
                port: self.name.clone(),
            });
        }
        Ok(state)
    }
}

impl ByteChannel for MemoryChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_open(&self) -> bool {
        self.state().open
    }

    fn open(&mut self) -> Result<()> {
        let mut state = self.state();
        state.open_calls += 1;
        if state.failing_opens > 0 {
            state.failing_opens -= 1;
            return Err(ChannelError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{}: injected open failure", self.name),
            )));
        }
        if state.silent_opens > 0 {
            state.silent_opens -= 1;
            return Ok(());
        }
        state.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.state().open = false;
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize> {
        let mut state = self.open_state()?;
        state.polls += 1;
        if state.unplugged {
            state.unplugged = false;
            state.open = false;
            return Err(ChannelError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{}: device removed", self.name),
            )));
        }
        if state.failing_polls > 0 {
            state.failing_polls -= 1;
            return Err(ChannelError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                format!("{}: injected poll failure", self.name),
            )));
        }
        match state.inbound.front().map(Vec::len) {
            Some(0) => {
                state.inbound.pop_front();
                Ok(0)
            }
            Some(len) => Ok(len),
            None => Ok(0),
        }
    }

    fn read_buffer(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut state = self.open_state()?;
        if state.failing_reads > 0 {
            state.failing_reads -= 1;
            return Err(ChannelError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                format!("{}: injected read failure", self.name),
            )));
        }

        let Some(front) = state.inbound.front_mut() else {
            return Ok(0);
        };
        let n = front.len().min(buf.len());
        buf[..n].copy_from_slice(&front[..n]);
        front.drain(..n);
        if front.is_empty() {
            state.inbound.pop_front();
        }
        trace!(channel = %self.name, bytes = n, "memory channel read");
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let mut state = self.open_state()?;
        state.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.open_state().map(|_| ())
    }

    fn discard_input(&mut self) -> Result<()> {
        let mut state = self.open_state()?;
        if state.failing_discards > 0 {
            state.failing_discards -= 1;
            return Err(ChannelError::Io(std::io::Error::other(format!(
                "{}: injected discard failure",
                self.name
            ))));
        }
        state.inbound.clear();
        Ok(())
    }

    fn discard_output(&mut self) -> Result<()> {
        self.open_state().map(|_| ())
    }
}

impl std::fmt::Debug for MemoryChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("MemoryChannel")
            .field("name", &self.name)
            .field("open", &state.open)
            .field("pending_chunks", &state.inbound.len())
            .finish()
    }
}
