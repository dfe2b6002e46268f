use std::thread;

use bytes::BytesMut;
use serframe_transport::ByteChannel;
use tracing::{debug, trace};

use crate::codec::{DataFormat, Frame};
use crate::config::ReaderConfig;
use crate::error::Result;

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Pulls terminator-delimited frames out of a [`ByteChannel`].
///
/// Each read polls the channel at most `max_attempts` times, sleeping the
/// configured delay after every attempt, and stops early once the bytes
/// accumulated so far end with the terminator and nothing more is waiting.
/// Without a terminator a read always spends its whole budget.
pub struct FrameReader<C> {
    inner: C,
    config: ReaderConfig,
}

/// Bytes gathered by one read, with how it ended.
#[derive(Debug)]
struct Accumulated {
    payload: BytesMut,
    attempts: u32,
    terminated: bool,
}

impl<C: ByteChannel> FrameReader<C> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: C) -> Self {
        Self::with_config(inner, ReaderConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: C, config: ReaderConfig) -> Self {
        Self { inner, config }
    }

    /// Read the best available frame (blocking for at most the retry budget).
    ///
    /// Returns `Ok(None)` when no bytes arrived before the budget ran out.
    /// Channel faults are returned as [`FrameError::Channel`](crate::FrameError::Channel).
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        let acc = self.accumulate()?;

        debug!(
            channel = %self.inner.name(),
            attempts = acc.attempts,
            bytes = acc.payload.len(),
            terminated = acc.terminated,
            "read finished"
        );

        if acc.payload.is_empty() {
            return Ok(None);
        }
        Ok(Some(Frame::new(acc.payload.freeze())))
    }

    /// Read a frame and render it as text.
    pub fn read_string(&mut self, format: DataFormat) -> Result<Option<String>> {
        Ok(self.read_frame()?.map(|frame| frame.render(format)))
    }

    fn accumulate(&mut self) -> Result<Accumulated> {
        let budget = self.config.budget();
        let capacity = self.config.read_buffer_capacity();
        let terminator = self.config.terminator().filter(|t| !t.is_empty());

        let mut payload = BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY);
        let mut chunk = vec![0u8; capacity];
        let mut attempts = 0u32;
        let mut found = false;

        while attempts < budget.max_attempts() {
            let available = self.inner.bytes_available()?;
            if available == 0 && found {
                break;
            }

            let wanted = available.min(capacity);
            let read = if wanted > 0 {
                self.inner.read_buffer(&mut chunk[..wanted])?
            } else {
                0
            };
            payload.extend_from_slice(&chunk[..read]);

            // The latest chunk is the tail of `payload`, so one trailing slice
            // covers a terminator inside the chunk and one split across chunks.
            if let Some(terminator) = terminator {
                let len = terminator.len();
                if payload.len() >= len {
                    found = terminator.matches_tail(&payload[payload.len() - len..]);
                }
            }

            trace!(
                attempt = attempts + 1,
                available,
                read,
                total = payload.len(),
                terminated = found,
                "read attempt"
            );

            if !budget.delay().is_zero() {
                thread::sleep(budget.delay());
            }
            attempts += 1;
        }

        Ok(Accumulated {
            payload,
            attempts,
            terminated: found,
        })
    }

    /// Borrow the underlying channel.
    pub fn get_ref(&self) -> &C {
        &self.inner
    }

    /// Mutably borrow the underlying channel.
    pub fn get_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Consume the reader and return the inner channel.
    pub fn into_inner(self) -> C {
        self.inner
    }

    /// Replace the configuration used by subsequent reads.
    pub fn set_config(&mut self, config: ReaderConfig) {
        self.config = config;
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}
