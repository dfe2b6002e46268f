use std::io::ErrorKind;

use serframe_transport::{ByteChannel, ChannelError};

use crate::error::{FrameError, Result};

/// Write a complete payload and flush (blocking).
///
/// Retries on `Interrupted` and `WouldBlock`; a channel that accepts zero
/// bytes is treated as closed.
pub fn write_payload<C: ByteChannel + ?Sized>(channel: &mut C, payload: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < payload.len() {
        match channel.write(&payload[offset..]) {
            Ok(0) => return Err(FrameError::ChannelClosed),
            Ok(n) => offset += n,
            Err(err) if is_retryable(&err) => continue,
            Err(err) => return Err(FrameError::Channel(err)),
        }
    }

    flush(channel)
}

fn flush<C: ByteChannel + ?Sized>(channel: &mut C) -> Result<()> {
    loop {
        match channel.flush() {
            Ok(()) => return Ok(()),
            Err(err) if is_retryable(&err) => continue,
            Err(err) => return Err(FrameError::Channel(err)),
        }
    }
}

fn is_retryable(err: &ChannelError) -> bool {
    matches!(
        err.io_kind(),
        Some(ErrorKind::Interrupted) | Some(ErrorKind::WouldBlock)
    )
}
