use crate::error::Result;

/// A byte-oriented, open/closable communication endpoint.
///
/// This is the fundamental I/O abstraction every higher layer reads from.
/// [`SerialChannel`](crate::SerialChannel) drives a real serial port;
/// [`MemoryChannel`](crate::MemoryChannel) replays scripted input.
///
/// Everything except `is_open`, `open`, `close` and `name` fails with
/// [`ChannelError::NotOpen`](crate::ChannelError::NotOpen) on a closed channel.
pub trait ByteChannel: Send {
    /// Human-readable channel name (port path) for diagnostics.
    fn name(&self) -> &str;

    /// Whether the channel is currently open.
    fn is_open(&self) -> bool;

    /// Open the channel.
    fn open(&mut self) -> Result<()>;

    /// Close the channel.
    fn close(&mut self) -> Result<()>;

    /// Number of received bytes waiting in the input buffer.
    fn bytes_available(&mut self) -> Result<usize>;

    /// Read up to `buf.len()` buffered bytes, returning how many were read.
    ///
    /// May return fewer bytes than requested, including zero.
    fn read_buffer(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write bytes, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Flush pending output.
    fn flush(&mut self) -> Result<()>;

    /// Drop everything waiting in the input buffer.
    fn discard_input(&mut self) -> Result<()>;

    /// Drop everything waiting in the output buffer.
    fn discard_output(&mut self) -> Result<()>;
}
