//! Byte-channel abstraction for serial communication.
//!
//! Provides a unified interface over the endpoints a framed reader pulls from:
//! - Serial ports, via the `serialport` crate
//! - In-memory scripted links, for tests and host integration
//!
//! This is the lowest layer of serframe. Everything else builds on top of
//! the [`ByteChannel`] trait provided here.

pub mod error;
pub mod memory;
pub mod serial;
pub mod traits;

pub use error::{ChannelError, Result};
pub use memory::MemoryChannel;
pub use serial::{DataBits, FlowControl, Parity, SerialChannel, SerialSettings, StopBits};
pub use traits::ByteChannel;
