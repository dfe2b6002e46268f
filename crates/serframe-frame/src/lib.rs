//! Terminator-delimited framing over serial byte channels.
//!
//! This is the core value-add layer of serframe. A [`FrameReader`] turns a
//! fragmented byte stream into frames:
//! - bytes are pulled in chunks of at most the configured read capacity
//! - a frame ends when its trailing bytes equal the terminator and the line
//!   has gone idle, or when the retry budget is spent
//! - a read that collected nothing yields no frame rather than an error
//!
//! Terminators are configured as hex text, see [`hex`].

pub mod codec;
pub mod config;
pub mod error;
pub mod hex;
pub mod reader;
pub mod writer;

pub use codec::{DataFormat, Frame};
pub use config::{
    ReaderConfig, ReaderOptions, RetryBudget, Terminator, DEFAULT_ATTEMPT_DELAY,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_READ_CAPACITY,
};
pub use error::{ConfigError, FrameError, HexError, Result};
pub use reader::FrameReader;
pub use writer::write_payload;
