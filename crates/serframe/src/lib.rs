//! Terminator-delimited framing for serial ports.
//!
//! serframe turns the fragmented byte stream of a serial line into frames:
//! bytes are accumulated until the trailing bytes match a configured
//! terminator and the line goes quiet, or until a bounded retry budget runs
//! out.
//!
//! # Crate Structure
//!
//! - [`transport`]: byte-channel abstraction (serial ports, in-memory links)
//! - [`frame`]: hex codec, frame reader with retry budget, payload writer
//! - [`session`]: channel lifecycle, notification dispatch, reopen-on-read

/// Re-export transport types.
pub mod transport {
    pub use serframe_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use serframe_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use serframe_session::*;
}
