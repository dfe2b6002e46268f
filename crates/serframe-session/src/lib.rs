//! Session layer for serial framing.
//!
//! A [`ChannelSession`] wraps one byte channel and a frame reader. It can be
//! used pull-style (`read`, `write`) or push-style: register handlers and
//! deliver [`ChannelEvent`]s through [`ChannelSession::notify`], either by hand
//! or from the background watcher started with
//! [`ChannelSession::start_watcher`].

pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod session;
pub mod watcher;

pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use event::{ChannelEvent, ChannelFault, ChannelState, PinChange};
pub use handler::{CallbackError, CallbackResult};
pub use session::ChannelSession;
pub use watcher::DEFAULT_POLL_INTERVAL;
