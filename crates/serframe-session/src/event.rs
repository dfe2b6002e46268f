//! Notifications raised by a channel and the session state they act on.

use serde::{Deserialize, Serialize};

/// Open/closed state of a session's channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelState {
    Closed,
    Open,
}

/// Line fault reported by the channel driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelFault {
    /// Framing error detected by the hardware.
    Frame,
    /// Character-buffer overrun; the next character is lost.
    Overrun,
    /// Input buffer overflow.
    RxOver,
    /// Parity error detected by the hardware.
    RxParity,
    /// Output buffer full.
    TxFull,
}

/// Control-line or line-condition change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinChange {
    CtsChanged,
    DsrChanged,
    CdChanged,
    Ring,
    Break,
}

/// A notification delivered to [`ChannelSession::notify`](crate::ChannelSession::notify).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Bytes are waiting in the input buffer.
    DataReady,
    /// The driver reported a line fault.
    Error(ChannelFault),
    /// A control line changed.
    PinChanged(PinChange),
}
