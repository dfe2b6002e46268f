use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::hex;

/// How a frame is rendered as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    /// Space-separated uppercase hex, e.g. `01 AA BB`.
    #[default]
    Hex,
    /// Payload decoded as UTF-8, invalid sequences replaced.
    Text,
}

/// One accumulated, possibly terminator-delimited run of received bytes.
///
/// A frame is never empty: a read that produced no bytes yields no frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// The received bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Consume the frame and return its payload.
    pub fn into_bytes(self) -> Bytes {
        self.payload
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Canonical hex rendering (`"01 AA BB"`).
    pub fn to_hex(&self) -> String {
        hex::encode_spaced(&self.payload).unwrap_or_default()
    }

    /// Render the payload in the given format.
    pub fn render(&self, format: DataFormat) -> String {
        match format {
            DataFormat::Hex => self.to_hex(),
            DataFormat::Text => String::from_utf8_lossy(&self.payload).into_owned(),
        }
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.payload
    }
}
