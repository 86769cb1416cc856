//! APDU response parsing

pub mod status;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};
use status::StatusWord;

/// Parsed response APDU: payload followed by the status word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response data, everything before the status word (may be empty)
    pub payload: Bytes,
    /// Status word
    pub status: StatusWord,
}

impl Response {
    /// Create a response from its parts
    pub fn new(payload: impl Into<Bytes>, status: StatusWord) -> Self {
        Self {
            payload: payload.into(),
            status,
        }
    }

    /// Create a `9000` response with the given payload
    pub fn success(payload: impl Into<Bytes>) -> Self {
        Self::new(payload, status::common::SUCCESS)
    }

    /// Split a raw reply into payload and status word
    ///
    /// Only the length is checked; the status word is delivered as-is.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let Some(split) = bytes.len().checked_sub(2) else {
            return Err(Error::MalformedResponse {
                length: bytes.len(),
            });
        };

        let (payload, sw) = bytes.split_at(split);
        Ok(Self {
            payload: Bytes::copy_from_slice(payload),
            status: StatusWord::new(sw[0], sw[1]),
        })
    }

    /// Get the payload
    pub const fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Get the status word
    pub const fn status(&self) -> StatusWord {
        self.status
    }

    /// Check if the status word is `9000`
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Serialize back to the raw wire form
    pub fn to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::with_capacity(self.payload.len() + 2);
        buffer.put_slice(&self.payload);
        buffer.put_u8(self.status.sw1);
        buffer.put_u8(self.status.sw2);
        buffer.freeze()
    }
}

impl From<Response> for Bytes {
    fn from(response: Response) -> Self {
        response.to_bytes()
    }
}
