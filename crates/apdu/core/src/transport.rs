//! Transport layer abstraction
//!
//! A transport moves raw APDU bytes to a card and returns the raw reply. It
//! knows nothing about command semantics or status words.

use std::collections::VecDeque;
use std::fmt;
use std::io;

use bytes::Bytes;
use tracing::{debug, instrument, trace};

/// Transport-level errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// I/O failure on the underlying device
    #[error("device I/O error: {0}")]
    Io(#[from] io::Error),

    /// The reader answered with something the transport cannot accept
    #[error("transport protocol error: {0}")]
    Protocol(String),

    /// No card or device connected
    #[error("transport not connected")]
    NotConnected,

    /// Error reported by the reader driver, kept intact for the caller to
    /// inspect with [`TransportError::downcast_ref`]
    #[error("reader error: {0}")]
    Device(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Wrap a driver-specific error
    pub fn device(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Device(Box::new(error))
    }

    /// The driver-specific error, if this is one of type `E`
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Device(error) => error.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Trait for card transports
pub trait CardTransport: Send + fmt::Debug {
    /// Transmit a raw command and return the raw reply
    #[instrument(level = "trace", skip(self), fields(transport = std::any::type_name::<Self>()))]
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        trace!(command = %hex::encode_upper(command), "Transmitting raw command");
        let response = self.do_transmit_raw(command);
        match &response {
            Ok(bytes) => trace!(response = %hex::encode_upper(bytes), "Received raw response"),
            Err(err) => debug!(error = %err, "Error during raw transmission"),
        }
        response
    }

    /// Internal implementation of `transmit_raw`
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError>;

    /// Check if the transport is connected to a card
    fn is_connected(&self) -> bool;

    /// Reset the transport
    fn reset(&mut self) -> Result<(), TransportError>;
}

impl<T: CardTransport + ?Sized> CardTransport for Box<T> {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        (**self).do_transmit_raw(command)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        (**self).reset()
    }
}

/// Scripted transport for tests
///
/// Replies are handed out in order; every command sent is recorded.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: VecDeque<Bytes>,
    commands: Vec<Bytes>,
}

impl MockTransport {
    /// Create a mock with no scripted replies
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that answers once with `response`
    pub fn with_response(response: Bytes) -> Self {
        Self::with_responses([response])
    }

    /// Create a mock that answers with `responses` in order
    pub fn with_responses(responses: impl IntoIterator<Item = Bytes>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            commands: Vec::new(),
        }
    }

    /// Queue another reply
    pub fn push_response(&mut self, response: Bytes) {
        self.responses.push_back(response);
    }

    /// Commands sent so far
    pub fn commands(&self) -> &[Bytes] {
        &self.commands
    }
}

impl CardTransport for MockTransport {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.commands.push(Bytes::copy_from_slice(command));
        self.responses
            .pop_front()
            .ok_or_else(|| TransportError::Other("no scripted response left".to_string()))
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_transport_replays_in_order() {
        let mut transport = MockTransport::with_responses([
            Bytes::from_static(&[0x61, 0x02]),
            Bytes::from_static(&[0x01, 0x02, 0x90, 0x00]),
        ]);

        let first = transport.transmit_raw(&[0x00, 0xA4, 0x04, 0x00]).unwrap();
        let second = transport.transmit_raw(&[0x00, 0xC0, 0x00, 0x00, 0x02]).unwrap();

        assert_eq!(first.as_ref(), &[0x61, 0x02]);
        assert_eq!(second.as_ref(), &[0x01, 0x02, 0x90, 0x00]);
        assert_eq!(transport.commands().len(), 2);
        assert!(transport.transmit_raw(&[0x00]).is_err());
    }

    #[test]
    fn test_device_error_keeps_source() {
        let err = TransportError::device(fmt::Error);
        assert!(err.downcast_ref::<fmt::Error>().is_some());
        assert!(err.downcast_ref::<io::Error>().is_none());
        assert!(err.to_string().starts_with("reader error: "));
        assert!(std::error::Error::source(&err).is_some());

        assert!(TransportError::NotConnected.downcast_ref::<fmt::Error>().is_none());
    }
}
