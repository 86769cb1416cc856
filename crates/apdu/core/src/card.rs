//! Card executor implementation
//!
//! The executor couples a transport with command encoding and response
//! parsing. It performs exactly one exchange per call and never interprets
//! status words.

use std::fmt;

use bytes::Bytes;
use tracing::trace;

use crate::command::{ApduCommand, Command};
use crate::error::Result;
use crate::response::Response;
use crate::transport::CardTransport;

/// Card executor over a transport
pub struct CardExecutor<T>
where
    T: CardTransport,
{
    /// The transport used for communication
    transport: T,
    /// The last raw response received
    last_response: Option<Bytes>,
}

impl<T> fmt::Debug for CardExecutor<T>
where
    T: CardTransport,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardExecutor")
            .field("transport", &self.transport)
            .field("last_response", &self.last_response)
            .finish()
    }
}

impl<T> CardExecutor<T>
where
    T: CardTransport,
{
    /// Create a new card executor with the given transport
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            last_response: None,
        }
    }

    /// Get a reference to the transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the transport
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the executor and return the transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Get the last raw response received
    pub const fn last_response_bytes(&self) -> Option<&Bytes> {
        self.last_response.as_ref()
    }

    /// Transmit raw command bytes, remembering the raw reply
    pub fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes> {
        let response = self.transport.transmit_raw(command)?;
        self.last_response = Some(response.clone());
        Ok(response)
    }

    /// Transmit a generic command and parse the reply
    pub fn transmit(&mut self, command: &Command) -> Result<Response> {
        self.execute(command)
    }

    /// Encode any typed command, exchange it, and parse the reply
    pub fn execute<C>(&mut self, command: &C) -> Result<Response>
    where
        C: ApduCommand + ?Sized,
    {
        let command_bytes = command.to_bytes()?;
        let response_bytes = self.transmit_raw(&command_bytes)?;
        let response = Response::from_bytes(&response_bytes)?;
        trace!(status = %response.status(), len = response.payload().len(), "Parsed response");
        Ok(response)
    }

    /// Reset the transport and forget the last response
    pub fn reset(&mut self) -> Result<()> {
        self.transport.reset()?;
        self.last_response = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transport::MockTransport;

    #[test]
    fn test_executor_basic_transmit() {
        let transport = MockTransport::with_response(Bytes::from_static(&[0x90, 0x00]));
        let mut executor = CardExecutor::new(transport);

        let response = executor.transmit_raw(&[0x00, 0xA4, 0x04, 0x00]).unwrap();
        assert_eq!(response.as_ref(), &[0x90, 0x00]);
        assert_eq!(executor.last_response_bytes(), Some(&response));
    }

    #[test]
    fn test_executor_parses_response() {
        let transport = MockTransport::with_response(Bytes::from_static(&[0xCA, 0xFE, 0x6A, 0x82]));
        let mut executor = CardExecutor::new(transport);

        let response = executor.transmit(&Command::new(0x00, 0xA4, 0x04, 0x00)).unwrap();
        assert_eq!(response.payload().as_ref(), &[0xCA, 0xFE]);
        assert_eq!(response.status().to_u16(), 0x6A82);
    }

    #[test]
    fn test_executor_surfaces_malformed_reply() {
        let transport = MockTransport::with_response(Bytes::from_static(&[0x90]));
        let mut executor = CardExecutor::new(transport);

        let err = executor.transmit(&Command::new(0x00, 0xB0, 0x00, 0x00)).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { length: 1 }));
    }
}
