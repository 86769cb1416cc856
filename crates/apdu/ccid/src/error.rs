//! Error types for CCID framing and transport

use std::io;

use idcard_apdu_core::TransportError;

use crate::frame::IccStatus;

/// CCID-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CcidError {
    /// Payload does not fit in the frame's length field
    #[error("payload of {length} bytes exceeds the frame maximum of {max} bytes")]
    PayloadTooLarge {
        /// Payload length
        length: usize,
        /// Largest payload the frame can carry
        max: usize,
    },

    /// Fewer bytes than the header or declared length requires
    #[error("truncated frame: need {needed} bytes, got {available}")]
    Truncated {
        /// Bytes required
        needed: usize,
        /// Bytes received
        available: usize,
    },

    /// More bytes than the header declares
    #[error("frame length mismatch: header declares {declared} payload bytes, got {actual}")]
    LengthMismatch {
        /// Payload length from the header
        declared: usize,
        /// Payload bytes received
        actual: usize,
    },

    /// Reply message type does not answer the outstanding instruction
    #[error("unexpected message type 0x{found:02X}, expected 0x{expected:02X}")]
    UnexpectedMessageType {
        /// Message type the instruction expects
        expected: u8,
        /// Message type received
        found: u8,
    },

    /// Reply belongs to another request
    #[error("sequence mismatch: sent {expected}, reply carries {found}")]
    SequenceMismatch {
        /// Sequence number sent
        expected: u8,
        /// Sequence number received
        found: u8,
    },

    /// Reply comes from another slot
    #[error("slot mismatch: addressed slot {expected}, reply from slot {found}")]
    SlotMismatch {
        /// Slot addressed
        expected: u8,
        /// Slot in the reply
        found: u8,
    },

    /// Reader reports the instruction failed
    #[error("reader reported command failure 0x{error:02X} (card {icc_status})")]
    CommandFailed {
        /// bError slot error register
        error: u8,
        /// Card presence state at the time of failure
        icc_status: IccStatus,
    },

    /// Reserved command status bits set
    #[error("invalid command status in reply status byte 0x{0:02X}")]
    InvalidStatus(u8),

    /// Reader kept asking for more time
    #[error("reader requested more than {0} consecutive time extensions")]
    TooManyTimeExtensions(u32),

    /// USB I/O failure
    #[error("USB I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<CcidError> for TransportError {
    fn from(error: CcidError) -> Self {
        match error {
            CcidError::Io(e) => Self::Io(e),
            other => Self::device(other),
        }
    }
}
