//! CCID message framing
//!
//! Every CCID message, in either direction, is a 10-byte header followed by
//! `length` payload bytes:
//!
//! ```text
//! MessageType(1) | Length(4, LE) | Slot(1) | Sequence(1) | Param(3) | Payload
//! ```
//!
//! The framing layer never looks inside the payload.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::CcidError;

/// Size of the fixed CCID header
pub const HEADER_LEN: usize = 10;

/// Largest payload the 32-bit length field can describe
pub const MAX_PAYLOAD_LEN: usize = u32::MAX as usize;

/// bMessageType values
pub mod message_type {
    /// PC_to_RDR_IccPowerOn
    pub const ICC_POWER_ON: u8 = 0x62;
    /// PC_to_RDR_IccPowerOff
    pub const ICC_POWER_OFF: u8 = 0x63;
    /// PC_to_RDR_GetSlotStatus
    pub const GET_SLOT_STATUS: u8 = 0x65;
    /// PC_to_RDR_XfrBlock
    pub const XFR_BLOCK: u8 = 0x6F;
    /// RDR_to_PC_DataBlock
    pub const DATA_BLOCK: u8 = 0x80;
    /// RDR_to_PC_SlotStatus
    pub const SLOT_STATUS: u8 = 0x81;
}

/// wLevelParameter of an XfrBlock, for APDU chaining at the reader level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelParameter {
    /// The command APDU begins and ends in this block
    #[default]
    BeginAndEnd,
    /// Begins here, continues in the next block
    Begin,
    /// Ends in this block
    End,
    /// Continues in the next block
    Continue,
    /// Empty block asking the reader to continue its response
    EmptyContinue,
}

impl LevelParameter {
    /// Wire value
    pub const fn value(self) -> u16 {
        match self {
            Self::BeginAndEnd => 0x0000,
            Self::Begin => 0x0001,
            Self::End => 0x0002,
            Self::Continue => 0x0003,
            Self::EmptyContinue => 0x0010,
        }
    }
}

/// bmICCStatus bits of a reply status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IccStatus {
    /// Card present and active
    Active,
    /// Card present but not powered
    PresentInactive,
    /// No card in the slot
    NotPresent,
    /// Reserved value
    Reserved,
}

impl IccStatus {
    /// Decode from a reply status byte
    pub const fn from_status(status: u8) -> Self {
        match status & 0x03 {
            0 => Self::Active,
            1 => Self::PresentInactive,
            2 => Self::NotPresent,
            _ => Self::Reserved,
        }
    }
}

impl fmt::Display for IccStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::PresentInactive => "present, inactive",
            Self::NotPresent => "not present",
            Self::Reserved => "reserved",
        })
    }
}

/// Options for framing an XfrBlock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    /// Slot the card sits in
    pub slot: u8,
    /// bBWI: block waiting time integer; `0` lets the reader use its default
    /// and not request extra time on our behalf
    pub block_wait: u8,
    /// Chaining position of this block
    pub level: LevelParameter,
    /// Largest payload accepted by the reader
    pub max_payload_len: usize,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            slot: 0,
            block_wait: 0x01,
            level: LevelParameter::BeginAndEnd,
            max_payload_len: MAX_PAYLOAD_LEN,
        }
    }
}

impl TransferOptions {
    /// Options that do not let the reader extend the block waiting time
    pub fn without_wait_extension() -> Self {
        Self {
            block_wait: 0x00,
            ..Self::default()
        }
    }

    /// Whether the reader may ask for more time
    pub const fn wait_extension_allowed(&self) -> bool {
        self.block_wait != 0
    }
}

/// Frame an APDU into a PC_to_RDR_XfrBlock message
pub fn frame_transfer(
    sequence: u8,
    apdu: &[u8],
    options: &TransferOptions,
) -> Result<Bytes, CcidError> {
    let [level_lo, level_hi] = options.level.value().to_le_bytes();
    encode(
        message_type::XFR_BLOCK,
        options.slot,
        sequence,
        [options.block_wait, level_lo, level_hi],
        apdu,
        options.max_payload_len,
    )
}

/// Encode a CCID message; the length field is always computed from `payload`
pub fn encode(
    message_type: u8,
    slot: u8,
    sequence: u8,
    params: [u8; 3],
    payload: &[u8],
    max_payload_len: usize,
) -> Result<Bytes, CcidError> {
    let max = max_payload_len.min(MAX_PAYLOAD_LEN);
    if payload.len() > max {
        return Err(CcidError::PayloadTooLarge {
            length: payload.len(),
            max,
        });
    }

    let mut buffer = BytesMut::with_capacity(HEADER_LEN + payload.len());
    buffer.put_u8(message_type);
    buffer.put_u32_le(payload.len() as u32);
    buffer.put_u8(slot);
    buffer.put_u8(sequence);
    buffer.put_slice(&params);
    buffer.put_slice(payload);
    Ok(buffer.freeze())
}

/// A parsed CCID message in either direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// bMessageType
    pub message_type: u8,
    /// bSlot
    pub slot: u8,
    /// bSeq
    pub sequence: u8,
    /// Message specific parameter bytes
    pub params: [u8; 3],
    /// Payload, exactly as long as the header declares
    pub payload: Bytes,
}

impl Frame {
    /// Parse a complete message, checking the declared length
    pub fn parse(bytes: &[u8]) -> Result<Self, CcidError> {
        if bytes.len() < HEADER_LEN {
            return Err(CcidError::Truncated {
                needed: HEADER_LEN,
                available: bytes.len(),
            });
        }

        let declared = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;
        let actual = bytes.len() - HEADER_LEN;
        if actual < declared {
            return Err(CcidError::Truncated {
                needed: HEADER_LEN + declared,
                available: bytes.len(),
            });
        }
        if actual > declared {
            return Err(CcidError::LengthMismatch { declared, actual });
        }

        Ok(Self {
            message_type: bytes[0],
            slot: bytes[5],
            sequence: bytes[6],
            params: [bytes[7], bytes[8], bytes[9]],
            payload: Bytes::copy_from_slice(&bytes[HEADER_LEN..]),
        })
    }

    /// Serialize back to wire form
    pub fn to_bytes(&self) -> Result<Bytes, CcidError> {
        encode(
            self.message_type,
            self.slot,
            self.sequence,
            self.params,
            &self.payload,
            MAX_PAYLOAD_LEN,
        )
    }
}

/// Interpreted reader-to-host reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// RDR_to_PC_DataBlock: an ATR or a response APDU
    DataBlock {
        /// Card state
        icc_status: IccStatus,
        /// bChainParameter
        chain: u8,
        /// Payload bytes, handed upward untouched
        payload: Bytes,
    },
    /// RDR_to_PC_SlotStatus
    SlotStatus {
        /// Card state
        icc_status: IccStatus,
        /// bClockStatus
        clock_status: u8,
    },
    /// The card needs more time; the final reply follows on the same request
    TimeExtension {
        /// Multiplier of the block waiting time requested
        multiplier: u8,
    },
}

impl Reply {
    /// bmCommandStatus value for a processed command
    const COMMAND_OK: u8 = 0;
    /// bmCommandStatus value for a failed command
    const COMMAND_FAILED: u8 = 1;
    /// bmCommandStatus value for a time extension request
    const TIME_EXTENSION: u8 = 2;

    /// Interpret a parsed reader reply
    pub fn from_frame(frame: Frame) -> Result<Self, CcidError> {
        let [status, error, extra] = frame.params;
        let icc_status = IccStatus::from_status(status);

        match status >> 6 {
            Self::COMMAND_OK => match frame.message_type {
                message_type::DATA_BLOCK => Ok(Self::DataBlock {
                    icc_status,
                    chain: extra,
                    payload: frame.payload,
                }),
                message_type::SLOT_STATUS => Ok(Self::SlotStatus {
                    icc_status,
                    clock_status: extra,
                }),
                found => Err(CcidError::UnexpectedMessageType {
                    expected: message_type::DATA_BLOCK,
                    found,
                }),
            },
            Self::COMMAND_FAILED => Err(CcidError::CommandFailed { error, icc_status }),
            Self::TIME_EXTENSION => Ok(Self::TimeExtension { multiplier: error }),
            _ => Err(CcidError::InvalidStatus(status)),
        }
    }

    /// Check if this is a time extension request
    pub const fn is_time_extension(&self) -> bool {
        matches!(self, Self::TimeExtension { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_frame_transfer_layout() {
        let apdu = hex!("00A4040007A0000002471001");
        let frame = frame_transfer(0x05, &apdu, &TransferOptions::default()).unwrap();

        assert_eq!(&frame[..HEADER_LEN], &hex!("6F0C0000000005010000"));
        assert_eq!(&frame[HEADER_LEN..], &apdu);
    }

    #[test]
    fn test_frame_without_wait_extension() {
        let options = TransferOptions::without_wait_extension();
        assert!(!options.wait_extension_allowed());

        let frame = frame_transfer(0x00, &[0x00, 0x84, 0x00, 0x00, 0x08], &options).unwrap();
        assert_eq!(frame[7], 0x00);
    }

    #[test]
    fn test_frame_round_trip() {
        let options = TransferOptions::default();
        for (sequence, len) in [(0u8, 0usize), (1, 1), (0x7F, 255), (0xFF, 261), (0x42, 65544)] {
            let payload: Vec<u8> = (0..len).map(|i| (i * 7) as u8).collect();
            let bytes = frame_transfer(sequence, &payload, &options).unwrap();
            let frame = Frame::parse(&bytes).unwrap();

            assert_eq!(frame.sequence, sequence);
            assert_eq!(frame.payload.as_ref(), payload.as_slice());
            assert_eq!(frame.to_bytes().unwrap(), bytes);
        }
    }

    #[test]
    fn test_oversized_payload_is_rejected() {
        let options = TransferOptions {
            max_payload_len: 261,
            ..TransferOptions::default()
        };

        assert!(frame_transfer(0, &[0u8; 261], &options).is_ok());
        assert!(matches!(
            frame_transfer(0, &[0u8; 262], &options),
            Err(CcidError::PayloadTooLarge {
                length: 262,
                max: 261
            })
        ));
    }

    #[test]
    fn test_parse_rejects_bad_lengths() {
        assert!(matches!(
            Frame::parse(&hex!("80020000")),
            Err(CcidError::Truncated {
                needed: 10,
                available: 4
            })
        ));
        assert!(matches!(
            Frame::parse(&hex!("80020000000000000000 90")),
            Err(CcidError::Truncated {
                needed: 12,
                available: 11
            })
        ));
        assert!(matches!(
            Frame::parse(&hex!("80010000000000000000 9000")),
            Err(CcidError::LengthMismatch {
                declared: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_reply_interpretation() {
        let data = Frame::parse(&hex!("80020000000007000000 9000")).unwrap();
        assert_eq!(
            Reply::from_frame(data).unwrap(),
            Reply::DataBlock {
                icc_status: IccStatus::Active,
                chain: 0,
                payload: Bytes::from_static(&hex!("9000")),
            }
        );

        let extension = Frame::parse(&hex!("80000000000007800200")).unwrap();
        let reply = Reply::from_frame(extension).unwrap();
        assert!(reply.is_time_extension());
        assert_eq!(reply, Reply::TimeExtension { multiplier: 2 });

        let status = Frame::parse(&hex!("81000000000007010000")).unwrap();
        assert_eq!(
            Reply::from_frame(status).unwrap(),
            Reply::SlotStatus {
                icc_status: IccStatus::PresentInactive,
                clock_status: 0,
            }
        );

        let failed = Frame::parse(&hex!("8000000000000742FE00")).unwrap();
        assert!(matches!(
            Reply::from_frame(failed),
            Err(CcidError::CommandFailed {
                error: 0xFE,
                icc_status: IccStatus::NotPresent
            })
        ));
    }
}
