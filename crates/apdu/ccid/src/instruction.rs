//! Host-to-reader instructions
//!
//! The set of instructions is closed: each one knows its message type, the
//! reply type it expects and how its three parameter bytes are laid out.

use bytes::Bytes;

use crate::error::CcidError;
use crate::frame::{self, LevelParameter, TransferOptions, message_type};

/// bPowerSelect of an IccPowerOn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerSelect {
    /// Let the reader choose the voltage class
    #[default]
    Automatic,
    /// 5.0 V
    V5,
    /// 3.0 V
    V3,
    /// 1.8 V
    V1_8,
}

impl PowerSelect {
    /// Wire value
    pub const fn value(self) -> u8 {
        match self {
            Self::Automatic => 0x00,
            Self::V5 => 0x01,
            Self::V3 => 0x02,
            Self::V1_8 => 0x03,
        }
    }
}

/// An instruction for the reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Power the card up and fetch its ATR
    IccPowerOn {
        /// Voltage class
        power_select: PowerSelect,
    },
    /// Power the card down
    IccPowerOff,
    /// Query the slot state
    GetSlotStatus,
    /// Carry a command APDU to the card
    XfrBlock {
        /// Command APDU bytes
        apdu: Bytes,
        /// bBWI control byte
        block_wait: u8,
        /// Chaining position
        level: LevelParameter,
    },
}

impl Instruction {
    /// Build an XfrBlock carrying `apdu` with the given transfer options
    pub fn transfer(apdu: impl Into<Bytes>, options: &TransferOptions) -> Self {
        Self::XfrBlock {
            apdu: apdu.into(),
            block_wait: options.block_wait,
            level: options.level,
        }
    }

    /// Stable identifier used to route replies to the instruction that caused them
    pub const fn id(&self) -> u32 {
        match self {
            Self::IccPowerOn { .. } => 1,
            Self::IccPowerOff => 2,
            Self::XfrBlock { .. } => 3,
            Self::GetSlotStatus => 4,
        }
    }

    /// bMessageType of the framed instruction
    pub const fn message_type(&self) -> u8 {
        match self {
            Self::IccPowerOn { .. } => message_type::ICC_POWER_ON,
            Self::IccPowerOff => message_type::ICC_POWER_OFF,
            Self::GetSlotStatus => message_type::GET_SLOT_STATUS,
            Self::XfrBlock { .. } => message_type::XFR_BLOCK,
        }
    }

    /// bMessageType of the reply the reader answers with
    pub const fn reply_type(&self) -> u8 {
        match self {
            Self::IccPowerOn { .. } | Self::XfrBlock { .. } => message_type::DATA_BLOCK,
            Self::IccPowerOff | Self::GetSlotStatus => message_type::SLOT_STATUS,
        }
    }

    /// Frame this instruction for `slot` with the caller-assigned sequence number
    pub fn frame(&self, slot: u8, sequence: u8, max_payload_len: usize) -> Result<Bytes, CcidError> {
        let empty: &[u8] = &[];
        let (params, payload) = match self {
            Self::IccPowerOn { power_select } => ([power_select.value(), 0x00, 0x00], empty),
            Self::IccPowerOff | Self::GetSlotStatus => ([0x00; 3], empty),
            Self::XfrBlock {
                apdu,
                block_wait,
                level,
            } => {
                let [lo, hi] = level.value().to_le_bytes();
                ([*block_wait, lo, hi], &apdu[..])
            }
        };

        frame::encode(
            self.message_type(),
            slot,
            sequence,
            params,
            payload,
            max_payload_len,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Frame, frame_transfer};
    use hex_literal::hex;

    #[test]
    fn test_instruction_identifiers() {
        assert_eq!(Instruction::IccPowerOn { power_select: PowerSelect::Automatic }.id(), 1);
        assert_eq!(Instruction::IccPowerOff.id(), 2);
        assert_eq!(Instruction::GetSlotStatus.id(), 4);
        let xfr = Instruction::transfer(vec![0x00, 0x84, 0x00, 0x00, 0x08], &TransferOptions::default());
        assert_eq!(xfr.id(), 3);
        assert_eq!(xfr.message_type(), 0x6F);
        assert_eq!(xfr.reply_type(), 0x80);
    }

    #[test]
    fn test_power_instructions() {
        let on = Instruction::IccPowerOn {
            power_select: PowerSelect::V3,
        };
        assert_eq!(on.frame(0, 0x10, usize::MAX).unwrap().as_ref(), hex!("62000000000010020000"));

        let off = Instruction::IccPowerOff.frame(1, 0x11, usize::MAX).unwrap();
        assert_eq!(off.as_ref(), hex!("63000000000111000000"));

        let status = Instruction::GetSlotStatus.frame(0, 0x12, usize::MAX).unwrap();
        assert_eq!(Frame::parse(&status).unwrap().message_type, 0x65);
    }

    #[test]
    fn test_xfr_block_matches_frame_transfer() {
        let options = TransferOptions::default();
        let apdu = hex!("00B0000000");
        let framed = Instruction::transfer(apdu.to_vec(), &options)
            .frame(options.slot, 9, options.max_payload_len)
            .unwrap();

        assert_eq!(framed, frame_transfer(9, &apdu, &options).unwrap());
    }
}
