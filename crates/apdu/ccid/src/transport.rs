//! CCID transport implementation

use std::fmt;

use bytes::Bytes;
use idcard_apdu_core::{CardTransport, TransportError};
use tracing::{debug, trace};

use crate::config::CcidConfig;
use crate::device::CcidDevice;
use crate::error::CcidError;
use crate::frame::{Frame, IccStatus, Reply};
use crate::instruction::Instruction;

/// Transport implementation over a CCID reader
///
/// One transport drives one slot. It owns the sequence counter, so replies
/// can be paired with the request that caused them.
pub struct CcidTransport<D: CcidDevice> {
    /// USB bulk pipe
    device: D,
    /// Configuration
    config: CcidConfig,
    /// Next bSeq value
    sequence: u8,
    /// ATR of the powered card, if any
    atr: Option<Bytes>,
}

impl<D: CcidDevice> fmt::Debug for CcidTransport<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CcidTransport")
            .field("device", &self.device)
            .field("config", &self.config)
            .field("sequence", &self.sequence)
            .field("powered", &self.atr.is_some())
            .finish()
    }
}

impl<D: CcidDevice> CcidTransport<D> {
    /// Create a new transport; the card is not powered until [`Self::power_on`]
    pub const fn new(device: D, config: CcidConfig) -> Self {
        Self {
            device,
            config,
            sequence: 0,
            atr: None,
        }
    }

    /// Get the configuration
    pub const fn config(&self) -> &CcidConfig {
        &self.config
    }

    /// Get the underlying device
    pub const fn device(&self) -> &D {
        &self.device
    }

    /// Get the underlying device mutably
    pub const fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// ATR returned by the last power on
    pub const fn atr(&self) -> Option<&Bytes> {
        self.atr.as_ref()
    }

    /// Power the card up and return its ATR
    pub fn power_on(&mut self) -> Result<Bytes, CcidError> {
        let instruction = Instruction::IccPowerOn {
            power_select: self.config.power_select,
        };
        let atr = match self.exchange(&instruction)? {
            Reply::DataBlock { payload, .. } => payload,
            other => return Err(unexpected(&instruction, &other)),
        };
        debug!(atr = %hex::encode_upper(&atr), "Card powered on");
        self.atr = Some(atr.clone());
        Ok(atr)
    }

    /// Power the card down
    pub fn power_off(&mut self) -> Result<IccStatus, CcidError> {
        self.atr = None;
        self.slot_status_for(&Instruction::IccPowerOff)
    }

    /// Query the slot state
    pub fn slot_status(&mut self) -> Result<IccStatus, CcidError> {
        self.slot_status_for(&Instruction::GetSlotStatus)
    }

    /// Carry one command APDU to the card and return the raw response APDU
    pub fn transfer(&mut self, apdu: &[u8]) -> Result<Bytes, CcidError> {
        let instruction = Instruction::transfer(Bytes::copy_from_slice(apdu), &self.config.transfer_options());
        match self.exchange(&instruction)? {
            Reply::DataBlock { payload, .. } => Ok(payload),
            other => Err(unexpected(&instruction, &other)),
        }
    }

    fn slot_status_for(&mut self, instruction: &Instruction) -> Result<IccStatus, CcidError> {
        match self.exchange(instruction)? {
            Reply::SlotStatus { icc_status, .. } => Ok(icc_status),
            other => Err(unexpected(instruction, &other)),
        }
    }

    const fn next_sequence(&mut self) -> u8 {
        let sequence = self.sequence;
        self.sequence = sequence.wrapping_add(1);
        sequence
    }

    /// Send one instruction and wait for its final reply
    ///
    /// Time extension replies are consumed here: the request stays
    /// outstanding and the next reply is read without re-sending.
    fn exchange(&mut self, instruction: &Instruction) -> Result<Reply, CcidError> {
        let sequence = self.next_sequence();
        let framed = instruction.frame(self.config.slot, sequence, self.config.max_message_length)?;
        trace!(
            instruction = instruction.id(),
            sequence,
            frame = %hex::encode_upper(&framed),
            "Writing CCID message"
        );
        self.device.write_bulk(&framed)?;

        let mut extensions = 0u32;
        loop {
            let raw = self.device.read_bulk()?;
            trace!(frame = %hex::encode_upper(&raw), "Read CCID message");
            let frame = Frame::parse(&raw)?;

            if frame.sequence != sequence {
                return Err(CcidError::SequenceMismatch {
                    expected: sequence,
                    found: frame.sequence,
                });
            }
            if frame.slot != self.config.slot {
                return Err(CcidError::SlotMismatch {
                    expected: self.config.slot,
                    found: frame.slot,
                });
            }
            if frame.message_type != instruction.reply_type() {
                return Err(CcidError::UnexpectedMessageType {
                    expected: instruction.reply_type(),
                    found: frame.message_type,
                });
            }

            match Reply::from_frame(frame)? {
                Reply::TimeExtension { multiplier } => {
                    extensions += 1;
                    if extensions > self.config.max_time_extensions {
                        return Err(CcidError::TooManyTimeExtensions(self.config.max_time_extensions));
                    }
                    debug!(sequence, multiplier, extensions, "Reader requested time extension");
                }
                reply => return Ok(reply),
            }
        }
    }
}

fn unexpected(instruction: &Instruction, reply: &Reply) -> CcidError {
    let found = match reply {
        Reply::SlotStatus { .. } => crate::frame::message_type::SLOT_STATUS,
        _ => crate::frame::message_type::DATA_BLOCK,
    };
    CcidError::UnexpectedMessageType {
        expected: instruction.reply_type(),
        found,
    }
}

impl<D: CcidDevice> CardTransport for CcidTransport<D> {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.transfer(command).map_err(TransportError::from)
    }

    fn is_connected(&self) -> bool {
        self.atr.is_some()
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        self.power_off()?;
        self.power_on()?;
        Ok(())
    }
}
