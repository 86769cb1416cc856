//! Commands for CCID framing

use idcard_apdu_transport_ccid::frame::message_type;
use idcard_apdu_transport_ccid::{Frame, Reply, TransferOptions, frame_transfer};
use std::error::Error;

/// Wrap an APDU into an XfrBlock message
pub fn frame_command(apdu: &[u8], sequence: u8, slot: u8, block_wait: u8) -> Result<(), Box<dyn Error>> {
    let options = TransferOptions {
        slot,
        block_wait,
        ..TransferOptions::default()
    };
    println!("{}", hex::encode_upper(frame_transfer(sequence, apdu, &options)?));
    Ok(())
}

/// Parse a CCID message and interpret reader replies
pub fn unframe_command(message: &[u8]) -> Result<(), Box<dyn Error>> {
    let frame = Frame::parse(message)?;

    println!("Type:     {:02X} ({})", frame.message_type, message_name(frame.message_type));
    println!("Slot:     {}", frame.slot);
    println!("Sequence: {}", frame.sequence);
    println!("Params:   {}", hex::encode_upper(frame.params));
    println!("Payload:  {}", hex::encode_upper(&frame.payload));

    if matches!(frame.message_type, message_type::DATA_BLOCK | message_type::SLOT_STATUS) {
        match Reply::from_frame(frame)? {
            Reply::DataBlock { icc_status, chain, .. } => {
                println!("Card {icc_status}, chain parameter {chain:02X}");
            }
            Reply::SlotStatus {
                icc_status,
                clock_status,
            } => println!("Card {icc_status}, clock status {clock_status:02X}"),
            Reply::TimeExtension { multiplier } => {
                println!("Time extension requested, multiplier {multiplier}");
            }
        }
    }
    Ok(())
}

const fn message_name(kind: u8) -> &'static str {
    match kind {
        message_type::ICC_POWER_ON => "PC_to_RDR_IccPowerOn",
        message_type::ICC_POWER_OFF => "PC_to_RDR_IccPowerOff",
        message_type::GET_SLOT_STATUS => "PC_to_RDR_GetSlotStatus",
        message_type::XFR_BLOCK => "PC_to_RDR_XfrBlock",
        message_type::DATA_BLOCK => "RDR_to_PC_DataBlock",
        message_type::SLOT_STATUS => "RDR_to_PC_SlotStatus",
        _ => "unknown",
    }
}
