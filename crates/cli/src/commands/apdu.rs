//! Commands for APDU encoding and parsing

use idcard_apdu_core::iso7816::{SelectDfByName, cla};
use idcard_apdu_core::{ApduCommand, Command, ExpectedLength, Response};
use std::error::Error;
use tracing::debug;

/// Encode a command APDU from its fields
pub fn build_command(
    cla: u8,
    ins: u8,
    p1: u8,
    p2: u8,
    data: Option<Vec<u8>>,
    le: Option<ExpectedLength>,
) -> Result<(), Box<dyn Error>> {
    let mut command = Command::new(cla, ins, p1, p2);
    if let Some(data) = data {
        command = command.with_data(data);
    }
    if let Some(le) = le {
        command = command.with_le(le);
    }

    debug!(case = %case_name(&command), "Encoding command");
    println!("{}", hex::encode_upper(command.to_bytes()?));
    Ok(())
}

/// Encode SELECT by DF name
pub fn select_command(aid: Vec<u8>) -> Result<(), Box<dyn Error>> {
    let command = SelectDfByName::new(cla::ISO7816, aid);
    println!("{}", hex::encode_upper(command.to_bytes()?));
    Ok(())
}

/// Print the fields of a command APDU
pub fn parse_command(apdu: &[u8]) -> Result<(), Box<dyn Error>> {
    let command = Command::from_bytes(apdu)?;

    println!("Case: {}", case_name(&command));
    println!("CLA:  {:02X}", command.cla);
    println!("INS:  {:02X}", command.ins);
    println!("P1:   {:02X}", command.p1);
    println!("P2:   {:02X}", command.p2);
    if let Some(data) = &command.data {
        println!("Lc:   {}", data.len());
        println!("Data: {}", hex::encode_upper(data));
    }
    if let Some(le) = command.le {
        println!("Le:   {}", if le == 0 { "maximum".to_string() } else { le.to_string() });
    }
    Ok(())
}

/// Split a response APDU and describe its status word
pub fn response_command(response: &[u8]) -> Result<(), Box<dyn Error>> {
    let response = Response::from_bytes(response)?;
    let status = response.status();

    println!("Payload: {}", hex::encode_upper(response.payload()));
    println!("Status:  {} ({})", status, status.description());
    if let Some(remaining) = status.bytes_remaining() {
        println!("GET RESPONSE with Le {remaining} to fetch the rest");
    }
    if let Some(le) = status.correct_length() {
        println!("Resend with Le {le}");
    }
    if let Some(retries) = status.retries_remaining() {
        println!("Tries left: {retries}");
    }
    Ok(())
}

/// ISO 7816-4 case of a command, with S or E for the length form
fn case_name<C: ApduCommand>(command: &C) -> String {
    let case = match (command.data().is_some(), command.expected_length().is_some()) {
        (false, false) => return "1".to_string(),
        (false, true) => 2,
        (true, false) => 3,
        (true, true) => 4,
    };
    let form = if command.is_extended() { 'E' } else { 'S' };
    format!("{case}{form}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_names() {
        assert_eq!(case_name(&Command::new(0x00, 0xA4, 0x04, 0x00)), "1");
        assert_eq!(case_name(&Command::new_with_le(0x00, 0x84, 0x00, 0x00, 8)), "2S");
        assert_eq!(case_name(&Command::new_with_le(0x00, 0xB0, 0x00, 0x00, 0x0100)), "2E");
        assert_eq!(
            case_name(&Command::new(0x00, 0xA4, 0x04, 0x00).with_data(vec![0xA0; 300])),
            "3E"
        );
        assert_eq!(
            case_name(&Command::new(0x00, 0xA4, 0x04, 0x00).with_data(vec![0xA0]).with_le(0)),
            "4S"
        );
    }
}
