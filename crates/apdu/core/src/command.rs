//! APDU command definitions and traits
//!
//! This module provides types and traits for working with APDU commands
//! according to ISO/IEC 7816-4, including the extended-length encoding.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, MAX_EXTENDED_DATA_LENGTH, Result};

/// Expected length type for APDU commands
///
/// A value of `0` requests the maximum the card can return: 256 bytes in the
/// short form and 65536 bytes in the extended form.
pub type ExpectedLength = u16;

/// Largest data or Le value that still fits a one-byte length field
const SHORT_MAX: usize = 255;

/// Core trait for APDU commands
pub trait ApduCommand {
    /// Command class (CLA)
    fn class(&self) -> u8;

    /// Instruction code (INS)
    fn instruction(&self) -> u8;

    /// First parameter (P1)
    fn p1(&self) -> u8;

    /// Second parameter (P2)
    fn p2(&self) -> u8;

    /// Command payload data (optional)
    fn data(&self) -> Option<&[u8]>;

    /// Expected response length (optional)
    fn expected_length(&self) -> Option<ExpectedLength>;

    /// Whether this command needs the extended-length encoding
    fn is_extended(&self) -> bool {
        let data_len = self.data().map_or(0, <[u8]>::len);
        data_len > SHORT_MAX || self.expected_length().is_some_and(|le| le as usize > SHORT_MAX)
    }

    /// Convert to raw APDU bytes
    ///
    /// Uses one-byte Lc/Le fields when the data is at most 255 bytes and Le is
    /// at most 255, and the three-byte extended fields otherwise.
    fn to_bytes(&self) -> Result<Bytes> {
        let data = self.data().unwrap_or_default();
        if data.len() > MAX_EXTENDED_DATA_LENGTH {
            return Err(Error::Encoding {
                length: data.len(),
                max: MAX_EXTENDED_DATA_LENGTH,
            });
        }

        let extended = self.is_extended();
        let mut buffer = BytesMut::with_capacity(self.command_length());

        // Header: CLA, INS, P1, P2
        buffer.put_u8(self.class());
        buffer.put_u8(self.instruction());
        buffer.put_u8(self.p1());
        buffer.put_u8(self.p2());

        // Lc and data
        if !data.is_empty() {
            if extended {
                buffer.put_u8(0x00);
                buffer.put_u16(data.len() as u16);
            } else {
                buffer.put_u8(data.len() as u8);
            }
            buffer.put_slice(data);
        }

        // Le
        if let Some(le) = self.expected_length() {
            if extended {
                // Without an Lc field the extended marker byte precedes Le
                if data.is_empty() {
                    buffer.put_u8(0x00);
                }
                buffer.put_u16(le);
            } else {
                buffer.put_u8(le as u8);
            }
        }

        Ok(buffer.freeze())
    }

    /// Calculate length of serialized command
    fn command_length(&self) -> usize {
        // Header (CLA, INS, P1, P2) is always 4 bytes
        let mut length = 4;
        let extended = self.is_extended();
        let data_len = self.data().map_or(0, <[u8]>::len);

        if data_len > 0 {
            length += (if extended { 3 } else { 1 }) + data_len;
        }

        if self.expected_length().is_some() {
            length += match (extended, data_len) {
                (false, _) => 1,
                (true, 0) => 3,
                (true, _) => 2,
            };
        }

        length
    }

    /// Convert to a generic Command
    fn to_command(&self) -> Command {
        Command {
            cla: self.class(),
            ins: self.instruction(),
            p1: self.p1(),
            p2: self.p2(),
            data: self.data().map(Bytes::copy_from_slice),
            le: self.expected_length(),
        }
    }
}

/// Generic APDU command structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data (optional)
    pub data: Option<Bytes>,
    /// Expected length (optional)
    pub le: Option<ExpectedLength>,
}

impl Command {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: None,
        }
    }

    /// Create a new command with expected response length (Le)
    pub const fn new_with_le(cla: u8, ins: u8, p1: u8, p2: u8, le: ExpectedLength) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: Some(le),
        }
    }

    /// Create a new command with data payload
    pub fn new_with_data<T: Into<Bytes>>(cla: u8, ins: u8, p1: u8, p2: u8, data: T) -> Self {
        Self::new(cla, ins, p1, p2).with_data(data)
    }

    /// Create a new command with both data and expected length
    pub fn new_with_data_and_le<T: Into<Bytes>>(
        cla: u8,
        ins: u8,
        p1: u8,
        p2: u8,
        data: T,
        le: ExpectedLength,
    ) -> Self {
        Self::new(cla, ins, p1, p2).with_data(data).with_le(le)
    }

    /// Set the data field
    ///
    /// Empty data is treated as absent, since no Lc field can describe it.
    pub fn with_data<T: Into<Bytes>>(mut self, data: T) -> Self {
        let data = data.into();
        self.data = (!data.is_empty()).then_some(data);
        self
    }

    /// Set the expected length field
    pub const fn with_le(mut self, le: ExpectedLength) -> Self {
        self.le = Some(le);
        self
    }

    /// Parse a command from raw bytes
    ///
    /// Accepts every ISO/IEC 7816-4 case: 1, 2S, 3S, 4S, 2E, 3E and 4E.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(Error::InvalidCommandLength(data.len()));
        }

        let mut command = Self::new(data[0], data[1], data[2], data[3]);
        let body = &data[4..];
        let invalid = || Error::InvalidCommandLength(data.len());

        match body {
            // Case 1
            [] => {}
            // Case 2S
            [le] => command.le = Some(*le as ExpectedLength),
            // Extended cases start with a zero byte where a short Lc would be
            [0x00, rest @ ..] => match rest {
                // Case 2E
                [hi, lo] => command.le = Some(u16::from_be_bytes([*hi, *lo])),
                [hi, lo, rest @ ..] => {
                    let lc = u16::from_be_bytes([*hi, *lo]) as usize;
                    if lc == 0 {
                        return Err(invalid());
                    }
                    if rest.len() == lc {
                        // Case 3E
                        command.data = Some(Bytes::copy_from_slice(rest));
                    } else if rest.len() == lc + 2 {
                        // Case 4E
                        command.data = Some(Bytes::copy_from_slice(&rest[..lc]));
                        command.le = Some(u16::from_be_bytes([rest[lc], rest[lc + 1]]));
                    } else {
                        return Err(invalid());
                    }
                }
                _ => return Err(invalid()),
            },
            [lc, rest @ ..] => {
                let lc = *lc as usize;
                if rest.len() == lc {
                    // Case 3S
                    command.data = Some(Bytes::copy_from_slice(rest));
                } else if rest.len() == lc + 1 {
                    // Case 4S
                    command.data = Some(Bytes::copy_from_slice(&rest[..lc]));
                    command.le = Some(rest[lc] as ExpectedLength);
                } else {
                    return Err(invalid());
                }
            }
        }

        Ok(command)
    }
}

impl ApduCommand for Command {
    fn class(&self) -> u8 {
        self.cla
    }

    fn instruction(&self) -> u8 {
        self.ins
    }

    fn p1(&self) -> u8 {
        self.p1
    }

    fn p2(&self) -> u8 {
        self.p2
    }

    fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        self.le
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_command_serialization() {
        let data = Bytes::from_static(&[0xA0, 0x00, 0x00, 0x01, 0x51, 0x00]);
        let cmd = Command::new_with_data_and_le(0x00, 0xA4, 0x04, 0x00, data, 0);
        let bytes = cmd.to_bytes().unwrap();

        assert_eq!(bytes.as_ref(), hex!("00A4040006A0000001510000"));
    }

    #[test]
    fn test_command_length() {
        let cmd1 = Command::new(0x00, 0xB0, 0x00, 0x00);
        assert_eq!(cmd1.command_length(), 4);

        let cmd2 = Command::new_with_le(0x00, 0xB0, 0x00, 0x00, 0xFF);
        assert_eq!(cmd2.command_length(), 5);

        let data = Bytes::from_static(&[0x01, 0x02, 0x03]);
        let cmd3 = Command::new_with_data(0x00, 0xD6, 0x00, 0x00, data.clone());
        assert_eq!(cmd3.command_length(), 8);

        let cmd4 = Command::new_with_data_and_le(0x00, 0xD6, 0x00, 0x00, data, 0xFF);
        assert_eq!(cmd4.command_length(), 9);

        let cmd5 = Command::new_with_le(0x00, 0xB0, 0x00, 0x00, 0x0100);
        assert_eq!(cmd5.command_length(), 7);
        assert_eq!(cmd5.to_bytes().unwrap().len(), 7);
    }

    #[test]
    fn test_short_form_round_trip() {
        for len in [1usize, 2, 16, 127, 128, 200, 254, 255] {
            let data: Vec<u8> = (0..len).map(|i| i as u8).collect();
            for le in [None, Some(0x00), Some(0x10), Some(0xFF)] {
                let mut cmd = Command::new_with_data(0x0C, 0xB0, 0x12, 0x34, data.clone());
                cmd.le = le;

                let bytes = cmd.to_bytes().unwrap();
                assert!(!cmd.is_extended());
                assert_eq!(bytes[4] as usize, len);
                assert_eq!(bytes.len(), cmd.command_length());
                assert_eq!(Command::from_bytes(&bytes).unwrap(), cmd);
            }
        }
    }

    #[test]
    fn test_extended_form_at_boundaries() {
        for len in [256usize, 65535] {
            let cmd = Command::new_with_data(0x00, 0xD6, 0x00, 0x00, vec![0xAB; len]);
            let bytes = cmd.to_bytes().unwrap();

            assert!(cmd.is_extended());
            assert_eq!(bytes[4], 0x00);
            assert_eq!(u16::from_be_bytes([bytes[5], bytes[6]]) as usize, len);
            assert_eq!(bytes.len(), 7 + len);
            assert_eq!(Command::from_bytes(&bytes).unwrap(), cmd);
        }
    }

    #[test]
    fn test_extended_form_with_le() {
        let cmd = Command::new_with_data_and_le(0x00, 0x2A, 0x9E, 0x9A, vec![0x01; 300], 0x0000);
        let bytes = cmd.to_bytes().unwrap();
        assert_eq!(&bytes[4..7], &hex!("00012C"));
        assert_eq!(&bytes[bytes.len() - 2..], &hex!("0000"));
        assert_eq!(Command::from_bytes(&bytes).unwrap(), cmd);

        // Le alone forces the extended marker byte
        let cmd = Command::new_with_le(0x00, 0xB0, 0x00, 0x00, 0x0400);
        assert_eq!(cmd.to_bytes().unwrap().as_ref(), hex!("00B00000000400"));
        assert_eq!(Command::from_bytes(&hex!("00B00000000400")).unwrap(), cmd);
    }

    #[test]
    fn test_oversized_data_is_rejected() {
        let cmd = Command::new_with_data(0x00, 0xD6, 0x00, 0x00, vec![0x00; 65536]);
        assert!(matches!(
            cmd.to_bytes(),
            Err(Error::Encoding {
                length: 65536,
                max: 65535
            })
        ));
    }

    #[test]
    fn test_empty_data_is_absent() {
        let cmd = Command::new_with_data(0x00, 0xA4, 0x04, 0x00, Vec::new());
        assert!(cmd.data.is_none());
        assert_eq!(cmd.to_bytes().unwrap().as_ref(), hex!("00A40400"));
    }

    #[test]
    fn test_command_from_bytes() {
        // Case 1
        let cmd = Command::from_bytes(&hex!("00A40400")).unwrap();
        assert_eq!((cmd.cla, cmd.ins, cmd.p1, cmd.p2), (0x00, 0xA4, 0x04, 0x00));
        assert!(cmd.data.is_none());
        assert!(cmd.le.is_none());

        // Case 3S
        let cmd = Command::from_bytes(&hex!("00A4040003010203")).unwrap();
        assert_eq!(cmd.data.as_deref(), Some(&hex!("010203")[..]));
        assert!(cmd.le.is_none());

        // Case 4S
        let cmd = Command::from_bytes(&hex!("00A4040003010203FF")).unwrap();
        assert_eq!(cmd.data.as_deref(), Some(&hex!("010203")[..]));
        assert_eq!(cmd.le, Some(0xFF));

        // Case 2S with Le=0
        let cmd = Command::from_bytes(&hex!("00B0000000")).unwrap();
        assert!(cmd.data.is_none());
        assert_eq!(cmd.le, Some(0));
    }

    #[test]
    fn test_command_from_bytes_rejects_inconsistent_lengths() {
        assert!(matches!(
            Command::from_bytes(&hex!("00A404")),
            Err(Error::InvalidCommandLength(3))
        ));
        assert!(Command::from_bytes(&hex!("00A404000501")).is_err());
        assert!(Command::from_bytes(&hex!("00A404000001")).is_err());
        assert!(Command::from_bytes(&hex!("00A4040000000201")).is_err());
    }
}
