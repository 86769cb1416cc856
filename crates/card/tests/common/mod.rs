//! Common test utilities: a CCID reader with an LDS1 card inserted

#![allow(dead_code, unreachable_pub)]

use std::collections::{HashMap, VecDeque};
use std::io;

use idcard_apdu_core::Command;
use idcard_apdu_transport_ccid::frame::{self, message_type};
use idcard_apdu_transport_ccid::{CcidDevice, Frame};
use idcard_asn1::encode;
use idcard_card::constants::{aid, file_id};

pub const ATR: &[u8] = &[0x3B, 0x88, 0x80, 0x01, 0xE1, 0xF3, 0x5E, 0x11, 0x77, 0x83, 0x95, 0x00, 0x75];

/// EF.COM listing DG1 and DG2
pub fn ef_com() -> Vec<u8> {
    let mut value = encode(0x01, b"0107");
    value.extend(encode(0x36, b"040000"));
    value.extend(encode(0x5C, &[0x61, 0x75]));
    encode(0x60, &value)
}

/// DG1 large enough to need a long-form length and several reads
pub fn ef_dg1() -> Vec<u8> {
    encode(0x61, &encode(0x53, &[b'<'; 300]))
}

/// Simulated card: one application with a few transparent files
#[derive(Debug)]
struct Card {
    files: HashMap<[u8; 2], Vec<u8>>,
    application_selected: bool,
    selected: Option<[u8; 2]>,
}

impl Card {
    fn process(&mut self, apdu: &[u8]) -> Vec<u8> {
        let Ok(command) = Command::from_bytes(apdu) else {
            return vec![0x67, 0x00];
        };
        let data = command.data.as_deref().unwrap_or_default();

        match (command.ins, command.p1) {
            (0xA4, 0x04) => {
                self.application_selected = data == aid::ICAO_LDS1;
                self.selected = None;
                if self.application_selected { vec![0x90, 0x00] } else { vec![0x6A, 0x82] }
            }
            (0xA4, 0x02) => {
                let Ok(fid) = <[u8; 2]>::try_from(data) else {
                    return vec![0x6A, 0x87];
                };
                let Some(file) = self.files.get(&fid).filter(|_| self.application_selected) else {
                    return vec![0x6A, 0x82];
                };
                self.selected = Some(fid);
                if command.p2 == 0x04 {
                    let size = (file.len() as u16).to_be_bytes();
                    let mut fcp = encode(0x62, &[encode(0x80, &size), encode(0x83, &fid)].concat());
                    fcp.extend_from_slice(&[0x90, 0x00]);
                    fcp
                } else {
                    vec![0x90, 0x00]
                }
            }
            (0xB0, _) => {
                let Some(file) = self.selected.and_then(|fid| self.files.get(&fid)) else {
                    return vec![0x69, 0x86];
                };
                let offset = usize::from(u16::from_be_bytes([command.p1, command.p2]));
                let wanted = match command.le {
                    Some(0) | None => 256,
                    Some(le) => usize::from(le),
                };
                if offset > file.len() {
                    return vec![0x6B, 0x00];
                }
                let end = (offset + wanted).min(file.len());
                let mut reply = file[offset..end].to_vec();
                if end - offset < wanted {
                    reply.extend_from_slice(&[0x62, 0x82]);
                } else {
                    reply.extend_from_slice(&[0x90, 0x00]);
                }
                reply
            }
            (0x84, _) => {
                let mut reply = vec![0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];
                reply.extend_from_slice(&[0x90, 0x00]);
                reply
            }
            _ => vec![0x6D, 0x00],
        }
    }
}

/// CCID reader answering on slot 0
#[derive(Debug)]
pub struct SimulatedReader {
    card: Card,
    powered: bool,
    time_extensions: usize,
    pending: VecDeque<Vec<u8>>,
    pub writes: usize,
}

impl SimulatedReader {
    pub fn new() -> Self {
        let files = HashMap::from([(file_id::EF_COM, ef_com()), (file_id::EF_DG1, ef_dg1())]);
        Self {
            card: Card {
                files,
                application_selected: false,
                selected: None,
            },
            powered: false,
            time_extensions: 0,
            pending: VecDeque::new(),
            writes: 0,
        }
    }

    /// Add or replace a file in the application
    pub fn with_file(mut self, fid: [u8; 2], contents: Vec<u8>) -> Self {
        self.card.files.insert(fid, contents);
        self
    }

    /// Ask for more time this many times before every response APDU
    pub fn with_time_extensions(mut self, count: usize) -> Self {
        self.time_extensions = count;
        self
    }

    fn reply(&mut self, request: &Frame, kind: u8, status: u8, error: u8, payload: &[u8]) {
        let reply = frame::encode(kind, request.slot, request.sequence, [status, error, 0], payload, usize::MAX)
            .expect("reply fits");
        self.pending.push_back(reply.to_vec());
    }
}

impl CcidDevice for SimulatedReader {
    fn write_bulk(&mut self, data: &[u8]) -> io::Result<()> {
        self.writes += 1;
        let request = Frame::parse(data).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let icc = if self.powered { 0x00 } else { 0x01 };

        match request.message_type {
            message_type::ICC_POWER_ON => {
                self.powered = true;
                self.reply(&request, message_type::DATA_BLOCK, 0x00, 0x00, ATR);
            }
            message_type::ICC_POWER_OFF => {
                self.powered = false;
                self.reply(&request, message_type::SLOT_STATUS, 0x01, 0x00, &[]);
            }
            message_type::GET_SLOT_STATUS => {
                self.reply(&request, message_type::SLOT_STATUS, icc, 0x00, &[]);
            }
            message_type::XFR_BLOCK if !self.powered => {
                // bmCommandStatus failed, ICC present but inactive, ICC_MUTE
                self.reply(&request, message_type::DATA_BLOCK, 0x41, 0xFE, &[]);
            }
            message_type::XFR_BLOCK => {
                for _ in 0..self.time_extensions {
                    self.reply(&request, message_type::DATA_BLOCK, 0x80, 0x01, &[]);
                }
                let response = self.card.process(&request.payload);
                self.reply(&request, message_type::DATA_BLOCK, 0x00, 0x00, &response);
            }
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    format!("message type 0x{other:02X}"),
                ));
            }
        }
        Ok(())
    }

    fn read_bulk(&mut self) -> io::Result<Vec<u8>> {
        self.pending
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::TimedOut, "no pending reply"))
    }
}
