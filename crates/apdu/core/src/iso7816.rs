//! ISO/IEC 7816-4 interindustry commands
//!
//! Each command is a plain value built from its semantic parameters. None of
//! them touches a transport; hand them to a
//! [`CardExecutor`](crate::card::CardExecutor) to exchange them.

use bytes::Bytes;

use crate::command::{ApduCommand, ExpectedLength};

/// Command class bytes
pub mod cla {
    /// Interindustry class, no secure messaging
    pub const ISO7816: u8 = 0x00;
}

/// Instruction codes
pub mod ins {
    /// VERIFY
    pub const VERIFY: u8 = 0x20;
    /// GET CHALLENGE
    pub const GET_CHALLENGE: u8 = 0x84;
    /// SELECT
    pub const SELECT: u8 = 0xA4;
    /// READ BINARY
    pub const READ_BINARY: u8 = 0xB0;
    /// GET RESPONSE
    pub const GET_RESPONSE: u8 = 0xC0;
}

/// Parameter values for SELECT (P1)
pub mod select_p1 {
    /// Select EF under the current DF by file identifier
    pub const EF_BY_ID: u8 = 0x02;
    /// Select DF by name
    pub const DF_BY_NAME: u8 = 0x04;
}

/// Parameter values for SELECT (P2)
pub mod select_p2 {
    /// Return FCI
    pub const FIRST_OR_ONLY: u8 = 0x00;
    /// Return FCP template
    pub const RETURN_FCP: u8 = 0x04;
    /// No response data
    pub const NO_RESPONSE: u8 = 0x0C;
}

/// Largest offset READ BINARY can address without a short EF identifier
pub const MAX_READ_BINARY_OFFSET: u16 = 0x7FFF;

/// SELECT a dedicated file by name (typically an application AID)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectDfByName {
    cla: u8,
    name: Bytes,
}

impl SelectDfByName {
    /// Create a new SELECT by name command
    pub fn new(cla: u8, name: impl Into<Bytes>) -> Self {
        Self {
            cla,
            name: name.into(),
        }
    }

    /// Get the DF name
    pub const fn name(&self) -> &Bytes {
        &self.name
    }
}

impl ApduCommand for SelectDfByName {
    fn class(&self) -> u8 {
        self.cla
    }

    fn instruction(&self) -> u8 {
        ins::SELECT
    }

    fn p1(&self) -> u8 {
        select_p1::DF_BY_NAME
    }

    fn p2(&self) -> u8 {
        select_p2::FIRST_OR_ONLY
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.name)
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        None
    }
}

/// SELECT an elementary file by its two-byte identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectFileById {
    cla: u8,
    file_id: [u8; 2],
    return_fcp: bool,
}

impl SelectFileById {
    /// Create a new SELECT by file identifier command without response data
    pub const fn new(cla: u8, file_id: [u8; 2]) -> Self {
        Self {
            cla,
            file_id,
            return_fcp: false,
        }
    }

    /// Ask the card to return the file control parameters
    pub const fn with_fcp(mut self) -> Self {
        self.return_fcp = true;
        self
    }
}

impl ApduCommand for SelectFileById {
    fn class(&self) -> u8 {
        self.cla
    }

    fn instruction(&self) -> u8 {
        ins::SELECT
    }

    fn p1(&self) -> u8 {
        select_p1::EF_BY_ID
    }

    fn p2(&self) -> u8 {
        if self.return_fcp {
            select_p2::RETURN_FCP
        } else {
            select_p2::NO_RESPONSE
        }
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.file_id)
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        self.return_fcp.then_some(0)
    }
}

/// READ BINARY from the currently selected EF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadBinary {
    cla: u8,
    offset: u16,
    length: ExpectedLength,
}

impl ReadBinary {
    /// Create a new READ BINARY command
    ///
    /// The offset is masked to 15 bits: bit 8 of P1 would otherwise select
    /// the short EF identifier form.
    pub const fn new(cla: u8, offset: u16, length: ExpectedLength) -> Self {
        Self {
            cla,
            offset: offset & MAX_READ_BINARY_OFFSET,
            length,
        }
    }

    /// Same read with a different Le
    pub const fn with_length(self, length: ExpectedLength) -> Self {
        Self { length, ..self }
    }
}

impl ApduCommand for ReadBinary {
    fn class(&self) -> u8 {
        self.cla
    }

    fn instruction(&self) -> u8 {
        ins::READ_BINARY
    }

    fn p1(&self) -> u8 {
        (self.offset >> 8) as u8
    }

    fn p2(&self) -> u8 {
        self.offset as u8
    }

    fn data(&self) -> Option<&[u8]> {
        None
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        Some(self.length)
    }
}

/// GET RESPONSE for data announced by a `61xx` status word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetResponse {
    cla: u8,
    length: ExpectedLength,
}

impl GetResponse {
    /// Create a new GET RESPONSE command
    pub const fn new(cla: u8, length: ExpectedLength) -> Self {
        Self { cla, length }
    }
}

impl ApduCommand for GetResponse {
    fn class(&self) -> u8 {
        self.cla
    }

    fn instruction(&self) -> u8 {
        ins::GET_RESPONSE
    }

    fn p1(&self) -> u8 {
        0x00
    }

    fn p2(&self) -> u8 {
        0x00
    }

    fn data(&self) -> Option<&[u8]> {
        None
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        Some(self.length)
    }
}

/// VERIFY reference data (PIN) against a key reference
#[derive(Clone, PartialEq, Eq)]
pub struct Verify {
    cla: u8,
    reference: u8,
    pin: Bytes,
}

impl Verify {
    /// Create a new VERIFY command
    pub fn new(cla: u8, reference: u8, pin: impl Into<Bytes>) -> Self {
        Self {
            cla,
            reference,
            pin: pin.into(),
        }
    }

    /// Query the retry counter: VERIFY without data
    pub const fn retry_counter(cla: u8, reference: u8) -> Self {
        Self {
            cla,
            reference,
            pin: Bytes::new(),
        }
    }
}

impl std::fmt::Debug for Verify {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verify")
            .field("cla", &self.cla)
            .field("reference", &self.reference)
            .field("pin", &"<redacted>")
            .finish()
    }
}

impl ApduCommand for Verify {
    fn class(&self) -> u8 {
        self.cla
    }

    fn instruction(&self) -> u8 {
        ins::VERIFY
    }

    fn p1(&self) -> u8 {
        0x00
    }

    fn p2(&self) -> u8 {
        self.reference
    }

    fn data(&self) -> Option<&[u8]> {
        (!self.pin.is_empty()).then_some(self.pin.as_ref())
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        None
    }
}

/// GET CHALLENGE for an 8-byte card nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetChallenge {
    cla: u8,
}

impl GetChallenge {
    /// Challenge length requested from the card
    pub const LENGTH: ExpectedLength = 8;

    /// Create a new GET CHALLENGE command
    pub const fn new(cla: u8) -> Self {
        Self { cla }
    }
}

impl ApduCommand for GetChallenge {
    fn class(&self) -> u8 {
        self.cla
    }

    fn instruction(&self) -> u8 {
        ins::GET_CHALLENGE
    }

    fn p1(&self) -> u8 {
        0x00
    }

    fn p2(&self) -> u8 {
        0x00
    }

    fn data(&self) -> Option<&[u8]> {
        None
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        Some(Self::LENGTH)
    }
}
