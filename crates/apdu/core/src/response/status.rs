//! Status word handling
//!
//! The status word is data: interpreting it (retry, resend with a corrected
//! Le, abort) is left to the caller.

use std::fmt;

/// Two-byte trailer of every response APDU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusWord {
    /// First status byte
    pub sw1: u8,
    /// Second status byte
    pub sw2: u8,
}

impl StatusWord {
    /// Create a status word from its two bytes
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self { sw1, sw2 }
    }

    /// Create a status word from its 16-bit value
    pub const fn from_u16(sw: u16) -> Self {
        Self::new((sw >> 8) as u8, sw as u8)
    }

    /// Get the status word as a 16-bit value
    pub const fn to_u16(self) -> u16 {
        ((self.sw1 as u16) << 8) | self.sw2 as u16
    }

    /// `9000`
    pub const fn is_success(self) -> bool {
        self.sw1 == 0x90 && self.sw2 == 0x00
    }

    /// Warning processing (`62xx`, `63xx`)
    pub const fn is_warning(self) -> bool {
        matches!(self.sw1, 0x62 | 0x63)
    }

    /// Number of response bytes still available (`61xx`)
    ///
    /// `6100` means 256 or more bytes remain.
    pub const fn bytes_remaining(self) -> Option<u16> {
        if self.sw1 == 0x61 {
            Some(if self.sw2 == 0 { 256 } else { self.sw2 as u16 })
        } else {
            None
        }
    }

    /// Exact length the card wants in Le (`6Cxx`)
    pub const fn correct_length(self) -> Option<u8> {
        if self.sw1 == 0x6C {
            Some(self.sw2)
        } else {
            None
        }
    }

    /// Remaining verification attempts (`63Cx`)
    pub const fn retries_remaining(self) -> Option<u8> {
        if self.sw1 == 0x63 && self.sw2 & 0xF0 == 0xC0 {
            Some(self.sw2 & 0x0F)
        } else {
            None
        }
    }

    /// Short human readable description for well-known values
    pub const fn description(self) -> &'static str {
        match (self.sw1, self.sw2) {
            (0x90, 0x00) => "success",
            (0x61, _) => "more data available",
            (0x62, 0x82) => "end of file reached before reading Le bytes",
            (0x63, 0xC0..=0xCF) => "verification failed",
            (0x67, 0x00) => "wrong length",
            (0x69, 0x82) => "security condition not satisfied",
            (0x69, 0x83) => "authentication method blocked",
            (0x69, 0x85) => "conditions of use not satisfied",
            (0x69, 0x86) => "command not allowed",
            (0x6A, 0x82) => "file or application not found",
            (0x6A, 0x86) => "incorrect parameters P1-P2",
            (0x6A, 0x88) => "referenced data not found",
            (0x6B, 0x00) => "wrong parameters P1-P2",
            (0x6C, _) => "wrong Le field",
            (0x6D, 0x00) => "instruction not supported",
            (0x6E, 0x00) => "class not supported",
            _ => "unknown status",
        }
    }
}

impl From<u16> for StatusWord {
    fn from(sw: u16) -> Self {
        Self::from_u16(sw)
    }
}

impl From<StatusWord> for u16 {
    fn from(sw: StatusWord) -> Self {
        sw.to_u16()
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}", self.sw1, self.sw2)
    }
}

/// Common ISO 7816-4 status words
pub mod common {
    use super::StatusWord;

    /// Normal processing
    pub const SUCCESS: StatusWord = StatusWord::new(0x90, 0x00);
    /// End of file reached before reading Le bytes
    pub const END_OF_FILE: StatusWord = StatusWord::new(0x62, 0x82);
    /// Wrong length
    pub const WRONG_LENGTH: StatusWord = StatusWord::new(0x67, 0x00);
    /// Security condition not satisfied
    pub const SECURITY_CONDITION_NOT_SATISFIED: StatusWord = StatusWord::new(0x69, 0x82);
    /// Authentication method blocked
    pub const AUTHENTICATION_BLOCKED: StatusWord = StatusWord::new(0x69, 0x83);
    /// Conditions of use not satisfied
    pub const CONDITIONS_NOT_SATISFIED: StatusWord = StatusWord::new(0x69, 0x85);
    /// File or application not found
    pub const FILE_NOT_FOUND: StatusWord = StatusWord::new(0x6A, 0x82);
    /// Incorrect parameters P1-P2
    pub const INCORRECT_P1P2: StatusWord = StatusWord::new(0x6A, 0x86);
    /// Referenced data not found
    pub const REFERENCED_DATA_NOT_FOUND: StatusWord = StatusWord::new(0x6A, 0x88);
    /// Instruction not supported
    pub const INS_NOT_SUPPORTED: StatusWord = StatusWord::new(0x6D, 0x00);
    /// Class not supported
    pub const CLA_NOT_SUPPORTED: StatusWord = StatusWord::new(0x6E, 0x00);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_word_conversions() {
        let sw = StatusWord::from_u16(0x6A82);
        assert_eq!(sw, common::FILE_NOT_FOUND);
        assert_eq!(sw.to_u16(), 0x6A82);
        assert_eq!(sw.to_string(), "6A82");
        assert!(!sw.is_success());
        assert!(common::SUCCESS.is_success());
    }

    #[test]
    fn test_status_hints() {
        assert_eq!(StatusWord::new(0x61, 0x10).bytes_remaining(), Some(0x10));
        assert_eq!(StatusWord::new(0x61, 0x00).bytes_remaining(), Some(256));
        assert_eq!(StatusWord::new(0x6C, 0x1A).correct_length(), Some(0x1A));
        assert_eq!(StatusWord::new(0x63, 0xC2).retries_remaining(), Some(2));
        assert_eq!(StatusWord::new(0x63, 0x00).retries_remaining(), None);
        assert!(StatusWord::new(0x63, 0xC2).is_warning());
        assert_eq!(common::SUCCESS.correct_length(), None);
    }
}
