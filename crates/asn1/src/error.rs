//! Error types for TLV decoding
//!
//! Every variant carries the absolute offset of the byte where the
//! structural expectation failed.

/// Error type for TLV reading and record decoding
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Input ends before a header or declared value does
    #[error("truncated input at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedInput {
        /// Offset where the missing bytes should start
        offset: usize,
        /// Bytes required
        needed: usize,
        /// Bytes left in the input
        available: usize,
    },

    /// A node inside a record carries the wrong tag
    #[error("unexpected tag 0x{found:02X} at offset {offset}, expected 0x{expected:02X}")]
    UnexpectedTag {
        /// Tag the grammar requires
        expected: u8,
        /// Tag read
        found: u8,
        /// Offset of the tag byte
        offset: usize,
    },

    /// The outer tag does not belong to the record being decoded
    #[error("record tag 0x{found:02X} at offset {offset} does not match 0x{expected:02X}")]
    TagMismatch {
        /// Tag of the record type
        expected: u8,
        /// Tag read
        found: u8,
        /// Offset of the tag byte
        offset: usize,
    },

    /// A fixed-size node has the wrong length
    #[error("{field}: length {found} at offset {offset}, expected {expected}")]
    LengthMismatch {
        /// Name of the node
        field: &'static str,
        /// Required length
        expected: usize,
        /// Declared length
        found: usize,
        /// Offset of the node's tag byte
        offset: usize,
    },

    /// Indefinite length or more length octets than supported
    #[error("unsupported length encoding 0x{first:02X} at offset {offset}")]
    UnsupportedLength {
        /// First length octet
        first: u8,
        /// Offset of the first length octet
        offset: usize,
    },

    /// Node content does not satisfy its grammar
    #[error("{field}: invalid value at offset {offset}: {reason}")]
    InvalidValue {
        /// Name of the node
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
        /// Offset of the offending byte
        offset: usize,
    },

    /// No record type is registered for the outer tag
    #[error("no record type for tag 0x{found:02X} at offset {offset}")]
    UnknownRecord {
        /// Tag read
        found: u8,
        /// Offset of the tag byte
        offset: usize,
    },
}

impl Error {
    /// Absolute offset of the failure
    pub const fn offset(&self) -> usize {
        match self {
            Self::TruncatedInput { offset, .. }
            | Self::UnexpectedTag { offset, .. }
            | Self::TagMismatch { offset, .. }
            | Self::LengthMismatch { offset, .. }
            | Self::UnsupportedLength { offset, .. }
            | Self::InvalidValue { offset, .. }
            | Self::UnknownRecord { offset, .. } => *offset,
        }
    }
}

/// Result type for TLV decoding
pub type Result<T> = std::result::Result<T, Error>;
