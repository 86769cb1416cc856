//! Sequential BER-TLV reader
//!
//! Tags are a single byte. Lengths follow the BER definite form: one octet
//! up to 127, otherwise `0x80 | n` followed by `n` big-endian octets with
//! `n <= 4`. The reader never backtracks and never reads past a declared
//! length.

use crate::error::{Error, Result};

/// Largest number of long-form length octets accepted
pub const MAX_LENGTH_OCTETS: usize = 4;

/// Bit marking a constructed tag
const CONSTRUCTED: u8 = 0x20;

/// Tag and length of a node, read without requiring its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Tag byte
    pub tag: u8,
    /// Tag plus length octets
    pub header_len: usize,
    /// Declared value length
    pub value_len: usize,
}

impl Header {
    /// Size of the whole node on the wire
    pub const fn total_len(&self) -> usize {
        self.header_len + self.value_len
    }
}

/// Read the header of the first node in `bytes`
///
/// Only the tag and length octets have to be present, which lets a caller
/// learn the size of a file from its first few bytes.
pub fn peek_header(bytes: &[u8]) -> Result<Header> {
    read_header(bytes, 0)
}

fn read_header(input: &[u8], base: usize) -> Result<Header> {
    let Some((&tag, rest)) = input.split_first() else {
        return Err(Error::TruncatedInput {
            offset: base,
            needed: 1,
            available: 0,
        });
    };

    let length_offset = base + 1;
    let Some((&first, rest)) = rest.split_first() else {
        return Err(Error::TruncatedInput {
            offset: length_offset,
            needed: 1,
            available: 0,
        });
    };

    if first < 0x80 {
        return Ok(Header {
            tag,
            header_len: 2,
            value_len: first as usize,
        });
    }

    let count = (first & 0x7F) as usize;
    if count == 0 || count > MAX_LENGTH_OCTETS {
        return Err(Error::UnsupportedLength {
            first,
            offset: length_offset,
        });
    }
    if rest.len() < count {
        return Err(Error::TruncatedInput {
            offset: length_offset + 1,
            needed: count,
            available: rest.len(),
        });
    }

    let value_len = rest[..count]
        .iter()
        .fold(0usize, |len, &octet| (len << 8) | octet as usize);

    Ok(Header {
        tag,
        header_len: 2 + count,
        value_len,
    })
}

/// One node borrowed from the reader's buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tlv<'a> {
    tag: u8,
    offset: usize,
    header_len: usize,
    value: &'a [u8],
}

impl<'a> Tlv<'a> {
    /// Tag byte
    pub const fn tag(&self) -> u8 {
        self.tag
    }

    /// Absolute offset of the tag byte
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Absolute offset of the first value byte
    pub const fn value_offset(&self) -> usize {
        self.offset + self.header_len
    }

    /// Value bytes
    pub const fn value(&self) -> &'a [u8] {
        self.value
    }

    /// Value length
    pub const fn len(&self) -> usize {
        self.value.len()
    }

    /// Check if the value is empty
    pub const fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Size of the node on the wire
    pub const fn encoded_len(&self) -> usize {
        self.header_len + self.value.len()
    }

    /// Check if the tag marks a constructed encoding
    pub const fn is_constructed(&self) -> bool {
        self.tag & CONSTRUCTED != 0
    }

    /// Reader over the nested nodes of this value
    pub const fn reader(&self) -> TlvReader<'a> {
        TlvReader::with_base_offset(self.value, self.value_offset())
    }
}

/// Left-to-right reader over sibling nodes
///
/// Iteration stops after the first error.
#[derive(Debug, Clone)]
pub struct TlvReader<'a> {
    input: &'a [u8],
    position: usize,
    base: usize,
    failed: bool,
}

impl<'a> TlvReader<'a> {
    /// Create a reader over a buffer received from the card
    pub const fn new(input: &'a [u8]) -> Self {
        Self::with_base_offset(input, 0)
    }

    /// Create a reader over a region that starts at `base` in a larger buffer
    pub const fn with_base_offset(input: &'a [u8], base: usize) -> Self {
        Self {
            input,
            position: 0,
            base,
            failed: false,
        }
    }

    /// Absolute offset of the next byte to read
    pub const fn offset(&self) -> usize {
        self.base + self.position
    }

    /// Bytes not read yet
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.position..]
    }

    /// Check if every node has been read
    pub const fn is_empty(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Read the next node, or `None` at end of input
    pub fn next_node(&mut self) -> Result<Option<Tlv<'a>>> {
        if self.is_empty() {
            return Ok(None);
        }

        let offset = self.offset();
        let rest = self.remaining();
        let header = read_header(rest, offset)?;
        let value_start = header.header_len;
        let available = rest.len() - value_start;
        if header.value_len > available {
            return Err(Error::TruncatedInput {
                offset: offset + value_start,
                needed: header.value_len,
                available,
            });
        }

        let value = &rest[value_start..value_start + header.value_len];
        self.position += header.total_len();

        Ok(Some(Tlv {
            tag: header.tag,
            offset,
            header_len: header.header_len,
            value,
        }))
    }

    /// Read the next node and require its tag
    pub fn expect_tag(&mut self, tag: u8) -> Result<Tlv<'a>> {
        let offset = self.offset();
        let Some(tlv) = self.next_node()? else {
            return Err(Error::TruncatedInput {
                offset,
                needed: 1,
                available: 0,
            });
        };

        if tlv.tag() != tag {
            return Err(Error::UnexpectedTag {
                expected: tag,
                found: tlv.tag(),
                offset: tlv.offset(),
            });
        }
        Ok(tlv)
    }

    /// Read the next node and require both its tag and its exact length
    pub fn expect_primitive(&mut self, tag: u8, len: usize, field: &'static str) -> Result<Tlv<'a>> {
        let tlv = self.expect_tag(tag)?;
        if tlv.len() != len {
            return Err(Error::LengthMismatch {
                field,
                expected: len,
                found: tlv.len(),
                offset: tlv.offset(),
            });
        }
        Ok(tlv)
    }
}

impl<'a> Iterator for TlvReader<'a> {
    type Item = Result<Tlv<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_node() {
            Ok(node) => node.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Encode a definite length
pub fn encode_length(len: usize) -> Vec<u8> {
    if len < 0x80 {
        return vec![len as u8];
    }

    let octets = len.to_be_bytes();
    let skip = octets.iter().take_while(|&&octet| octet == 0).count();
    let significant = &octets[skip..];

    let mut out = Vec::with_capacity(1 + significant.len());
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
    out
}

/// Encode a single node with the shortest length form
pub fn encode(tag: u8, value: &[u8]) -> Vec<u8> {
    let length = encode_length(value.len());
    let mut out = Vec::with_capacity(1 + length.len() + value.len());
    out.push(tag);
    out.extend_from_slice(&length);
    out.extend_from_slice(value);
    out
}
