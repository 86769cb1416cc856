//! Binding of record types to their outer tag

use tracing::trace;

use crate::error::{Error, Result};
use crate::tlv::{Tlv, TlvReader};

/// A record decoded from one TLV node with a fixed outer tag
pub trait Decode: Sized {
    /// Outer tag of the record
    const TAG: u8;

    /// Decode the record from its outer node
    ///
    /// The tag has already been checked when this is called through
    /// [`Decode::decode`] or [`Decode::decode_tlv`].
    fn decode_value(tlv: &Tlv<'_>) -> Result<Self>;

    /// Decode a record from raw bytes
    ///
    /// The tag byte is checked before the length is parsed, so a wrong
    /// record type fails with [`Error::TagMismatch`] before any inner node is
    /// read. Bytes after the outer node are ignored.
    fn decode(raw: &[u8]) -> Result<Self> {
        match raw.first() {
            Some(&found) if found != Self::TAG => Err(Error::TagMismatch {
                expected: Self::TAG,
                found,
                offset: 0,
            }),
            _ => Self::decode_tlv(&TlvReader::new(raw).expect_tag(Self::TAG)?),
        }
    }

    /// Decode a record from a node that was already read
    fn decode_tlv(tlv: &Tlv<'_>) -> Result<Self> {
        if tlv.tag() != Self::TAG {
            return Err(Error::TagMismatch {
                expected: Self::TAG,
                found: tlv.tag(),
                offset: tlv.offset(),
            });
        }
        trace!(
            tag = Self::TAG,
            value = %hex::encode_upper(tlv.value()),
            "Decoding record"
        );
        Self::decode_value(tlv)
    }
}
