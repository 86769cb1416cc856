//! BER-TLV reading and typed decoding of card-resident data structures
//!
//! [`TlvReader`] walks a buffer node by node without backtracking. Record
//! types implement [`Decode`], which binds them to their outer tag, and read
//! their inner nodes with [`TlvReader::expect_tag`] and
//! [`TlvReader::expect_primitive`]. Every error points at the absolute byte
//! offset where the grammar was violated.
//!
//! ```
//! use idcard_asn1::{Decode, icao::Com};
//!
//! let raw = [
//!     0x60, 0x12, 0x01, 0x04, b'0', b'1', b'0', b'7', 0x36, 0x06, b'0', b'4', b'0', b'0',
//!     b'0', b'0', 0x5C, 0x02, 0x61, 0x75,
//! ];
//! let com = Com::decode(&raw)?;
//! assert_eq!(com.lds_version(), "01.07");
//! assert_eq!(com.present_groups(), ["DG1", "DG2"]);
//! # Ok::<(), idcard_asn1::Error>(())
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]

pub mod decoder;
pub mod error;
pub mod fcp;
pub mod icao;
pub mod record;
pub mod tlv;

pub use decoder::Decode;
pub use error::{Error, Result};
pub use fcp::FileControlParameters;
pub use record::CardRecord;
pub use tlv::{Header, Tlv, TlvReader, encode, encode_length, peek_header};
