//! Dispatch over the known record kinds

use crate::decoder::Decode;
use crate::error::{Error, Result};
use crate::fcp::{self, FileControlParameters};
use crate::icao::{self, Com};

/// Any record this crate can decode, selected by the outer tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardRecord {
    /// EF.COM
    Com(Com),
    /// File control parameters
    Fcp(FileControlParameters),
}

impl CardRecord {
    /// Decode whichever record the outer tag names
    pub fn decode_any(raw: &[u8]) -> Result<Self> {
        match raw.first() {
            Some(&icao::tags::COM) => Com::decode(raw).map(Self::Com),
            Some(&fcp::tags::FCP) => FileControlParameters::decode(raw).map(Self::Fcp),
            Some(&found) => Err(Error::UnknownRecord { found, offset: 0 }),
            None => Err(Error::TruncatedInput {
                offset: 0,
                needed: 1,
                available: 0,
            }),
        }
    }

    /// Outer tag of the record
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Com(_) => Com::TAG,
            Self::Fcp(_) => FileControlParameters::TAG,
        }
    }
}
