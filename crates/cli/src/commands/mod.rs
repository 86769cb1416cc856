//! Command handlers

mod apdu;
mod ccid;
mod tlv;

pub use apdu::*;
pub use ccid::*;
pub use tlv::*;
