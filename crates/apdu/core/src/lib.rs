//! Core traits and types for APDU (Application Protocol Data Unit) operations
//!
//! This crate provides the foundational types and traits for working with smart card
//! APDU commands and responses according to ISO/IEC 7816-4.
//!
//! ## Overview
//!
//! - [`Command`] and the [`ApduCommand`] trait build command APDUs, choosing the
//!   short or extended length encoding from the data and Le sizes
//! - [`Response`] splits a raw reply into payload and [`StatusWord`]
//! - [`CardTransport`] is the seam to whatever moves bytes to the card
//! - [`CardExecutor`] performs one exchange at a time over a transport
//! - [`iso7816`] holds the interindustry commands (SELECT, READ BINARY, ...)
//!
//! Status words are returned as data. Deciding what to do with `61xx`, `6Cxx`
//! or an error status belongs to the caller.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

pub mod card;
pub mod command;
pub mod error;
pub mod iso7816;
pub mod response;
pub mod transport;

pub use card::CardExecutor;
pub use command::{ApduCommand, Command, ExpectedLength};
pub use error::{Error, Result};
pub use response::Response;
pub use response::status::StatusWord;
pub use transport::{CardTransport, MockTransport, TransportError};

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{Bytes, BytesMut, Error};

    pub use crate::command::{ApduCommand, Command, ExpectedLength};

    pub use crate::response::Response;
    pub use crate::response::status::{StatusWord, common as status};

    pub use crate::transport::{CardTransport, TransportError};

    pub use crate::card::CardExecutor;
}
