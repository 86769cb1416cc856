//! Card session orchestration
//!
//! [`CardSession`] sequences APDU exchanges over any
//! [`CardTransport`](idcard_apdu_core::CardTransport): select an application
//! or file, read it in chunks sized by its TLV header, verify reference data
//! and decode the result with `idcard-asn1`. It is also where status words
//! stop being data: `61xx` and `6Cxx` are followed, everything else other
//! than `9000` is returned as [`Error::Status`].
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]

pub mod config;
pub mod constants;
pub mod error;
pub mod session;

pub use config::SessionConfig;
pub use error::{Error, Result};
pub use session::{CardSession, PinStatus};
