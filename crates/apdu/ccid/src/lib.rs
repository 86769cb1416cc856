//! USB CCID framing and transport for APDU operations
//!
//! Smart card readers that follow the USB CCID class exchange 10-byte-header
//! messages over a bulk endpoint pair. This crate frames command APDUs into
//! `PC_to_RDR_XfrBlock` messages, interprets the reader's replies, and offers
//! [`CcidTransport`] as a [`CardTransport`](idcard_apdu_core::CardTransport)
//! so APDU executors can run on top of any bulk pipe.
//!
//! The USB device itself is abstracted by [`CcidDevice`].

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]

pub mod config;
pub mod device;
pub mod error;
pub mod frame;
pub mod instruction;
pub mod transport;

pub use config::CcidConfig;
pub use device::CcidDevice;
pub use error::CcidError;
pub use frame::{Frame, IccStatus, LevelParameter, Reply, TransferOptions, frame_transfer};
pub use instruction::{Instruction, PowerSelect};
pub use transport::CcidTransport;
