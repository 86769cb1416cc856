//! Error types for APDU operations

use crate::transport::TransportError;

/// Maximum number of data bytes an extended-length command can carry
pub const MAX_EXTENDED_DATA_LENGTH: usize = 65535;

/// Error type for APDU encoding, parsing and exchange
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Command data does not fit in an extended Lc field
    #[error("command data of {length} bytes exceeds the encodable maximum of {max} bytes")]
    Encoding {
        /// Length of the supplied data
        length: usize,
        /// Largest encodable data length
        max: usize,
    },

    /// Raw response is shorter than the mandatory status word
    #[error("malformed response: expected at least 2 bytes for the status word, got {length}")]
    MalformedResponse {
        /// Number of bytes actually received
        length: usize,
    },

    /// Raw command bytes do not form a valid ISO 7816-4 case
    #[error("invalid command length: {0} bytes")]
    InvalidCommandLength(usize),

    /// Transport failed while exchanging the command
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type for APDU operations
pub type Result<T> = std::result::Result<T, Error>;
