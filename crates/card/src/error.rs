//! Error types for card sessions

use idcard_apdu_core::StatusWord;

/// Result type for card session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for card session operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Encoding, parsing or transport failure below the session
    #[error(transparent)]
    Apdu(#[from] idcard_apdu_core::Error),

    /// Card data did not match its grammar
    #[error(transparent)]
    Decode(#[from] idcard_asn1::Error),

    /// The card answered with a status other than success
    #[error("{command} failed with status {status} ({})", .status.description())]
    Status {
        /// Command that failed
        command: &'static str,
        /// Status word returned
        status: StatusWord,
    },

    /// Verification rejected the reference data
    #[error("verification failed, {retries} tries left")]
    WrongPin {
        /// Remaining attempts
        retries: u8,
    },

    /// The card kept announcing more response data
    #[error("{command} still had data pending after {limit} GET RESPONSE commands")]
    TooManyGetResponses {
        /// Command whose response was being collected
        command: &'static str,
        /// Configured limit
        limit: u32,
    },

    /// A file is larger than READ BINARY can address
    #[error("file of {size} bytes exceeds the addressable maximum of {max} bytes")]
    FileTooLarge {
        /// Size announced by the file header
        size: usize,
        /// Largest readable size
        max: usize,
    },

    /// READ BINARY offset beyond the 15-bit range
    #[error("offset 0x{0:04X} is out of range for READ BINARY")]
    OffsetOutOfRange(usize),

    /// The card answered successfully with unusable data
    #[error("invalid response to {command}: {reason}")]
    InvalidResponse {
        /// Command that was answered
        command: &'static str,
        /// What is wrong with the response
        reason: &'static str,
    },
}
