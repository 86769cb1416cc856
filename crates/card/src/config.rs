//! Session configuration

use idcard_apdu_core::ExpectedLength;
use idcard_apdu_core::iso7816::cla;

/// Configuration options for a card session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Class byte for every command
    pub cla: u8,

    /// Largest Le used for one READ BINARY
    pub max_read_length: ExpectedLength,

    /// Whether `61xx` triggers GET RESPONSE and `6Cxx` a resend with the
    /// corrected Le
    pub follow_status_hints: bool,

    /// Most GET RESPONSE commands chained onto one command
    pub max_get_responses: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cla: cla::ISO7816,
            max_read_length: 0xDF,
            follow_status_hints: true,
            max_get_responses: 64,
        }
    }
}

impl SessionConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the class byte
    pub const fn with_cla(mut self, cla: u8) -> Self {
        self.cla = cla;
        self
    }

    /// Set the READ BINARY chunk size, at least one byte
    pub const fn with_max_read_length(mut self, max: ExpectedLength) -> Self {
        self.max_read_length = if max == 0 { 1 } else { max };
        self
    }

    /// Enable or disable `61xx` / `6Cxx` handling
    pub const fn with_follow_status_hints(mut self, follow: bool) -> Self {
        self.follow_status_hints = follow;
        self
    }

    /// Set how many `61xx` replies are followed before giving up
    pub const fn with_max_get_responses(mut self, max: u32) -> Self {
        self.max_get_responses = max;
        self
    }
}
